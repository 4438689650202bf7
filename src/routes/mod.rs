pub mod admin_routes;
pub mod auth_routes;
pub mod health_routes;
pub mod inquiry_routes;
pub mod pdf_routes;

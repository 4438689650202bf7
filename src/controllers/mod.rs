//! Controllers: lógica de cada endpoint, entre las rutas y los repositorios

pub mod admin_controller;
pub mod auth_controller;
pub mod authorization_controller;
pub mod reservation_controller;

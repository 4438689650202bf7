//! DTOs de entrada y salida de la API

pub mod api_response;
pub mod auth_dto;
pub mod authorization_dto;
pub mod reservation_dto;

pub use api_response::ApiResponse;

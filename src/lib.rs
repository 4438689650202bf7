//! Backend de reservas de campers
//!
//! Cuentas, consulta de días completos, envío de reservas con control de
//! cupo por día, firma de la autorización de tarjeta y panel de admin.

pub mod availability;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::routes::{admin_routes, auth_routes, health_routes, inquiry_routes, pdf_routes};
use crate::state::AppState;

/// Router completo de la API
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(health_routes::create_health_router())
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/api/inquiry", inquiry_routes::create_inquiry_router(state.clone()))
        .nest("/api/admin", admin_routes::create_admin_router(state.clone()))
        .nest("/api/pdf", pdf_routes::create_pdf_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

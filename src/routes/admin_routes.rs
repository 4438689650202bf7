use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::admin_controller::AdminController;
use crate::dto::api_response::ApiResponse;
use crate::dto::reservation_dto::{AdminOrderResponse, ReservationResponse, UpdateStatusRequest};
use crate::middleware::auth::{admin_only_middleware, auth_middleware};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::JsonBody;

pub fn create_admin_router(state: AppState) -> Router<AppState> {
    // La última capa corre primero: auth y luego admin
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id/status", put(update_order_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<AdminOrderResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.list_orders().await?;
    Ok(Json(response))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ReservationResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.update_status(id, request).await?;
    Ok(Json(response))
}

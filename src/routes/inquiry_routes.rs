use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::reservation_controller::ReservationController;
use crate::dto::api_response::ApiResponse;
use crate::dto::reservation_dto::{CreateReservationRequest, ReservationResponse};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::JsonBody;

pub fn create_inquiry_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(submit_inquiry))
        .route("/my-orders", get(my_orders))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/blocked-dates", get(blocked_dates))
        .merge(protected)
}

async fn blocked_dates(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.blocked_dates().await?;
    Ok(Json(response))
}

async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.my_orders(user.user_id).await?;
    Ok(Json(response))
}

async fn submit_inquiry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<CreateReservationRequest>,
) -> Result<Json<ApiResponse<ReservationResponse>>, AppError> {
    let controller = ReservationController::new(&state);
    let response = controller.submit(&user, request).await?;
    Ok(Json(response))
}

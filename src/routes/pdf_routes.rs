use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    routing::post,
    Extension, Json, Router,
};

use crate::controllers::authorization_controller::AuthorizationController;
use crate::dto::api_response::ApiResponse;
use crate::dto::authorization_dto::{AuthorizationResponse, GenerateAuthorizationRequest};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::JsonBody;

// La firma viaja como PNG en base64 dentro del JSON
const SIGNATURE_BODY_LIMIT: usize = 5 * 1024 * 1024;

pub fn create_pdf_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_authorization))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .layer(DefaultBodyLimit::max(SIGNATURE_BODY_LIMIT))
}

async fn generate_authorization(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<GenerateAuthorizationRequest>,
) -> Result<Json<ApiResponse<AuthorizationResponse>>, AppError> {
    let controller = AuthorizationController::new(&state);
    let response = controller.generate(&user, request).await?;
    Ok(Json(response))
}

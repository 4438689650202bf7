use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{normalize_email, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserResponse};
use crate::models::user::{ProfileUpdate, User};
use crate::repositories::UserRepository;
use crate::services::PasswordService;
use crate::state::AppState;
use crate::utils::errors::{conflict_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    passwords: PasswordService,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            passwords: state.passwords,
            jwt: state.jwt.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let email = normalize_email(&request.email);
        if self.users.email_exists(&email).await? {
            return Err(conflict_error("User", "email", &email));
        }

        let password_hash = self.passwords.hash(&request.password).await?;
        let user = self
            .users
            .create(User::new(email, password_hash, request.name.trim().to_string(), request.phone))
            .await?;

        info!("👤 Nueva cuenta registrada: {}", user.id);
        Ok(ApiResponse::success_with_message(user.into(), "Account created"))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
        request.validate()?;

        // Mismo mensaje para email desconocido y contraseña incorrecta
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(invalid)?;

        if !self.passwords.verify(&request.password, &user.password_hash).await? {
            return Err(invalid());
        }

        let token = generate_token(user.id, &self.jwt)?;
        info!("🔑 Login: {}", user.id);

        Ok(ApiResponse::success(LoginResponse {
            token,
            user: user.into(),
        }))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let address = request
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        let user = self
            .users
            .update_profile(
                user_id,
                ProfileUpdate {
                    name: request.name.trim().to_string(),
                    phone: request.phone,
                    address,
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(user.into(), "Profile updated"))
    }
}

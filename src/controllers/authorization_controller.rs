use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::authorization_dto::{AuthorizationResponse, GenerateAuthorizationRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::reservation::AuthorizationArtifact;
use crate::repositories::ReservationRepository;
use crate::services::pdf_service::{render_authorization_pdf, AuthorizationForm};
use crate::services::{Notification, NotificationService};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::validation::mask_card_number;

pub struct AuthorizationController {
    reservations: Arc<dyn ReservationRepository>,
    notifications: NotificationService,
    admin_email: String,
}

impl AuthorizationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            reservations: state.reservations.clone(),
            notifications: state.notifications.clone(),
            admin_email: state.config.admin_email.clone(),
        }
    }

    /// Firmar la autorización de tarjeta de una reserva.
    ///
    /// Primero se genera el PDF y se registra la firma en la reserva; el
    /// correo al operador se encola después y su fallo no deshace nada.
    pub async fn generate(
        &self,
        user: &AuthenticatedUser,
        request: GenerateAuthorizationRequest,
    ) -> AppResult<ApiResponse<AuthorizationResponse>> {
        request.validate()?;

        let reservation = self
            .reservations
            .find_by_id(request.reservation_id)
            .await?
            .ok_or_else(|| not_found_error("Reservation", &request.reservation_id.to_string()))?;

        if reservation.user_id != user.user_id && !user.email.eq_ignore_ascii_case(&self.admin_email) {
            return Err(forbidden_error("sign authorization", "reservation belongs to another account"));
        }

        if reservation.is_signed() {
            info!(
                "🔁 La reserva {} ya tenía autorización ({:?}); se reemplaza",
                reservation.id, reservation.authorization_ref
            );
        }

        let masked_card = mask_card_number(&request.card_number);
        let form = AuthorizationForm {
            reservation_id: reservation.id,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            guest_name: request.guest_name.trim().to_string(),
            card_number: request.card_number,
            amount: request.amount,
            signature: request.signature,
        };
        let guest_name = form.guest_name.clone();
        let amount = form.amount;

        let rendered = tokio::task::spawn_blocking(move || render_authorization_pdf(&form))
            .await
            .map_err(|e| AppError::Internal(format!("pdf task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("pdf rendering failed: {:#}", e)))?;

        let signed_at = Utc::now();
        let artifact = AuthorizationArtifact {
            reference: format!("auth-{}-{}", reservation.id, signed_at.format("%Y%m%d%H%M%S")),
            signed_at,
        };
        let updated = self.reservations.attach_authorization(reservation.id, artifact).await?;

        info!(
            "🔐 Autorización firmada para la reserva {} (tarjeta {}, firma {:?})",
            reservation.id, masked_card, rendered.signature
        );

        let email_queued = self.notifications.enqueue(Notification::AuthorizationSigned {
            reservation_id: reservation.id,
            guest_name,
            masked_card,
            amount,
            pdf: rendered.bytes,
        });

        let authorization_ref = updated
            .authorization_ref
            .ok_or_else(|| AppError::Internal("authorization reference not stored".to_string()))?;

        Ok(ApiResponse::success_with_message(
            AuthorizationResponse {
                reservation_id: updated.id,
                authorization_ref,
                signed_at: updated.authorization_signed_at.unwrap_or(signed_at),
                email_queued,
            },
            "PDF generated and sent",
        ))
    }
}

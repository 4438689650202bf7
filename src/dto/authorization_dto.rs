use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_positive_amount, validate_signature_data_url, CARD_NUMBER_REGEX};

// Request para firmar la autorización de tarjeta
#[derive(Deserialize, Validate)]
pub struct GenerateAuthorizationRequest {
    #[serde(alias = "reservationId")]
    pub reservation_id: Uuid,
    #[serde(alias = "guestName")]
    #[validate(length(min = 1, max = 120))]
    pub guest_name: String,
    #[serde(alias = "cardNumber")]
    #[validate(regex = "CARD_NUMBER_REGEX")]
    pub card_number: String,
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    /// `data:image/png;base64,...`; si falta el PDF lleva un texto en su lugar
    #[serde(default)]
    #[validate(custom = "validate_signature_data_url")]
    pub signature: Option<String>,
}

// El número de tarjeta nunca aparece en logs
impl std::fmt::Debug for GenerateAuthorizationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateAuthorizationRequest")
            .field("reservation_id", &self.reservation_id)
            .field("guest_name", &self.guest_name)
            .field("card_number", &crate::utils::validation::mask_card_number(&self.card_number))
            .field("amount", &self.amount)
            .field("signature", &self.signature.as_ref().map(|s| s.len()))
            .finish()
    }
}

// Response de autorización registrada
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    pub reservation_id: Uuid,
    pub authorization_ref: String,
    pub signed_at: DateTime<Utc>,
    pub email_queued: bool,
}

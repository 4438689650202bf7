use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::reservation::{Addons, Reservation, ReservationStatus, ReservationWithOwner};
use crate::utils::dates::deserialize_calendar_date;

// Request para enviar una reserva. Acepta snake_case y camelCase.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    #[serde(alias = "startDate", deserialize_with = "deserialize_calendar_date")]
    pub start_date: NaiveDate,
    #[serde(alias = "endDate", deserialize_with = "deserialize_calendar_date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub addons: Addons,
    /// Precio calculado por el cliente; solo se usa para detectar diferencias
    #[serde(default, alias = "estimatedPrice")]
    pub estimated_price: Option<Decimal>,
}

// Response de reserva
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rental_days: i64,
    pub status: ReservationStatus,
    pub total_price: Decimal,
    pub addons: Addons,
    pub authorization_ref: Option<String>,
    pub authorization_signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            start_date: r.start_date,
            end_date: r.end_date,
            rental_days: (r.end_date - r.start_date).num_days(),
            status: r.status,
            total_price: r.total_price,
            addons: r.addons.0,
            authorization_ref: r.authorization_ref,
            authorization_signed_at: r.authorization_signed_at,
            created_at: r.created_at,
        }
    }
}

// Pedido con datos de contacto para el panel de admin
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminOrderResponse {
    #[serde(flatten)]
    pub reservation: ReservationResponse,
    pub user_name: String,
    pub user_phone: String,
    pub user_email: String,
}

impl From<ReservationWithOwner> for AdminOrderResponse {
    fn from(row: ReservationWithOwner) -> Self {
        Self {
            reservation: row.reservation.into(),
            user_name: row.user_name,
            user_phone: row.user_phone,
            user_email: row.user_email,
        }
    }
}

// Request de cambio de estado (admin)
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_request() {
        let request: CreateReservationRequest = serde_json::from_str(
            r#"{"startDate": "2026-06-11", "endDate": "2026-06-13T00:00:00+08:00",
                "addons": {"mattress": true, "blanket": false, "cookware": true},
                "estimatedPrice": 8100}"#,
        )
        .unwrap();

        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2026, 6, 11).unwrap());
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2026, 6, 13).unwrap());
        assert!(request.addons.mattress && request.addons.cookware);
        assert_eq!(request.estimated_price, Some(Decimal::from(8100)));
    }

    #[test]
    fn test_addons_and_price_optional() {
        let request: CreateReservationRequest =
            serde_json::from_str(r#"{"start_date": "2026-06-11", "end_date": "2026-06-12"}"#).unwrap();
        assert_eq!(request.addons, Addons::default());
        assert!(request.estimated_price.is_none());
    }

    #[test]
    fn test_invalid_date_rejected() {
        let result: Result<CreateReservationRequest, _> =
            serde_json::from_str(r#"{"start_date": "11/06/2026", "end_date": "2026-06-12"}"#);
        assert!(result.is_err());
    }
}

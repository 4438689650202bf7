//! Modelo de Reservation
//!
//! Una reserva (inquiry) cubre un rango de días de calendario con inicio y
//! fin incluidos. Mapea a la tabla `reservations`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::dates::days_inclusive;
use crate::utils::errors::{AppError, AppResult};

/// Estado de la reserva - mapea al ENUM reservation_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(AppError::BadRequest(format!(
                "Unknown status '{}' (expected pending, confirmed or cancelled)",
                other
            ))),
        }
    }
}

/// Equipamiento opcional, cobrado una sola vez por reserva
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Addons {
    #[serde(default)]
    pub mattress: bool,
    #[serde(default)]
    pub blanket: bool,
    #[serde(default)]
    pub cookware: bool,
}

/// Rango de alquiler validado: `end > start`, ambos días incluidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::DegenerateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Días de alquiler cobrados (noches)
    pub fn rental_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Todos los días que ocupan un vehículo, incluido el de devolución
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        days_inclusive(self.start, self.end)
    }
}

/// Reservation principal - mapea exactamente a la tabla reservations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub total_price: Decimal,
    pub addons: Json<Addons>,
    pub authorization_ref: Option<String>,
    pub authorization_signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_signed(&self) -> bool {
        self.authorization_ref.is_some()
    }

    /// Días ocupados. Las filas antiguas con inicio == fin ocupan un día.
    pub fn occupied_days(&self) -> impl Iterator<Item = NaiveDate> {
        days_inclusive(self.start_date, self.end_date)
    }
}

/// Datos de una reserva aún no persistida
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub range: DateRange,
    pub total_price: Decimal,
    pub addons: Addons,
    pub created_at: DateTime<Utc>,
}

impl NewReservation {
    pub fn new(user_id: Uuid, range: DateRange, total_price: Decimal, addons: Addons) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            range,
            total_price,
            addons,
            created_at: Utc::now(),
        }
    }

    /// Toda reserva nace en `pending`
    pub fn into_reservation(self) -> Reservation {
        Reservation {
            id: self.id,
            user_id: self.user_id,
            start_date: self.range.start(),
            end_date: self.range.end(),
            status: ReservationStatus::Pending,
            total_price: self.total_price,
            addons: Json(self.addons),
            authorization_ref: None,
            authorization_signed_at: None,
            created_at: self.created_at,
        }
    }
}

/// Documento de autorización firmado asociado a una reserva
#[derive(Debug, Clone)]
pub struct AuthorizationArtifact {
    pub reference: String,
    pub signed_at: DateTime<Utc>,
}

/// Reserva con los datos de contacto del cliente, para el panel de admin
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReservationWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reservation: Reservation,
    pub user_name: String,
    pub user_phone: String,
    pub user_email: String,
}

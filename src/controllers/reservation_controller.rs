use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::availability::{validate_range, validate_rental_length};
use crate::dto::api_response::ApiResponse;
use crate::dto::reservation_dto::{CreateReservationRequest, ReservationResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::reservation::{DateRange, NewReservation};
use crate::repositories::{ReservationRepository, UserRepository};
use crate::services::{Notification, NotificationService, PricingService};
use crate::state::AppState;
use crate::utils::dates::format_calendar_date;
use crate::utils::errors::AppResult;

pub struct ReservationController {
    reservations: Arc<dyn ReservationRepository>,
    users: Arc<dyn UserRepository>,
    notifications: NotificationService,
    pricing: PricingService,
    capacity: u32,
    max_rental_days: u32,
}

impl ReservationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            reservations: state.reservations.clone(),
            users: state.users.clone(),
            notifications: state.notifications.clone(),
            pricing: state.pricing.clone(),
            capacity: state.fleet_capacity(),
            max_rental_days: state.config.max_rental_days,
        }
    }

    /// Días completos, `YYYY-MM-DD` en orden ascendente
    pub async fn blocked_dates(&self) -> AppResult<Vec<String>> {
        let blocked = self.reservations.blocked_dates(self.capacity).await?;
        Ok(blocked.into_iter().map(format_calendar_date).collect())
    }

    pub async fn my_orders(&self, user_id: Uuid) -> AppResult<Vec<ReservationResponse>> {
        let reservations = self.reservations.list_by_owner(user_id).await?;
        Ok(reservations.into_iter().map(ReservationResponse::from).collect())
    }

    /// Enviar una reserva.
    ///
    /// La validación usa la ocupación leída en este momento, nunca la lista
    /// que tenga el cliente. El commit vuelve a verificar cada día bajo lock,
    /// así que dos envíos simultáneos no pueden pasar ambos sobre un día con
    /// N-1 reservas.
    pub async fn submit(
        &self,
        user: &AuthenticatedUser,
        request: CreateReservationRequest,
    ) -> AppResult<ApiResponse<ReservationResponse>> {
        let range = DateRange::new(request.start_date, request.end_date)?;
        validate_rental_length(&range, self.max_rental_days)?;

        let occupancy = self.reservations.occupancy_between(range.start(), range.end()).await?;
        validate_range(range.start(), range.end(), &occupancy, self.capacity)?;

        let tightest = range.days().map(|day| occupancy.count(day)).max().unwrap_or(0);
        debug!(
            "Rango {} → {} libre, ocupación máxima {}/{}",
            range.start(),
            range.end(),
            tightest,
            self.capacity
        );

        let total_price = self.pricing.quote(&range, &request.addons);
        if let Some(estimate) = request.estimated_price {
            if estimate != total_price {
                warn!(
                    "⚠️ Precio del cliente ({}) distinto del calculado ({}) para {} → {}",
                    estimate,
                    total_price,
                    range.start(),
                    range.end()
                );
            }
        }

        let reservation = self
            .reservations
            .insert_if_available(
                NewReservation::new(user.user_id, range, total_price, request.addons),
                self.capacity,
            )
            .await?;

        info!(
            "🚐 Reserva {} creada: {} → {} ({} noches, NT$ {})",
            reservation.id,
            reservation.start_date,
            reservation.end_date,
            range.rental_days(),
            reservation.total_price
        );

        // Best effort: la reserva ya está guardada
        match self.users.find_by_id(user.user_id).await {
            Ok(Some(owner)) => {
                self.notifications.enqueue(Notification::NewInquiry {
                    reservation: reservation.clone(),
                    contact: owner.contact(),
                });
            }
            Ok(None) => warn!("⚠️ Reserva {} sin usuario para notificar", reservation.id),
            Err(e) => warn!("⚠️ No se pudo leer el contacto de la reserva {}: {}", reservation.id, e),
        }

        Ok(ApiResponse::success_with_message(
            reservation.into(),
            "Inquiry submitted, we will contact you shortly",
        ))
    }
}

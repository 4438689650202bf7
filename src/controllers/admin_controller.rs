use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::reservation_dto::{AdminOrderResponse, ReservationResponse, UpdateStatusRequest};
use crate::models::reservation::ReservationStatus;
use crate::repositories::ReservationRepository;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AdminController {
    reservations: Arc<dyn ReservationRepository>,
    capacity: u32,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            reservations: state.reservations.clone(),
            capacity: state.fleet_capacity(),
        }
    }

    pub async fn list_orders(&self) -> AppResult<Vec<AdminOrderResponse>> {
        let rows = self.reservations.list_with_owner().await?;
        Ok(rows.into_iter().map(AdminOrderResponse::from).collect())
    }

    /// Reactivar una reserva cancelada pasa por el mismo control de cupo
    /// que una reserva nueva y puede ser rechazada.
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
    ) -> AppResult<ApiResponse<ReservationResponse>> {
        let status: ReservationStatus = request.status.parse()?;

        let updated = self.reservations.update_status(id, status, self.capacity).await?;
        info!("📝 Reserva {} → {}", id, status);

        Ok(ApiResponse::success_with_message(updated.into(), format!("Order marked as {}", status)))
    }
}

//! Calculadora de disponibilidad
//!
//! Ocupación por día y días bloqueados a partir de un conjunto de reservas y
//! la capacidad de la flota. Funciones puras, sin estado oculto.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::reservation::{Reservation, ReservationStatus};
use crate::utils::dates::days_inclusive;

/// Qué estados de reserva ocupan un vehículo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyPolicy {
    pub count_cancelled: bool,
}

impl OccupancyPolicy {
    pub fn new(count_cancelled: bool) -> Self {
        Self { count_cancelled }
    }

    /// `pending` y `confirmed` ocupan siempre; `cancelled` según la política
    pub fn counts(&self, status: ReservationStatus) -> bool {
        match status {
            ReservationStatus::Pending | ReservationStatus::Confirmed => true,
            ReservationStatus::Cancelled => self.count_cancelled,
        }
    }

    /// Variación de ocupación al pasar de `from` a `to`: -1, 0 o +1
    pub fn delta(&self, from: ReservationStatus, to: ReservationStatus) -> i32 {
        (self.counts(to) as i32) - (self.counts(from) as i32)
    }
}

/// Foto de la ocupación por día. Los días ausentes tienen ocupación 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancySnapshot {
    counts: BTreeMap<NaiveDate, u32>,
}

impl OccupancySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construir desde filas `(día, reservas)` del índice persistido
    pub fn from_counts(rows: impl IntoIterator<Item = (NaiveDate, u32)>) -> Self {
        let counts = rows.into_iter().filter(|(_, booked)| *booked > 0).collect();
        Self { counts }
    }

    pub fn count(&self, day: NaiveDate) -> u32 {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    pub fn add_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.add_days(days_inclusive(start, end));
    }

    pub fn add_days(&mut self, days: impl IntoIterator<Item = NaiveDate>) {
        for day in days {
            *self.counts.entry(day).or_insert(0) += 1;
        }
    }

    /// Días con ocupación >= capacidad, en orden ascendente
    pub fn blocked(&self, capacity: u32) -> Vec<NaiveDate> {
        self.counts
            .iter()
            .filter(|(_, booked)| **booked >= capacity)
            .map(|(day, _)| *day)
            .collect()
    }

    /// Días bloqueados dentro de `[start, end]`
    pub fn blocked_between(&self, start: NaiveDate, end: NaiveDate, capacity: u32) -> Vec<NaiveDate> {
        self.counts
            .range(start..=end)
            .filter(|(_, booked)| **booked >= capacity)
            .map(|(day, _)| *day)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.counts.iter().map(|(day, booked)| (*day, *booked))
    }
}

/// Ocupación por día de todas las reservas que cuentan según la política.
///
/// Una reserva con inicio == fin aporta exactamente un día.
pub fn occupancy_counts<'a>(
    reservations: impl IntoIterator<Item = &'a Reservation>,
    policy: OccupancyPolicy,
) -> OccupancySnapshot {
    let mut snapshot = OccupancySnapshot::new();
    for reservation in reservations {
        if policy.counts(reservation.status) {
            snapshot.add_days(reservation.occupied_days());
        }
    }
    snapshot
}

/// Días completos (ocupación >= capacidad), ordenados ascendentemente
pub fn blocked_dates<'a>(
    reservations: impl IntoIterator<Item = &'a Reservation>,
    capacity: u32,
    policy: OccupancyPolicy,
) -> Vec<NaiveDate> {
    occupancy_counts(reservations, policy).blocked(capacity)
}

//! Validador de rangos
//!
//! Un rango se acepta entero o se rechaza entero. El rechazo enumera todos
//! los días bloqueados del rango, no solo el primero.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::availability::calculator::OccupancySnapshot;
use crate::models::reservation::DateRange;
use crate::utils::errors::{AppError, AppResult};

/// Validar contra una foto de ocupación. Un día con N-1 reservas sigue libre.
pub fn validate_range(
    start: NaiveDate,
    end: NaiveDate,
    occupancy: &OccupancySnapshot,
    capacity: u32,
) -> AppResult<DateRange> {
    let range = DateRange::new(start, end)?;

    let blocked = occupancy.blocked_between(range.start(), range.end(), capacity);
    if !blocked.is_empty() {
        return Err(AppError::CapacityOverlap { dates: blocked });
    }

    Ok(range)
}

/// Límite de noches por reserva. Se aplica antes de leer la ocupación: un
/// rango largo bloquearía todos sus días durante el commit.
pub fn validate_rental_length(range: &DateRange, max_days: u32) -> AppResult<()> {
    let days = range.rental_days();
    if days > i64::from(max_days) {
        return Err(AppError::RangeTooLong { days, max: max_days });
    }
    Ok(())
}

/// Validar contra un conjunto de días bloqueados ya calculado
pub fn validate_against_blocked(
    start: NaiveDate,
    end: NaiveDate,
    blocked: &BTreeSet<NaiveDate>,
) -> AppResult<DateRange> {
    let range = DateRange::new(start, end)?;

    let hits: Vec<NaiveDate> = blocked.range(range.start()..=range.end()).copied().collect();
    if !hits.is_empty() {
        return Err(AppError::CapacityOverlap { dates: hits });
    }

    Ok(range)
}

//! Utilidades de fechas
//!
//! Todas las comparaciones de disponibilidad se hacen con días de calendario
//! (`NaiveDate`). Cualquier valor con hora y zona horaria se normaliza al día
//! local del cliente antes de compararlo.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convertir un string del cliente a día de calendario.
///
/// Acepta `YYYY-MM-DD` y también timestamps RFC 3339; en ese caso se toma la
/// fecha en el offset que envió el cliente, no en UTC, para no correr el día
/// en los bordes de medianoche.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("'{}' is not a valid calendar date (expected YYYY-MM-DD)", value))
}

/// Formato de transporte de una fecha
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Deserializador para campos `NaiveDate` que vienen del cliente
pub fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

/// Iterar todos los días de `start` a `end`, ambos incluidos
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

//! Disponibilidad de la flota
//!
//! Cálculo de días completos, validación de rangos y el filtro consultivo
//! que replica ese cálculo del lado del cliente.

pub mod advisory;
pub mod calculator;
pub mod validator;

pub use calculator::{blocked_dates, occupancy_counts, OccupancyPolicy, OccupancySnapshot};
pub use validator::{validate_against_blocked, validate_range, validate_rental_length};

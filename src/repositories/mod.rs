//! Repositorios de acceso a datos
//!
//! Cada repositorio es un trait con una implementación PostgreSQL y otra en
//! memoria con la misma semántica.

pub mod memory_reservation_repository;
pub mod reservation_repository;
pub mod user_repository;

pub use memory_reservation_repository::MemoryReservationRepository;
pub use reservation_repository::{PgReservationRepository, ReservationRepository};
pub use user_repository::{MemoryUserRepository, PgUserRepository, UserRepository};

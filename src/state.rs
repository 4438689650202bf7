//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Los repositorios son trait objects para que
//! el mismo router funcione con PostgreSQL o con el almacén en memoria.

use std::sync::Arc;

use crate::availability::OccupancyPolicy;
use crate::config::environment::EnvironmentConfig;
use crate::repositories::{ReservationRepository, UserRepository};
use crate::services::{NotificationService, PasswordService, PricingService};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub users: Arc<dyn UserRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub notifications: NotificationService,
    pub pricing: PricingService,
    pub passwords: PasswordService,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        users: Arc<dyn UserRepository>,
        reservations: Arc<dyn ReservationRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            jwt: JwtConfig::from(&config),
            pricing: PricingService::new(config.daily_rate),
            passwords: PasswordService::default(),
            config: Arc::new(config),
            users,
            reservations,
            notifications,
        }
    }

    pub fn with_password_service(mut self, passwords: PasswordService) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn fleet_capacity(&self) -> u32 {
        self.config.fleet_capacity
    }

    pub fn occupancy_policy(&self) -> OccupancyPolicy {
        OccupancyPolicy::new(self.config.count_cancelled_reservations)
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        email.eq_ignore_ascii_case(&self.config.admin_email)
    }
}

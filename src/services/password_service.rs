//! Hash de contraseñas con bcrypt
//!
//! bcrypt es CPU intensivo, por eso corre en `spawn_blocking`.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordService {
    /// Costo explícito; los tests usan el mínimo para ir rápido
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }

    pub async fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))
    }
}

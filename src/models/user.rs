//! Modelo de User
//!
//! Cuenta de cliente. Mapea exactamente a la tabla users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User principal - el hash de la contraseña nunca se serializa
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, name: String, phone: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            phone,
            address: None,
            created_at: Utc::now(),
        }
    }

    pub fn contact(&self) -> UserContact {
        UserContact {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

/// Datos de contacto usados en notificaciones y en el panel de admin
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserContact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Cambios de perfil permitidos al propio usuario
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

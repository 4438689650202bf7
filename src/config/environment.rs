//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Todos los valores tienen
//! un default de desarrollo; un valor presente pero mal formado es un error
//! de arranque.

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

/// Credenciales SMTP para el correo al operador
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub log_level: tracing::Level,
    /// Número de campers intercambiables de la flota
    pub fleet_capacity: u32,
    /// Si las reservas canceladas siguen ocupando cupo
    pub count_cancelled_reservations: bool,
    pub daily_rate: Decimal,
    /// Noches máximas por reserva
    pub max_rental_days: u32,
    /// Única cuenta con acceso al panel de administración
    pub admin_email: String,
    /// Destinatario de las notificaciones de reservas y autorizaciones
    pub operator_email: String,
    pub mail_from: String,
    pub smtp: Option<SmtpConfig>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 5000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            db_max_connections: 20,
            jwt_secret: "dev-only-secret-change-me".to_string(),
            jwt_expiration: 7 * 24 * 3600, // 7 días
            cors_origins: Vec::new(),
            log_level: tracing::Level::DEBUG,
            fleet_capacity: 3,
            count_cancelled_reservations: false,
            daily_rate: Decimal::from(3700),
            max_rental_days: 30,
            admin_email: "admin@campingtour.example".to_string(),
            operator_email: "operator@campingtour.example".to_string(),
            mail_from: "CampingTour <system@campingtour.example>".to_string(),
            smtp: None,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde el entorno (después de `dotenvy`)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let smtp = match env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                username: env::var("SMTP_USERNAME").context("SMTP_USERNAME must be set when SMTP_HOST is")?,
                password: env::var("SMTP_PASSWORD").context("SMTP_PASSWORD must be set when SMTP_HOST is")?,
            }),
            None => None,
        };

        let config = Self {
            environment: string_or("ENVIRONMENT", defaults.environment),
            port: parse_or("PORT", defaults.port)?,
            host: string_or("HOST", defaults.host),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            jwt_secret: string_or("JWT_SECRET", defaults.jwt_secret),
            jwt_expiration: parse_or("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            log_level: parse_or("LOG_LEVEL", defaults.log_level)?,
            fleet_capacity: parse_or("FLEET_CAPACITY", defaults.fleet_capacity)?,
            count_cancelled_reservations: parse_or(
                "COUNT_CANCELLED_RESERVATIONS",
                defaults.count_cancelled_reservations,
            )?,
            daily_rate: parse_or("DAILY_RATE", defaults.daily_rate)?,
            max_rental_days: parse_or("MAX_RENTAL_DAYS", defaults.max_rental_days)?,
            admin_email: string_or("ADMIN_EMAIL", defaults.admin_email),
            operator_email: string_or("OPERATOR_EMAIL", defaults.operator_email),
            mail_from: string_or("MAIL_FROM", defaults.mail_from),
            smtp,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fleet_capacity == 0 {
            return Err(anyhow!("FLEET_CAPACITY must be at least 1"));
        }
        if self.max_rental_days == 0 {
            return Err(anyhow!("MAX_RENTAL_DAYS must be at least 1"));
        }
        if self.daily_rate <= Decimal::ZERO {
            return Err(anyhow!("DAILY_RATE must be positive"));
        }
        if self.is_production() && self.jwt_secret == Self::default().jwt_secret {
            return Err(anyhow!("JWT_SECRET must be set in production"));
        }
        // Cualquiera puede registrar el email por defecto y quedarse con el panel
        if self.is_production() && self.admin_email.eq_ignore_ascii_case(&Self::default().admin_email) {
            return Err(anyhow!("ADMIN_EMAIL must be set in production"));
        }
        Ok(())
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn string_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        _ => Ok(default),
    }
}

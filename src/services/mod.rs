//! Services module
//!
//! Este módulo contiene la lógica de negocio y servicios de la aplicación
//! que no pertenecen a un repositorio: precios, contraseñas, el documento de
//! autorización y el envío de notificaciones.

pub mod mail_service;
pub mod notification_service;
pub mod password_service;
pub mod pdf_service;
pub mod pricing_service;

pub use mail_service::{LogMailer, Mailer, RecordingMailer, SmtpMailer};
pub use notification_service::{Notification, NotificationService};
pub use password_service::PasswordService;
pub use pricing_service::PricingService;

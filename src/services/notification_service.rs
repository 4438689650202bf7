//! Notificaciones en segundo plano
//!
//! Los handlers encolan un evento y responden sin esperar. Un worker
//! consume la cola y entrega cada correo; un fallo de entrega se registra y
//! nunca revierte la reserva ni la firma ya guardadas.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::reservation::Reservation;
use crate::models::user::UserContact;
use crate::services::mail_service::{MailAttachment, Mailer, OutgoingMail};
use crate::services::pricing_service::selected_addons;

const QUEUE_CAPACITY: usize = 256;
pub const AUTHORIZATION_FILENAME: &str = "Auth_Form.pdf";

#[derive(Debug, Clone)]
pub enum Notification {
    NewInquiry {
        reservation: Reservation,
        contact: UserContact,
    },
    AuthorizationSigned {
        reservation_id: Uuid,
        guest_name: String,
        masked_card: String,
        amount: Decimal,
        pdf: Vec<u8>,
    },
}

impl Notification {
    fn label(&self) -> String {
        match self {
            Notification::NewInquiry { reservation, .. } => format!("new inquiry {}", reservation.id),
            Notification::AuthorizationSigned { reservation_id, .. } => {
                format!("authorization {}", reservation_id)
            }
        }
    }
}

/// Productor de la cola de notificaciones
#[derive(Clone)]
pub struct NotificationService {
    sender: mpsc::Sender<Notification>,
}

impl NotificationService {
    /// Crear la cola y lanzar el worker
    pub fn start(mailer: Arc<dyn Mailer>, operator_email: String) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run_worker(receiver, mailer, operator_email));
        (Self { sender }, worker)
    }

    /// Encolar sin bloquear. Devuelve `false` si la cola está llena o cerrada.
    pub fn enqueue(&self, notification: Notification) -> bool {
        let label = notification.label();
        match self.sender.try_send(notification) {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ No se pudo encolar la notificación ({}): {}", label, e);
                false
            }
        }
    }
}

async fn run_worker(mut receiver: mpsc::Receiver<Notification>, mailer: Arc<dyn Mailer>, operator_email: String) {
    info!("📬 Worker de notificaciones iniciado");

    while let Some(notification) = receiver.recv().await {
        let label = notification.label();
        let mail = compose(notification, &operator_email);

        match mailer.send(mail).await {
            Ok(()) => info!("✅ Notificación enviada: {}", label),
            Err(e) => warn!("⚠️ Falló el envío de la notificación ({}): {:#}", label, e),
        }
    }

    info!("📭 Worker de notificaciones detenido");
}

/// Armar el correo al operador
pub fn compose(notification: Notification, operator_email: &str) -> OutgoingMail {
    match notification {
        Notification::NewInquiry { reservation, contact } => {
            let addons = selected_addons(&reservation.addons);
            let addons_html = if addons.is_empty() {
                "<li>No add-ons</li>".to_string()
            } else {
                addons
                    .iter()
                    .map(|line| format!("<li>{} (${})</li>", line.label, line.fee))
                    .collect::<Vec<_>>()
                    .join("")
            };

            OutgoingMail {
                to: operator_email.to_string(),
                subject: format!("🔥 [New inquiry] #{} - {}", reservation.id, contact.name),
                html_body: format!(
                    "<h2>🚐 New campervan inquiry</h2>\
                     <h3>Customer</h3>\
                     <p><strong>Name:</strong> {name}</p>\
                     <p><strong>Phone:</strong> <a href=\"tel:{phone}\">{phone}</a></p>\
                     <p><strong>Email:</strong> {email}</p>\
                     <h3>Trip</h3>\
                     <p><strong>Order:</strong> #{id}</p>\
                     <p><strong>Pick-up:</strong> {start}</p>\
                     <p><strong>Return:</strong> {end}</p>\
                     <p><strong>Total:</strong> NT$ {total}</p>\
                     <h3>Add-ons</h3><ul>{addons}</ul>",
                    name = contact.name,
                    phone = contact.phone,
                    email = contact.email,
                    id = reservation.id,
                    start = reservation.start_date,
                    end = reservation.end_date,
                    total = reservation.total_price,
                    addons = addons_html,
                ),
                attachment: None,
            }
        }
        Notification::AuthorizationSigned {
            reservation_id,
            guest_name,
            masked_card,
            amount,
            pdf,
        } => OutgoingMail {
            to: operator_email.to_string(),
            subject: format!("🔐 [Authorization] {}", guest_name),
            html_body: format!(
                "<h3>Signed card authorization received</h3>\
                 <p>Reservation: #{}</p><p>Card: {}</p><p>Amount: ${}</p>",
                reservation_id, masked_card, amount
            ),
            attachment: Some(MailAttachment {
                filename: AUTHORIZATION_FILENAME.to_string(),
                content_type: "application/pdf".to_string(),
                bytes: pdf,
            }),
        },
    }
}

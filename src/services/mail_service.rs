//! Envío de correo al operador
//!
//! `SmtpMailer` entrega por SMTP con TLS; `LogMailer` solo registra el
//! mensaje y se usa cuando no hay SMTP configurado.

use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<MailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, from: &str) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .with_context(|| format!("invalid SMTP relay '{}'", config.host))?
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        let from = from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid MAIL_FROM '{}'", from))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let to = mail
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("invalid recipient '{}'", mail.to))?;

        let html = SinglePart::html(mail.html_body);
        let builder = Message::builder().from(self.from.clone()).to(to).subject(mail.subject);

        let message = match mail.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| anyhow!("invalid content type: {}", e))?;
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(html)
                        .singlepart(Attachment::new(attachment.filename).body(attachment.bytes, content_type)),
                )?
            }
            None => builder.singlepart(html)?,
        };

        self.transport.send(message).await.context("SMTP delivery failed")?;
        Ok(())
    }
}

/// Registra el correo en lugar de enviarlo
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        info!(
            "📧 [sin SMTP] Para: {} | Asunto: {} | Adjunto: {}",
            mail.to,
            mail.subject,
            mail.attachment
                .as_ref()
                .map(|a| format!("{} ({} bytes)", a.filename, a.bytes.len()))
                .unwrap_or_else(|| "-".to_string())
        );
        Ok(())
    }
}

/// Guarda los correos en memoria; para verificar notificaciones en tests
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Un mailer que siempre falla
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        if self.fail {
            return Err(anyhow!("mail server unavailable"));
        }
        self.sent
            .lock()
            .map_err(|_| anyhow!("recording mailer poisoned"))?
            .push(mail);
        Ok(())
    }
}

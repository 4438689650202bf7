//! Documento de autorización de tarjeta en PDF
//!
//! Una página A4 con el título, los datos del huésped, la tarjeta, el
//! importe y la imagen de la firma. Si la firma falta o no se puede
//! decodificar se imprime un texto en su lugar y el documento se genera igual.

use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

pub const AUTHORIZATION_TITLE: &str = "CREDIT CARD AUTHORIZATION";
pub const NO_SIGNATURE_TEXT: &str = "(No Signature Provided)";
pub const SIGNATURE_ERROR_TEXT: &str = "(Signature Image Error)";

/// Datos que se imprimen en el documento
#[derive(Clone)]
pub struct AuthorizationForm {
    pub reservation_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_name: String,
    pub card_number: String,
    pub amount: Decimal,
    pub signature: Option<String>,
}

/// Cómo quedó la firma en el documento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureOutcome {
    Embedded,
    Missing,
    Unreadable,
}

pub struct RenderedAuthorization {
    pub bytes: Vec<u8>,
    pub signature: SignatureOutcome,
}

/// Extraer los bytes de un data URL `data:image/...;base64,...`
pub fn decode_signature_data_url(data_url: &str) -> Result<Vec<u8>> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| anyhow!("signature is not a data URL"))?;
    if !header.starts_with("data:image") || !header.ends_with(";base64") {
        return Err(anyhow!("unsupported signature header '{}'", header));
    }
    STANDARD.decode(payload.trim()).context("signature is not valid base64")
}

fn signature_image(data_url: &str) -> Result<Image> {
    let bytes = decode_signature_data_url(data_url)?;
    let decoder = PngDecoder::new(Cursor::new(bytes)).context("signature is not a PNG image")?;
    Image::try_from(decoder).context("could not embed signature image")
}

/// Renderizar el PDF. Trabajo de CPU: llamar desde `spawn_blocking`.
pub fn render_authorization_pdf(form: &AuthorizationForm) -> Result<RenderedAuthorization> {
    let (doc, page, layer) = PdfDocument::new(AUTHORIZATION_TITLE, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);

    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("font error: {}", e))?;
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("font error: {}", e))?;

    layer.use_text(AUTHORIZATION_TITLE, 20.0, Mm(48.0), Mm(272.0), &title_font);

    let lines = [
        format!("Guest: {}", form.guest_name),
        format!("Card: {}", form.card_number),
        format!("Amount: ${}", form.amount),
        format!("Reservation: {}", form.reservation_id),
        format!("Rental period: {} to {}", form.start_date, form.end_date),
    ];
    let mut y = 252.0;
    for line in lines {
        layer.use_text(line, 12.0, Mm(20.0), Mm(y), &body_font);
        y -= 8.0;
    }
    y -= 12.0;

    let signature = match form.signature.as_deref() {
        None => SignatureOutcome::Missing,
        Some(data_url) => match signature_image(data_url) {
            Ok(image) => {
                layer.use_text("Signature:", 12.0, Mm(20.0), Mm(y), &body_font);
                image.add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(20.0)),
                        translate_y: Some(Mm(y - 50.0)),
                        dpi: Some(150.0),
                        ..Default::default()
                    },
                );
                SignatureOutcome::Embedded
            }
            Err(e) => {
                warn!("⚠️ Firma ilegible para la reserva {}: {}", form.reservation_id, e);
                SignatureOutcome::Unreadable
            }
        },
    };

    match signature {
        SignatureOutcome::Missing => layer.use_text(NO_SIGNATURE_TEXT, 12.0, Mm(20.0), Mm(y), &body_font),
        SignatureOutcome::Unreadable => layer.use_text(SIGNATURE_ERROR_TEXT, 12.0, Mm(20.0), Mm(y), &body_font),
        SignatureOutcome::Embedded => {}
    }

    let bytes = doc.save_to_bytes().map_err(|e| anyhow!("pdf serialization error: {}", e))?;
    Ok(RenderedAuthorization { bytes, signature })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(signature: Option<&str>) -> AuthorizationForm {
        AuthorizationForm {
            reservation_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 11).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
            guest_name: "Guest".to_string(),
            card_number: "4111111111111111".to_string(),
            amount: Decimal::from(7400),
            signature: signature.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_signature_data_url() {
        assert_eq!(decode_signature_data_url("data:image/png;base64,aGVsbG8=").unwrap(), b"hello");
        assert!(decode_signature_data_url("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_signature_data_url("no comma here").is_err());
    }

    #[test]
    fn test_render_without_signature() {
        let rendered = render_authorization_pdf(&form(None)).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.signature, SignatureOutcome::Missing);
    }

    #[test]
    fn test_unreadable_signature_still_renders() {
        let rendered = render_authorization_pdf(&form(Some("data:image/png;base64,bm90IGEgcG5n"))).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.signature, SignatureOutcome::Unreadable);
    }
}

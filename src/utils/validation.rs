//! Utilidades de validación
//!
//! Expresiones regulares y validadores custom para los DTOs de entrada.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

lazy_static! {
    /// Número de tarjeta: exactamente 16 dígitos, sin separadores
    pub static ref CARD_NUMBER_REGEX: Regex = Regex::new(r"^\d{16}$").unwrap();

    /// Teléfono: dígitos con un `+` inicial opcional y separadores comunes
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").unwrap();
}

const SIGNATURE_PREFIX: &str = "data:image/";

/// Validar que un importe sea estrictamente positivo
pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que la firma sea un data URL de imagen
pub fn validate_signature_data_url(value: &str) -> Result<(), ValidationError> {
    if !value.starts_with(SIGNATURE_PREFIX) || !value.contains(";base64,") {
        return Err(ValidationError::new("signature_data_url"));
    }
    Ok(())
}

/// Mostrar solo los últimos 4 dígitos de una tarjeta
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
    let visible: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
    format!("**** **** **** {}", visible)
}

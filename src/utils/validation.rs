//! Utilidades de validación
//!
//! Helpers compartidos por los DTOs y el gestor del ciclo de vida.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Mayor monto que admite una columna `NUMERIC(12, 2)`
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Validador `custom` para montos: cero o positivo
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Strings vacíos o solo espacios cuentan como ausentes
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Placas siempre en mayúsculas y sin espacios alrededor
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

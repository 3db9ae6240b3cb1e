// 📐 Validation Gate - decides whether a boleto may be encoded
//
// Barcode assembly asks a Validator first and refuses on any failure.

use crate::barcode::{AMOUNT_WIDTH, DATE_FACTOR_EPOCH};
use crate::boleto::Boleto;
use crate::formatter::is_numeric;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn missing(field: impl Into<String>, context: impl Into<String>) -> Self {
        ValidationError::new(field, "não pode estar em branco.", context)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validator - anything that can gate barcode assembly
pub trait Validator {
    fn validate(&self, boleto: &Boleto) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&Boleto) -> ValidationResult,
{
    fn validate(&self, boleto: &Boleto) -> ValidationResult {
        self(boleto)
    }
}

// ============================================================================
// SCHEMA VALIDATOR
// ============================================================================

/// Default gate: presence, numericality, bank layout limits, encodable value
/// and date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        SchemaValidator
    }

    /// Required attributes
    pub fn validate_presence(&self, boleto: &Boleto) -> Vec<ValidationError> {
        let context = "Boleto";
        let required = [
            ("conta_corrente", boleto.account()),
            ("numero_documento", boleto.document_number()),
            ("sacado", boleto.payer()),
            ("sacado_documento", boleto.payer_document()),
        ];

        required
            .iter()
            .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
            .map(|(field, _)| ValidationError::missing(*field, context))
            .collect()
    }

    /// Fields that end up in the barcode must be digits (when present)
    pub fn validate_numeric(&self, boleto: &Boleto) -> Vec<ValidationError> {
        let context = "Boleto";
        let numeric = [
            ("agencia", boleto.agency()),
            ("conta_corrente", boleto.account()),
            ("numero_documento", boleto.document_number()),
            ("carteira", Some(boleto.wallet())),
        ];

        numeric
            .iter()
            .filter_map(|(field, value)| {
                let value = (*value)?;
                if is_numeric(value) {
                    None
                } else {
                    Some(ValidationError::new(*field, "não é um número.", context))
                }
            })
            .collect()
    }

    /// Value, quantity and due date must be representable in the barcode
    pub fn validate_encodable(&self, boleto: &Boleto) -> Vec<ValidationError> {
        let context = "Boleto";
        let mut errors = Vec::new();

        if boleto.quantity() == 0 {
            errors.push(ValidationError::new(
                "quantidade",
                "deve ser maior que zero.",
                context,
            ));
        }

        if boleto.amount().is_sign_negative() && !boleto.amount().is_zero() {
            errors.push(ValidationError::new("valor", "não pode ser negativo.", context));
        } else {
            let max_cents = 10u64.pow(AMOUNT_WIDTH as u32) - 1;
            let cents = boleto
                .document_value()
                .and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED))
                .and_then(|cents| cents.trunc().to_u64());
            if cents.map_or(true, |c| c > max_cents) {
                errors.push(ValidationError::new(
                    "valor_documento",
                    format!("deve caber em {} dígitos de centavos.", AMOUNT_WIDTH),
                    context,
                ));
            }
        }

        if boleto.due_date() < DATE_FACTOR_EPOCH {
            errors.push(ValidationError::new(
                "data_vencimento",
                format!("não pode ser anterior a {}.", DATE_FACTOR_EPOCH),
                context,
            ));
        }

        errors
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, boleto: &Boleto) -> ValidationResult {
        let mut errors = self.validate_presence(boleto);
        errors.extend(self.validate_numeric(boleto));
        errors.extend(boleto.variant().validate_layout(boleto));
        errors.extend(self.validate_encodable(boleto));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// 📏 Field Formatter - fixed-width, zero-padded digit strings
//
// Every bank field that lands in the barcode has a declared width. Raw values
// arrive as user text or numbers and are normalized once, when assigned.

use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD SPEC
// ============================================================================

/// What to do when a raw value is longer than its declared width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overflow {
    /// Keep the leading `width` characters (account numbers)
    KeepLeading,

    /// Leave the value as entered; the validation gate reports the length
    Preserve,
}

/// Declared width + overflow policy for one boleto field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub overflow: Overflow,
}

impl FieldSpec {
    pub const fn new(name: &'static str, width: usize, overflow: Overflow) -> Self {
        FieldSpec {
            name,
            width,
            overflow,
        }
    }

    /// Normalize a raw value to this field's width
    pub fn normalize(&self, raw: &str) -> String {
        normalize(raw, self.width, self.overflow)
    }
}

/// Every wallet (carteira) code is two digits, whatever the bank.
pub const WALLET: FieldSpec = FieldSpec::new("carteira", 2, Overflow::Preserve);

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Left-pad `raw` with zeros to `width`, applying `overflow` to longer input.
///
/// Surrounding whitespace is dropped first.
pub fn normalize(raw: &str, width: usize, overflow: Overflow) -> String {
    let value = raw.trim();
    let len = value.chars().count();

    if len <= width {
        return format!("{:0>width$}", value, width = width);
    }

    match overflow {
        Overflow::KeepLeading => value.chars().take(width).collect(),
        Overflow::Preserve => value.to_string(),
    }
}

/// Zero-pad a number to `width` digits; `None` if it does not fit
pub fn pad_number(value: u64, width: usize) -> Option<String> {
    let rendered = format!("{:0>width$}", value, width = width);
    if rendered.len() == width {
        Some(rendered)
    } else {
        None
    }
}

pub fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

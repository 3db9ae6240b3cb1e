// 📊 Barcode Assembler - the 44-digit FEBRABAN payload
//
// Layout:
//   bank(3) currency(1) DV(1) date factor(4) amount(10) free segment(25)
//
// The DV is modulo-11 over the other 43 digits and is spliced in at
// position 5.

use crate::checksum::{eleven_minus_remainder, CheckDigit, Modulo11};
use crate::error::{BoletoError, Result};
use crate::formatter::{is_numeric, pad_number};
use crate::linha_digitavel::LinhaDigitavel;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Real (BRL)
pub const CURRENCY_REAL: &str = "9";

pub const BARCODE_LEN: usize = 44;
pub const FREE_SEGMENT_WIDTH: usize = 25;
pub const DATE_FACTOR_WIDTH: usize = 4;
pub const AMOUNT_WIDTH: usize = 10;

/// Day zero of the date factor
pub const DATE_FACTOR_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1997, 10, 7) {
    Some(date) => date,
    None => panic!("invalid date factor epoch"),
};

/// Global DV: cycle 2..=9, and 0/10/11 all print as 1
const GLOBAL_CHECK: Modulo11 = Modulo11::new(
    &[2, 3, 4, 5, 6, 7, 8, 9],
    eleven_minus_remainder,
    &[
        (0, CheckDigit::Digit(1)),
        (10, CheckDigit::Digit(1)),
        (11, CheckDigit::Digit(1)),
    ],
);

// ============================================================================
// FIELD ENCODERS
// ============================================================================

/// Days from 1997-10-07 to `due_date`, as 4 digits.
///
/// The factor hit 9999 on 2025-02-21; from 2025-02-22 it restarts at 1000.
pub fn date_factor(due_date: NaiveDate) -> Result<String> {
    let days = i64::from(due_date.num_days_from_ce() - DATE_FACTOR_EPOCH.num_days_from_ce());
    if days < 0 {
        return Err(BoletoError::EncodingPrecondition(format!(
            "due date {} is before {}",
            due_date, DATE_FACTOR_EPOCH
        )));
    }

    let mut factor = days as u64;
    while factor > 9999 {
        factor -= 9000;
    }

    pad_number(factor, DATE_FACTOR_WIDTH).ok_or_else(|| {
        BoletoError::EncodingPrecondition(format!("date factor {} overflows", factor))
    })
}

/// Value in cents (truncated), as 10 digits
pub fn amount_field(value: Decimal) -> Result<String> {
    let cents = value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_u64())
        .ok_or_else(|| {
            BoletoError::EncodingPrecondition(format!("amount {} is not encodable", value))
        })?;

    pad_number(cents, AMOUNT_WIDTH).ok_or_else(|| {
        BoletoError::EncodingPrecondition(format!(
            "amount {} exceeds {} digits",
            value, AMOUNT_WIDTH
        ))
    })
}

fn global_check_digit(body: &str) -> Result<char> {
    GLOBAL_CHECK.check_digit(body).map(|dv| dv.as_char())
}

fn require_digits(name: &str, value: &str, width: usize) -> Result<()> {
    if value.len() == width && is_numeric(value) {
        Ok(())
    } else {
        Err(BoletoError::EncodingPrecondition(format!(
            "{} must be {} digits, got {:?}",
            name, width, value
        )))
    }
}

// ============================================================================
// BARCODE
// ============================================================================

/// Barcode - exactly 44 digits with a verified global DV
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Assemble from the shared fields and the bank's free segment
    pub fn assemble(
        bank_code: &str,
        currency: &str,
        due_date: NaiveDate,
        value: Decimal,
        free_segment: &str,
    ) -> Result<Barcode> {
        require_digits("bank code", bank_code, 3)?;
        require_digits("currency", currency, 1)?;
        require_digits("free segment", free_segment, FREE_SEGMENT_WIDTH)?;

        let factor = date_factor(due_date)?;
        let amount = amount_field(value)?;

        let body = format!("{}{}{}{}{}", bank_code, currency, factor, amount, free_segment);
        let dv = global_check_digit(&body)?;

        let mut code = String::with_capacity(BARCODE_LEN);
        code.push_str(&body[..4]);
        code.push(dv);
        code.push_str(&body[4..]);

        Ok(Barcode(code))
    }

    /// Parse a 44-digit barcode, checking its global DV
    pub fn parse(input: &str) -> Result<Barcode> {
        let code = input.trim();
        if code.len() != BARCODE_LEN || !is_numeric(code) {
            return Err(BoletoError::Parse(format!(
                "barcode must be {} digits, got {:?}",
                BARCODE_LEN, code
            )));
        }

        let body = format!("{}{}", &code[..4], &code[5..]);
        let expected = global_check_digit(&body)?;
        let found = code[4..5].chars().next().unwrap_or_default();
        if expected != found {
            return Err(BoletoError::Parse(format!(
                "barcode check digit is {}, expected {}",
                found, expected
            )));
        }

        Ok(Barcode(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bank_code(&self) -> &str {
        &self.0[0..3]
    }

    pub fn currency(&self) -> &str {
        &self.0[3..4]
    }

    pub fn check_digit(&self) -> &str {
        &self.0[4..5]
    }

    pub fn date_factor(&self) -> &str {
        &self.0[5..9]
    }

    pub fn amount_field(&self) -> &str {
        &self.0[9..19]
    }

    /// Encoded value back in reais
    pub fn amount(&self) -> Decimal {
        self.amount_field()
            .parse::<i64>()
            .map(|cents| Decimal::new(cents, 2))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn free_segment(&self) -> &str {
        &self.0[19..44]
    }

    pub fn linha_digitavel(&self) -> Result<LinhaDigitavel> {
        LinhaDigitavel::from_barcode(self)
    }
}

impl TryFrom<String> for Barcode {
    type Error = BoletoError;

    fn try_from(value: String) -> Result<Barcode> {
        Barcode::parse(&value)
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// 🔢 Checksum Engine - FEBRABAN modulo-10 / modulo-11
//
// Pure functions over digit strings. Every bank check digit (agency, account,
// nosso número) and the global barcode digit is produced here; the bank only
// supplies the parameters.

use crate::error::{BoletoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CHECK DIGIT
// ============================================================================

/// A single emitted check digit.
///
/// A raw modulo-11 result of 10 or 11 never leaks out: the bank's remap table
/// turns it into either a plain digit or a letter (Banco Inter prints `P`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckDigit {
    Digit(u8),
    Letter(char),
}

impl CheckDigit {
    pub fn as_char(&self) -> char {
        match self {
            CheckDigit::Digit(d) => char::from(b'0' + d),
            CheckDigit::Letter(c) => *c,
        }
    }
}

impl fmt::Display for CheckDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// MODULO-11 PARAMETERS
// ============================================================================

/// `11 - (total % 11)`, the finishing step used by almost every bank.
pub fn eleven_minus_remainder(total: u32) -> u32 {
    11 - (total % 11)
}

/// Parameter set for one modulo-11 call site.
///
/// Kept as data so a bank variant is a table of these, not a pile of methods.
#[derive(Debug, Clone, Copy)]
pub struct Modulo11 {
    /// Weights applied right-to-left, restarting from the first when exhausted
    pub multipliers: &'static [u32],

    /// Turns the weighted sum into the raw result
    pub finish: fn(u32) -> u32,

    /// Raw results that must be replaced before emission
    pub remap: &'static [(u32, CheckDigit)],
}

impl Modulo11 {
    pub const fn new(
        multipliers: &'static [u32],
        finish: fn(u32) -> u32,
        remap: &'static [(u32, CheckDigit)],
    ) -> Self {
        Modulo11 {
            multipliers,
            finish,
            remap,
        }
    }

    /// Compute the check digit of `digits` with these parameters
    pub fn check_digit(&self, digits: &str) -> Result<CheckDigit> {
        modulo11(digits, self)
    }
}

// ============================================================================
// ALGORITHMS
// ============================================================================

fn digit_values(digits: &str) -> Result<Vec<u32>> {
    digits
        .chars()
        .map(|c| {
            c.to_digit(10)
                .ok_or_else(|| BoletoError::ChecksumInputInvalid(digits.to_string()))
        })
        .collect()
}

/// Modulo-10 with the 2,1 cycle from the right and cross-summed products.
///
/// Used for the three first fields of the linha digitável.
pub fn modulo10(digits: &str) -> Result<u8> {
    let values = digit_values(digits)?;

    let total: u32 = values
        .iter()
        .rev()
        .zip([2u32, 1].iter().cycle())
        .map(|(value, weight)| {
            let product = value * weight;
            product / 10 + product % 10
        })
        .sum();

    Ok(((10 - total % 10) % 10) as u8)
}

/// Weighted sum right-to-left with a cycling multiplier table, no cross-sum.
pub fn weighted_sum(digits: &str, multipliers: &[u32]) -> Result<u32> {
    if multipliers.is_empty() {
        return Err(BoletoError::EncodingPrecondition(
            "modulo-11 multiplier cycle is empty".to_string(),
        ));
    }

    let values = digit_values(digits)?;

    Ok(values
        .iter()
        .rev()
        .zip(multipliers.iter().cycle())
        .map(|(value, weight)| value * weight)
        .sum())
}

/// Modulo-11: weighted sum, finishing function, then the remap table.
///
/// A finished value outside 0..=9 with no remap entry is a parameter bug and
/// comes back as `EncodingPrecondition`, never as a two-digit "digit".
pub fn modulo11(digits: &str, params: &Modulo11) -> Result<CheckDigit> {
    let total = weighted_sum(digits, params.multipliers)?;
    let raw = (params.finish)(total);

    if let Some((_, mapped)) = params.remap.iter().find(|(reserved, _)| *reserved == raw) {
        return Ok(*mapped);
    }

    if raw > 9 {
        return Err(BoletoError::EncodingPrecondition(format!(
            "modulo-11 result {} for {:?} has no remap entry",
            raw, digits
        )));
    }

    Ok(CheckDigit::Digit(raw as u8))
}

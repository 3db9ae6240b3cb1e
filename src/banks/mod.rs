// 🏦 Bank Variants - one implementation per issuing bank
//
// Adding a bank = implementing BankVariant and registering it in `get_variant`.
// Barcode and linha digitável assembly only ever see `&dyn BankVariant`.

pub mod inter;

pub use inter::Inter;

use crate::boleto::Boleto;
use crate::checksum::{CheckDigit, Modulo11};
use crate::error::{BoletoError, Result};
use crate::formatter::FieldSpec;
use crate::schema::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// BANK IDENTITY
// ============================================================================

/// Bank - which institution issues the boleto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    /// Banco Inter (formerly Banco Intermedium)
    Inter,
}

impl Bank {
    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Bank::Inter => "Banco Inter",
        }
    }

    /// FEBRABAN compensation code (always 3 digits)
    pub fn code(&self) -> &'static str {
        match self {
            Bank::Inter => "077",
        }
    }

    pub fn all() -> &'static [Bank] {
        &[Bank::Inter]
    }

    /// Look a bank up by its compensation code
    pub fn from_code(code: &str) -> Result<Bank> {
        Bank::all()
            .iter()
            .copied()
            .find(|bank| bank.code() == code)
            .ok_or_else(|| BoletoError::UnknownBank(code.to_string()))
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl FromStr for Bank {
    type Err = BoletoError;

    /// Accepts the compensation code or a short name ("inter", "intermedium")
    fn from_str(s: &str) -> Result<Bank> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "inter" | "intermedium" | "banco inter" => Ok(Bank::Inter),
            _ => Bank::from_code(&key),
        }
    }
}

// ============================================================================
// BANK PARAMETERS (data, not behavior)
// ============================================================================

/// Width rules for the fields a bank puts in its free segment
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout {
    pub account: FieldSpec,
    pub document_number: FieldSpec,
    pub wallet: FieldSpec,
}

/// Modulo-11 parameters for each check digit the bank prints
#[derive(Debug, Clone, Copy)]
pub struct BankChecksums {
    pub agency: Modulo11,
    pub account: Modulo11,
    pub our_number: Modulo11,
}

// ============================================================================
// BANK VARIANT TRAIT
// ============================================================================

/// BankVariant - the per-bank half of a boleto
///
/// Required methods are the bank's constants and its free segment layout.
/// Every check digit and display composite has a default built from
/// `layout()` + `checksums()`, so most banks only supply data.
pub trait BankVariant: Send + Sync {
    fn bank(&self) -> Bank;

    /// Compensation code (3 digits)
    fn code(&self) -> &'static str {
        self.bank().code()
    }

    /// Wallet (carteira) used when the caller sets none
    fn default_wallet(&self) -> &'static str;

    /// Agency forced by the bank, ignoring whatever the caller passes
    fn fixed_agency(&self) -> Option<&'static str> {
        None
    }

    /// Payment place forced by the bank
    fn payment_place(&self) -> Option<&'static str> {
        None
    }

    fn product_code(&self) -> &'static str;

    fn system_code(&self) -> &'static str;

    /// Espécie do documento
    fn document_kind(&self) -> &'static str {
        "DM"
    }

    fn acceptance(&self) -> &'static str {
        "N"
    }

    fn layout(&self) -> &FieldLayout;

    fn checksums(&self) -> &BankChecksums;

    /// The 25-digit bank-specific barcode segment, in the bank's order
    fn free_segment(&self, boleto: &Boleto) -> Result<String>;

    fn agency_check_digit(&self, boleto: &Boleto) -> Result<CheckDigit> {
        self.checksums().agency.check_digit(boleto.require_agency()?)
    }

    fn account_check_digit(&self, boleto: &Boleto) -> Result<CheckDigit> {
        self.checksums().account.check_digit(boleto.require_account()?)
    }

    /// Wallet + document number, the digits the nosso número DV covers
    fn our_number(&self, boleto: &Boleto) -> Result<String> {
        Ok(format!("{}{}", boleto.wallet(), boleto.require_document_number()?))
    }

    fn our_number_check_digit(&self, boleto: &Boleto) -> Result<CheckDigit> {
        self.checksums().our_number.check_digit(&self.our_number(boleto)?)
    }

    /// e.g. `19/0000006-1`
    fn our_number_display(&self, boleto: &Boleto) -> Result<String> {
        Ok(format!(
            "{}/{}-{}",
            boleto.wallet(),
            boleto.require_document_number()?,
            self.our_number_check_digit(boleto)?
        ))
    }

    /// e.g. `1-9 / 0000619898-8`
    fn agency_account_display(&self, boleto: &Boleto) -> Result<String> {
        Ok(format!(
            "{}-{} / {}-{}",
            boleto.require_agency()?,
            self.agency_check_digit(boleto)?,
            boleto.require_account()?,
            self.account_check_digit(boleto)?
        ))
    }

    /// Length limits from the bank's layout, reported to the validation gate
    fn validate_layout(&self, boleto: &Boleto) -> Vec<ValidationError> {
        let layout = self.layout();
        let context = self.bank().name();

        [
            (layout.document_number, boleto.document_number()),
            (layout.account, boleto.account()),
            (layout.wallet, Some(boleto.wallet())),
        ]
        .iter()
        .filter_map(|(spec, value)| {
            let value = (*value)?;
            if value.chars().count() > spec.width {
                Some(ValidationError::new(
                    spec.name,
                    format!("deve ser menor ou igual a {} dígitos.", spec.width),
                    context,
                ))
            } else {
                None
            }
        })
        .collect()
    }
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Get the variant for a bank
///
/// Factory pattern: Returns Box<dyn BankVariant> for polymorphism
pub fn get_variant(bank: Bank) -> Box<dyn BankVariant> {
    match bank {
        Bank::Inter => Box::new(Inter::new()),
    }
}

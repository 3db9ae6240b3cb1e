// 🧾 Boleto - the aggregate record
//
// Built once from a configuration map, with the bank's defaults merged in at
// construction. Field setters normalize immediately, so every read returns
// the fixed-width form. All encodings are pure functions of current state.

use crate::banks::{get_variant, Bank, BankVariant};
use crate::barcode::{Barcode, CURRENCY_REAL};
use crate::checksum::CheckDigit;
use crate::error::{BoletoError, Result};
use crate::linha_digitavel::LinhaDigitavel;
use crate::render::{BoletoRenderer, PaymentSlip};
use crate::schema::{SchemaValidator, ValidationError, ValidationResult, Validator};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONFIGURATION MAP
// ============================================================================

/// A field that may arrive as text or as a bare number (`"15234"` or `15234`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(u64),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => write!(f, "{}", text),
            RawValue::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<u64> for RawValue {
    fn from(value: u64) -> Self {
        RawValue::Number(value)
    }
}

/// BoletoConfig - named attributes as the caller supplies them
///
/// Keys accept the Portuguese names banks use (`valor`, `conta_corrente`, ...).
/// Anything left unset is filled from defaults by `Boleto::from_config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoletoConfig {
    #[serde(default, alias = "valor")]
    pub amount: Option<Decimal>,

    #[serde(default, alias = "quantidade")]
    pub quantity: Option<u32>,

    #[serde(default, alias = "data_documento")]
    pub issue_date: Option<NaiveDate>,

    #[serde(default, alias = "data_vencimento")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, alias = "numero_documento")]
    pub document_number: Option<RawValue>,

    #[serde(default, alias = "conta_corrente")]
    pub account: Option<RawValue>,

    #[serde(default, alias = "agencia")]
    pub agency: Option<RawValue>,

    #[serde(default, alias = "carteira")]
    pub wallet: Option<RawValue>,

    /// Cedente (beneficiary)
    #[serde(default, alias = "cedente")]
    pub payee: Option<String>,

    #[serde(default, alias = "documento_cedente")]
    pub payee_document: Option<String>,

    /// Sacado (payer)
    #[serde(default, alias = "sacado")]
    pub payer: Option<String>,

    #[serde(default, alias = "sacado_documento")]
    pub payer_document: Option<String>,

    #[serde(default, alias = "sacado_endereco")]
    pub payer_address: Option<String>,

    #[serde(default, alias = "local_pagamento")]
    pub payment_place: Option<String>,

    #[serde(default, alias = "instrucoes")]
    pub instructions: Vec<String>,
}

impl BoletoConfig {
    /// Parse a JSON object into a config
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// BOLETO
// ============================================================================

pub struct Boleto {
    variant: Box<dyn BankVariant>,

    amount: Decimal,
    quantity: u32,
    issue_date: NaiveDate,
    due_date: NaiveDate,

    // Normalized on assignment
    document_number: Option<String>,
    account: Option<String>,
    agency: Option<String>,
    wallet: String,

    payee: Option<String>,
    payee_document: Option<String>,
    payer: Option<String>,
    payer_document: Option<String>,
    payer_address: Option<String>,
    payment_place: String,
    instructions: Vec<String>,
}

impl fmt::Debug for Boleto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boleto")
            .field("bank", &self.variant.bank())
            .field("amount", &self.amount)
            .field("quantity", &self.quantity)
            .field("issue_date", &self.issue_date)
            .field("due_date", &self.due_date)
            .field("document_number", &self.document_number)
            .field("account", &self.account)
            .field("wallet", &self.wallet)
            .field("payer", &self.payer)
            .finish()
    }
}

impl Boleto {
    /// Boleto with every attribute at its default
    pub fn new(bank: Bank) -> Self {
        Boleto::from_config(bank, BoletoConfig::default())
    }

    pub fn from_config(bank: Bank, config: BoletoConfig) -> Self {
        Boleto::with_variant(get_variant(bank), config, Local::now().date_naive())
    }

    pub fn from_json(bank: Bank, json: &str) -> Result<Self> {
        Ok(Boleto::from_config(bank, BoletoConfig::from_json(json)?))
    }

    /// Construct against an explicit variant, merging defaults once.
    ///
    /// `today` fills unset issue/due dates.
    pub fn with_variant(
        variant: Box<dyn BankVariant>,
        config: BoletoConfig,
        today: NaiveDate,
    ) -> Self {
        let payment_place = variant
            .payment_place()
            .map(str::to_string)
            .or(config.payment_place)
            .unwrap_or_default();
        let wallet = config
            .wallet
            .map(|w| w.to_string())
            .unwrap_or_else(|| variant.default_wallet().to_string());

        let mut boleto = Boleto {
            amount: config.amount.unwrap_or(Decimal::ZERO),
            quantity: config.quantity.unwrap_or(1),
            issue_date: config.issue_date.unwrap_or(today),
            due_date: config.due_date.unwrap_or(today),
            document_number: None,
            account: None,
            agency: None,
            wallet: String::new(),
            payee: config.payee,
            payee_document: config.payee_document,
            payer: config.payer,
            payer_document: config.payer_document,
            payer_address: config.payer_address,
            payment_place,
            instructions: config.instructions,
            variant,
        };

        boleto.set_wallet(wallet);
        if let Some(document_number) = config.document_number {
            boleto.set_document_number(document_number);
        }
        if let Some(account) = config.account {
            boleto.set_account(account);
        }
        if let Some(agency) = config.agency {
            boleto.set_agency(agency);
        }

        boleto
    }

    // ------------------------------------------------------------------------
    // Normalizing setters (return the stored form)
    // ------------------------------------------------------------------------

    pub fn set_account(&mut self, raw: impl ToString) -> &str {
        let spec = self.variant.layout().account;
        self.account.insert(spec.normalize(&raw.to_string()))
    }

    pub fn set_document_number(&mut self, raw: impl ToString) -> &str {
        let spec = self.variant.layout().document_number;
        self.document_number
            .insert(spec.normalize(&raw.to_string()))
    }

    pub fn set_wallet(&mut self, raw: impl ToString) -> &str {
        let spec = self.variant.layout().wallet;
        self.wallet = spec.normalize(&raw.to_string());
        &self.wallet
    }

    pub fn set_agency(&mut self, raw: impl ToString) -> &str {
        self.agency.insert(raw.to_string().trim().to_string())
    }

    pub fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub fn set_issue_date(&mut self, date: NaiveDate) {
        self.issue_date = date;
    }

    pub fn set_due_date(&mut self, date: NaiveDate) {
        self.due_date = date;
    }

    pub fn set_payer(&mut self, name: impl Into<String>, document: impl Into<String>) {
        self.payer = Some(name.into());
        self.payer_document = Some(document.into());
    }

    pub fn set_payee(&mut self, name: impl Into<String>, document: impl Into<String>) {
        self.payee = Some(name.into());
        self.payee_document = Some(document.into());
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn bank(&self) -> Bank {
        self.variant.bank()
    }

    pub fn variant(&self) -> &dyn BankVariant {
        self.variant.as_ref()
    }

    pub fn bank_code(&self) -> &'static str {
        self.variant.code()
    }

    pub fn currency(&self) -> &'static str {
        CURRENCY_REAL
    }

    /// Espécie (currency symbol printed on the slip)
    pub fn species(&self) -> &'static str {
        "R$"
    }

    pub fn document_kind(&self) -> &'static str {
        self.variant.document_kind()
    }

    pub fn acceptance(&self) -> &'static str {
        self.variant.acceptance()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// quantity × amount, the value the barcode encodes; `None` on overflow
    pub fn document_value(&self) -> Option<Decimal> {
        self.amount.checked_mul(Decimal::from(self.quantity))
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn document_number(&self) -> Option<&str> {
        self.document_number.as_deref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// The bank's fixed agency when it has one, else the configured agency
    pub fn agency(&self) -> Option<&str> {
        self.variant.fixed_agency().or(self.agency.as_deref())
    }

    pub fn wallet(&self) -> &str {
        &self.wallet
    }

    pub fn payee(&self) -> Option<&str> {
        self.payee.as_deref()
    }

    pub fn payee_document(&self) -> Option<&str> {
        self.payee_document.as_deref()
    }

    pub fn payer(&self) -> Option<&str> {
        self.payer.as_deref()
    }

    pub fn payer_document(&self) -> Option<&str> {
        self.payer_document.as_deref()
    }

    pub fn payer_address(&self) -> Option<&str> {
        self.payer_address.as_deref()
    }

    pub fn payment_place(&self) -> &str {
        &self.payment_place
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub(crate) fn require_account(&self) -> Result<&str> {
        self.account().ok_or_else(|| missing("conta_corrente"))
    }

    pub(crate) fn require_document_number(&self) -> Result<&str> {
        self.document_number().ok_or_else(|| missing("numero_documento"))
    }

    pub(crate) fn require_agency(&self) -> Result<&str> {
        self.agency().ok_or_else(|| missing("agencia"))
    }

    pub(crate) fn require_document_value(&self) -> Result<Decimal> {
        self.document_value().ok_or_else(|| {
            BoletoError::EncodingPrecondition(format!(
                "valor {} × quantidade {} overflows",
                self.amount, self.quantity
            ))
        })
    }

    // ------------------------------------------------------------------------
    // Bank derivations
    // ------------------------------------------------------------------------

    pub fn agency_check_digit(&self) -> Result<CheckDigit> {
        self.variant.agency_check_digit(self)
    }

    pub fn account_check_digit(&self) -> Result<CheckDigit> {
        self.variant.account_check_digit(self)
    }

    pub fn our_number_check_digit(&self) -> Result<CheckDigit> {
        self.variant.our_number_check_digit(self)
    }

    pub fn our_number_display(&self) -> Result<String> {
        self.variant.our_number_display(self)
    }

    pub fn agency_account_display(&self) -> Result<String> {
        self.variant.agency_account_display(self)
    }

    pub fn free_segment(&self) -> Result<String> {
        self.variant.free_segment(self)
    }

    // ------------------------------------------------------------------------
    // Validation + encoding
    // ------------------------------------------------------------------------

    /// Failures reported by the default validation gate
    pub fn errors(&self) -> Vec<ValidationError> {
        match SchemaValidator::new().validate(self) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// 44-digit barcode, gated by the default `SchemaValidator`
    pub fn barcode(&self) -> Result<Barcode> {
        self.barcode_with(&SchemaValidator::new())
    }

    /// 44-digit barcode, gated by a caller-supplied validator
    pub fn barcode_with(&self, gate: &dyn Validator) -> Result<Barcode> {
        let verdict: ValidationResult = gate.validate(self);
        if let Err(errors) = verdict {
            tracing::warn!(
                bank = self.bank_code(),
                errors = errors.len(),
                "validation gate refused barcode assembly"
            );
            return Err(BoletoError::AttributeInvalid(errors));
        }

        let barcode = Barcode::assemble(
            self.bank_code(),
            self.currency(),
            self.due_date,
            self.require_document_value()?,
            &self.free_segment()?,
        )?;

        tracing::debug!(bank = self.bank_code(), barcode = %barcode, "barcode assembled");
        Ok(barcode)
    }

    pub fn linha_digitavel(&self) -> Result<LinhaDigitavel> {
        LinhaDigitavel::from_barcode(&self.barcode()?)
    }

    /// Snapshot of every printable field, for a rendering collaborator
    pub fn payment_slip(&self) -> Result<PaymentSlip> {
        PaymentSlip::from_boleto(self)
    }

    pub fn render(&self, renderer: &dyn BoletoRenderer) -> Result<Vec<u8>> {
        renderer.render(&self.payment_slip()?)
    }
}

fn missing(field: &str) -> BoletoError {
    BoletoError::AttributeInvalid(vec![ValidationError::missing(field, "Boleto")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults_merged_on_construction() {
        let boleto = Boleto::new(Bank::Inter);
        let today = Local::now().date_naive();

        assert_eq!(boleto.bank_code(), "077");
        assert_eq!(boleto.currency(), "9");
        assert_eq!(boleto.species(), "R$");
        assert_eq!(boleto.wallet(), "12");
        assert_eq!(boleto.quantity(), 1);
        assert_eq!(boleto.amount(), Decimal::ZERO);
        assert_eq!(boleto.document_value(), Some(Decimal::ZERO));
        assert_eq!(boleto.issue_date(), today);
        assert_eq!(boleto.due_date(), today);
        assert_eq!(boleto.document_kind(), "OU");
        assert_eq!(boleto.acceptance(), "NAO");
        assert_eq!(boleto.payment_place(), "PAGÁVEL EM QUALQUER BANCO ATÉ O VENCIMENTO");
        assert_eq!(boleto.account(), None);
        assert_eq!(boleto.document_number(), None);
    }

    #[test]
    fn test_config_from_portuguese_keys() {
        let json = r#"{
            "valor": 2952.95,
            "quantidade": 2,
            "data_documento": "2009-04-30",
            "data_vencimento": "2009-04-30",
            "numero_documento": 15234,
            "conta_corrente": "0403005",
            "carteira": "19",
            "cedente": "Kivanio Barbosa",
            "documento_cedente": "12345678912",
            "sacado": "Claudio Pozzebom",
            "sacado_documento": "12345678900",
            "local_pagamento": "QUALQUER BANCO"
        }"#;
        let boleto = Boleto::from_json(Bank::Inter, json).unwrap();

        assert_eq!(boleto.amount(), Decimal::from_str("2952.95").unwrap());
        assert_eq!(boleto.document_value(), Some(Decimal::from_str("5905.90").unwrap()));
        assert_eq!(boleto.issue_date(), date(2009, 4, 30));
        assert_eq!(boleto.document_number(), Some("0015234"));
        assert_eq!(boleto.account(), Some("0000403005"));
        assert_eq!(boleto.wallet(), "19");
        assert_eq!(boleto.payee(), Some("Kivanio Barbosa"));
        assert_eq!(boleto.payer_document(), Some("12345678900"));
        // Inter forces its own payment place
        assert_eq!(boleto.payment_place(), "PAGÁVEL EM QUALQUER BANCO ATÉ O VENCIMENTO");
    }

    #[test]
    fn test_config_from_english_keys() {
        let json = r#"{"amount": "1.00", "due_date": "2017-11-21", "account": 61900}"#;
        let boleto = Boleto::from_json(Bank::Inter, json).unwrap();
        assert_eq!(boleto.amount(), Decimal::new(100, 2));
        assert_eq!(boleto.due_date(), date(2017, 11, 21));
        assert_eq!(boleto.account(), Some("0000061900"));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let result = Boleto::from_json(Bank::Inter, "{not json");
        assert!(matches!(result, Err(BoletoError::Json(_))));
    }

    #[test]
    fn test_setters_return_normalized_value() {
        let mut boleto = Boleto::new(Bank::Inter);
        assert_eq!(boleto.set_account("61900"), "0000061900");
        assert_eq!(boleto.set_account("123456789012"), "1234567890");
        assert_eq!(boleto.set_document_number(6), "0000006");
        assert_eq!(boleto.set_wallet(9), "09");
        assert_eq!(boleto.account(), Some("1234567890"));
    }

    #[test]
    fn test_require_missing_field_reports_attribute() {
        let boleto = Boleto::new(Bank::Inter);
        let err = boleto.account_check_digit().unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "conta_corrente");
    }

    #[test]
    fn test_barcode_is_deterministic() {
        let mut boleto = Boleto::new(Bank::Inter);
        boleto.set_account("919898");
        boleto.set_document_number("15234");
        boleto.set_payer("Claudio Pozzebom", "12345678900");
        boleto.set_amount(Decimal::new(100, 2));
        boleto.set_due_date(date(2017, 11, 21));

        let first = boleto.barcode().unwrap();
        let second = boleto.barcode().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "07793735000000001001000121000152340000919898");
    }

    #[test]
    fn test_quantity_multiplies_encoded_amount() {
        let mut boleto = Boleto::new(Bank::Inter);
        boleto.set_account("919898");
        boleto.set_document_number("15234");
        boleto.set_payer("Claudio Pozzebom", "12345678900");
        boleto.set_amount(Decimal::new(150, 2));
        boleto.set_quantity(3);
        boleto.set_due_date(date(2017, 11, 21));

        assert_eq!(boleto.barcode().unwrap().amount_field(), "0000000450");
    }
}

// 📦 Batch Encoding - CSV in, one outcome per row
//
// Headers use the same keys as the JSON config (Portuguese or English).
// A bad row is reported on its own line and never aborts the batch.

use crate::banks::Bank;
use crate::boleto::{Boleto, BoletoConfig, RawValue};
use crate::error::{BoletoError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// One CSV row as text; converted to a BoletoConfig field by field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvRow {
    #[serde(default, alias = "valor")]
    pub amount: Option<String>,
    #[serde(default, alias = "quantidade")]
    pub quantity: Option<String>,
    #[serde(default, alias = "data_documento")]
    pub issue_date: Option<String>,
    #[serde(default, alias = "data_vencimento")]
    pub due_date: Option<String>,
    #[serde(default, alias = "numero_documento")]
    pub document_number: Option<String>,
    #[serde(default, alias = "conta_corrente")]
    pub account: Option<String>,
    #[serde(default, alias = "agencia")]
    pub agency: Option<String>,
    #[serde(default, alias = "carteira")]
    pub wallet: Option<String>,
    #[serde(default, alias = "cedente")]
    pub payee: Option<String>,
    #[serde(default, alias = "documento_cedente")]
    pub payee_document: Option<String>,
    #[serde(default, alias = "sacado")]
    pub payer: Option<String>,
    #[serde(default, alias = "sacado_documento")]
    pub payer_document: Option<String>,
    #[serde(default, alias = "sacado_endereco")]
    pub payer_address: Option<String>,
}

impl CsvRow {
    pub fn into_config(self) -> Result<BoletoConfig> {
        Ok(BoletoConfig {
            amount: self.amount.as_deref().map(parse_amount).transpose()?,
            quantity: self
                .quantity
                .as_deref()
                .map(|q| {
                    q.trim()
                        .parse::<u32>()
                        .map_err(|_| BoletoError::Parse(format!("invalid quantidade {:?}", q)))
                })
                .transpose()?,
            issue_date: self.issue_date.as_deref().map(parse_date).transpose()?,
            due_date: self.due_date.as_deref().map(parse_date).transpose()?,
            document_number: self.document_number.map(RawValue::from),
            account: self.account.map(RawValue::from),
            agency: self.agency.map(RawValue::from),
            wallet: self.wallet.map(RawValue::from),
            payee: self.payee,
            payee_document: self.payee_document,
            payer: self.payer,
            payer_document: self.payer_document,
            payer_address: self.payer_address,
            ..BoletoConfig::default()
        })
    }
}

/// Accepts `1234.56` and the Brazilian `1.234,56`
fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&normalized)
        .map_err(|e| BoletoError::Parse(format!("invalid valor {:?}: {}", raw, e)))
}

/// Accepts ISO `2017-11-21` and Brazilian `21/11/2017`
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|e| BoletoError::Parse(format!("invalid date {:?}: {}", raw, e)))
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// What a successfully encoded row produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBoleto {
    pub document_number: String,
    pub our_number: String,
    pub barcode: String,
    pub linha_digitavel: String,
}

#[derive(Debug)]
pub struct BatchOutcome {
    /// 1-indexed line in the CSV file (header is line 1)
    pub line_number: usize,
    pub result: Result<EncodedBoleto>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub fn encode_boleto(boleto: &Boleto) -> Result<EncodedBoleto> {
    let barcode = boleto.barcode()?;
    let linha = barcode.linha_digitavel()?;

    Ok(EncodedBoleto {
        document_number: boleto.document_number().unwrap_or_default().to_string(),
        our_number: boleto.our_number_display()?,
        barcode: barcode.to_string(),
        linha_digitavel: linha.to_string(),
    })
}

/// Encode every row of a CSV stream for `bank`
pub fn encode_csv<R: Read>(reader: R, bank: Bank) -> Result<Vec<BatchOutcome>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut outcomes = Vec::new();

    for (index, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let line_number = index + 2; // 1-indexed + header row

        let result = record
            .map_err(BoletoError::from)
            .and_then(CsvRow::into_config)
            .and_then(|config| encode_boleto(&Boleto::from_config(bank, config)));

        if let Err(e) = &result {
            tracing::warn!(line = line_number, error = %e, "row not encoded");
        }

        outcomes.push(BatchOutcome {
            line_number,
            result,
        });
    }

    tracing::debug!(
        rows = outcomes.len(),
        encoded = outcomes.iter().filter(|o| o.is_ok()).count(),
        "batch finished"
    );

    Ok(outcomes)
}

pub fn encode_csv_path(path: &Path, bank: Bank) -> Result<Vec<BatchOutcome>> {
    let file = std::fs::File::open(path)?;
    encode_csv(file, bank)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
valor,data_vencimento,numero_documento,conta_corrente,sacado,sacado_documento
1.00,2017-11-21,15234,919898,Claudio Pozzebom,12345678900
\"1,00\",21/11/2017,15234,919898,Claudio Pozzebom,12345678900
1.00,2017-11-21,15234,,Claudio Pozzebom,12345678900
abc,2017-11-21,15234,919898,Claudio Pozzebom,12345678900
";

    #[test]
    fn test_encode_csv_rows() {
        let outcomes = encode_csv(CSV.as_bytes(), Bank::Inter).unwrap();
        assert_eq!(outcomes.len(), 4);

        let first = outcomes[0].result.as_ref().unwrap();
        assert_eq!(first.barcode, "07793735000000001001000121000152340000919898");
        assert_eq!(
            first.linha_digitavel,
            "07791.00015 21000.152344 00009.198987 3 73500000000100"
        );
        assert_eq!(first.our_number, "12/0015234-0");
        assert_eq!(outcomes[0].line_number, 2);

        // Brazilian number and date formats encode identically
        assert_eq!(outcomes[1].result.as_ref().unwrap(), first);
    }

    #[test]
    fn test_bad_rows_do_not_abort_batch() {
        let outcomes = encode_csv(CSV.as_bytes(), Bank::Inter).unwrap();

        let missing_account = outcomes[2].result.as_ref().unwrap_err();
        assert_eq!(missing_account.validation_errors()[0].field, "conta_corrente");

        assert!(matches!(outcomes[3].result, Err(BoletoError::Parse(_))));
        assert_eq!(outcomes[3].line_number, 5);
    }

    #[test]
    fn test_overflowing_amount_is_a_row_error() {
        let csv = "\
valor,data_vencimento,numero_documento,conta_corrente,sacado,sacado_documento
79228162514264337593543950335,2017-11-21,15234,919898,Claudio Pozzebom,12345678900
1.00,2017-11-21,15234,919898,Claudio Pozzebom,12345678900
";
        let outcomes = encode_csv(csv.as_bytes(), Bank::Inter).unwrap();
        assert_eq!(outcomes.len(), 2);

        let too_big = outcomes[0].result.as_ref().unwrap_err();
        assert_eq!(too_big.validation_errors()[0].field, "valor_documento");
        assert_eq!(
            outcomes[1].result.as_ref().unwrap().barcode,
            "07793735000000001001000121000152340000919898"
        );
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("2952.95").unwrap(), Decimal::new(295295, 2));
        assert_eq!(parse_amount("2.952,95").unwrap(), Decimal::new(295295, 2));
        assert!(parse_amount("R$ 10").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2009, 4, 30).unwrap();
        assert_eq!(parse_date("2009-04-30").unwrap(), expected);
        assert_eq!(parse_date("30/04/2009").unwrap(), expected);
        assert!(parse_date("April 30").is_err());
    }
}

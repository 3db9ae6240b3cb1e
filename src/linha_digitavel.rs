// 🔤 Linha Digitável - the typeable form of the barcode
//
//   AAAAA.AAAAA BBBBB.BBBBBB CCCCC.CCCCCC D EEEEEEEEEEEEEE
//
// A = bank + currency + free[0..5] + DV10
// B = free[5..15] + DV10
// C = free[15..25] + DV10
// D = global barcode DV
// E = date factor + amount
//
// Shared by every bank: it only looks at the generic barcode.

use crate::barcode::Barcode;
use crate::checksum::modulo10;
use crate::error::{BoletoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Digits in a linha digitável (44 barcode digits + 3 field DVs)
pub const LINHA_DIGITS: usize = 47;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct LinhaDigitavel(String);

impl LinhaDigitavel {
    pub fn from_barcode(barcode: &Barcode) -> Result<LinhaDigitavel> {
        let code = barcode.as_str();

        let field1 = format!("{}{}", &code[0..4], &code[19..24]);
        let field1 = with_dv(&field1)?;
        let field2 = with_dv(&code[24..34])?;
        let field3 = with_dv(&code[34..44])?;
        let field4 = &code[4..5];
        let field5 = &code[5..19];

        Ok(LinhaDigitavel(format!(
            "{}.{} {}.{} {}.{} {} {}",
            &field1[..5],
            &field1[5..],
            &field2[..5],
            &field2[5..],
            &field3[..5],
            &field3[5..],
            field4,
            field5
        )))
    }

    /// Parse typed input. Dots, spaces and dashes are ignored; the three
    /// field DVs and the global DV must all check out.
    pub fn parse(input: &str) -> Result<LinhaDigitavel> {
        let digits: String = input
            .chars()
            .filter(|c| !matches!(c, '.' | ' ' | '-'))
            .collect();

        if digits.len() != LINHA_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BoletoError::Parse(format!(
                "linha digitável must have {} digits, got {:?}",
                LINHA_DIGITS, input
            )));
        }

        for (name, field) in [
            ("campo 1", &digits[0..10]),
            ("campo 2", &digits[10..21]),
            ("campo 3", &digits[21..32]),
        ] {
            let (body, dv) = field.split_at(field.len() - 1);
            let expected = modulo10(body)?;
            if dv != expected.to_string() {
                return Err(BoletoError::Parse(format!(
                    "{} check digit is {}, expected {}",
                    name, dv, expected
                )));
            }
        }

        let barcode = Barcode::parse(&barcode_digits(&digits))?;
        LinhaDigitavel::from_barcode(&barcode)
    }

    /// The barcode this line was derived from
    pub fn to_barcode(&self) -> Result<Barcode> {
        Barcode::parse(&barcode_digits(&self.digits()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 47 digits without punctuation
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

fn with_dv(field: &str) -> Result<String> {
    Ok(format!("{}{}", field, modulo10(field)?))
}

/// Reorder 47 linha digits into the 44 barcode digits, dropping field DVs
fn barcode_digits(digits: &str) -> String {
    format!(
        "{}{}{}{}{}{}",
        &digits[0..4],
        &digits[32..33],
        &digits[33..47],
        &digits[4..9],
        &digits[10..20],
        &digits[21..31]
    )
}

impl TryFrom<String> for LinhaDigitavel {
    type Error = BoletoError;

    fn try_from(value: String) -> Result<LinhaDigitavel> {
        LinhaDigitavel::parse(&value)
    }
}

impl fmt::Display for LinhaDigitavel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARCODE: &str = "07793735000000001001000121000152340000919898";
    const LINHA: &str = "07791.00015 21000.152344 00009.198987 3 73500000000100";

    #[test]
    fn test_from_barcode() {
        let barcode = Barcode::parse(BARCODE).unwrap();
        let linha = LinhaDigitavel::from_barcode(&barcode).unwrap();
        assert_eq!(linha.as_str(), LINHA);
        assert_eq!(linha.digits().len(), LINHA_DIGITS);
    }

    #[test]
    fn test_back_to_barcode() {
        let barcode = Barcode::parse(BARCODE).unwrap();
        let linha = barcode.linha_digitavel().unwrap();
        assert_eq!(linha.to_barcode().unwrap(), barcode);
    }

    #[test]
    fn test_parse_without_punctuation() {
        let linha = LinhaDigitavel::parse("07791000152100015234400009198987373500000000100").unwrap();
        assert_eq!(linha.as_str(), LINHA);
    }

    #[test]
    fn test_parse_rejects_bad_field_dv() {
        let result = LinhaDigitavel::parse("07791.00016 21000.152344 00009.198987 3 73500000000100");
        assert!(matches!(result, Err(BoletoError::Parse(msg)) if msg.contains("campo 1")));
    }

    #[test]
    fn test_parse_rejects_bad_global_dv() {
        let result = LinhaDigitavel::parse("07791.00015 21000.152344 00009.198987 4 73500000000100");
        assert!(matches!(result, Err(BoletoError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(LinhaDigitavel::parse("07791.00015").is_err());
        assert!(LinhaDigitavel::parse("0779X.00015 21000.152344 00009.198987 3 73500000000100").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let linha = LinhaDigitavel::parse(LINHA).unwrap();
        let json = serde_json::to_string(&linha).unwrap();
        assert_eq!(json, format!("\"{}\"", LINHA));
        assert_eq!(serde_json::from_str::<LinhaDigitavel>(&json).unwrap(), linha);
    }

    #[test]
    fn test_deserialize_rejects_invalid_linha() {
        assert!(serde_json::from_str::<LinhaDigitavel>("\"1\"").is_err());
        assert!(serde_json::from_str::<LinhaDigitavel>(
            "\"07791.00016 21000.152344 00009.198987 3 73500000000100\""
        )
        .is_err());
    }
}

// 🟠 Banco Inter (077) - formerly Banco Intermedium
//
// Free segment (25 digits):
//   agency(1) + product(3) + wallet(2) + system(2) + document(7) + account(10)

use super::{Bank, BankChecksums, BankVariant, FieldLayout};
use crate::boleto::Boleto;
use crate::checksum::{eleven_minus_remainder, CheckDigit, Modulo11};
use crate::error::Result;
use crate::formatter::{FieldSpec, Overflow, WALLET};

/// DV 10 prints as `P`, DV 11 as `0`
const REMAP: &[(u32, CheckDigit)] = &[(10, CheckDigit::Letter('P')), (11, CheckDigit::Digit(0))];

const LAYOUT: FieldLayout = FieldLayout {
    account: FieldSpec::new("conta_corrente", 10, Overflow::KeepLeading),
    document_number: FieldSpec::new("numero_documento", 7, Overflow::Preserve),
    wallet: WALLET,
};

const CHECKSUMS: BankChecksums = BankChecksums {
    agency: Modulo11::new(&[2, 3, 4, 5], eleven_minus_remainder, REMAP),
    account: Modulo11::new(&[2, 3, 4, 5, 6, 7], eleven_minus_remainder, REMAP),
    our_number: Modulo11::new(&[2, 3, 4, 5, 6, 7], eleven_minus_remainder, REMAP),
};

pub struct Inter;

impl Inter {
    pub fn new() -> Self {
        Inter
    }
}

impl Default for Inter {
    fn default() -> Self {
        Inter::new()
    }
}

impl BankVariant for Inter {
    fn bank(&self) -> Bank {
        Bank::Inter
    }

    fn default_wallet(&self) -> &'static str {
        "12"
    }

    fn fixed_agency(&self) -> Option<&'static str> {
        Some("1")
    }

    fn payment_place(&self) -> Option<&'static str> {
        Some("PAGÁVEL EM QUALQUER BANCO ATÉ O VENCIMENTO")
    }

    fn product_code(&self) -> &'static str {
        "000"
    }

    fn system_code(&self) -> &'static str {
        "10"
    }

    fn document_kind(&self) -> &'static str {
        "OU"
    }

    fn acceptance(&self) -> &'static str {
        "NAO"
    }

    fn layout(&self) -> &FieldLayout {
        &LAYOUT
    }

    fn checksums(&self) -> &BankChecksums {
        &CHECKSUMS
    }

    fn free_segment(&self, boleto: &Boleto) -> Result<String> {
        Ok(format!(
            "{}{}{}{}{}{}",
            boleto.require_agency()?,
            self.product_code(),
            boleto.wallet(),
            self.system_code(),
            boleto.require_document_number()?,
            boleto.require_account()?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boleto::BoletoConfig;

    fn boleto_with_account(account: &str) -> Boleto {
        let mut boleto = Boleto::new(Bank::Inter);
        boleto.set_account(account);
        boleto
    }

    #[test]
    fn test_inter_constants() {
        let inter = Inter::new();
        assert_eq!(inter.code(), "077");
        assert_eq!(inter.product_code(), "000");
        assert_eq!(inter.system_code(), "10");
        assert_eq!(inter.document_kind(), "OU");
        assert_eq!(inter.acceptance(), "NAO");
    }

    #[test]
    fn test_inter_agency_check_digit() {
        let boleto = Boleto::new(Bank::Inter);
        assert_eq!(boleto.agency(), Some("1"));
        assert_eq!(boleto.agency_check_digit().unwrap(), CheckDigit::Digit(9));
    }

    #[test]
    fn test_inter_ignores_configured_agency() {
        let config = BoletoConfig {
            agency: Some("1172".into()),
            ..BoletoConfig::default()
        };
        let boleto = Boleto::from_config(Bank::Inter, config);
        assert_eq!(boleto.agency(), Some("1"));
    }

    #[test]
    fn test_inter_account_check_digits() {
        let cases = [
            ("0325620", CheckDigit::Digit(0)),
            ("0284025", CheckDigit::Digit(1)),
            ("0238069", CheckDigit::Digit(2)),
            ("0135323", CheckDigit::Digit(3)),
            ("0010667", CheckDigit::Digit(4)),
            ("0420571", CheckDigit::Digit(5)),
            ("0510701", CheckDigit::Digit(6)),
            ("0420536", CheckDigit::Digit(7)),
            ("0012500", CheckDigit::Digit(8)),
            ("0010673", CheckDigit::Digit(9)),
            ("0019669", CheckDigit::Letter('P')),
            ("0301357", CheckDigit::Letter('P')),
        ];

        for (account, expected) in cases {
            let boleto = boleto_with_account(account);
            assert_eq!(
                boleto.account_check_digit().unwrap(),
                expected,
                "account {}",
                account
            );
        }
    }

    #[test]
    fn test_inter_our_number_uses_wallet_and_document() {
        let mut boleto = Boleto::new(Bank::Inter);
        boleto.set_wallet("19");
        boleto.set_document_number(6);
        assert_eq!(Inter.our_number(&boleto).unwrap(), "190000006");
        assert_eq!(boleto.our_number_check_digit().unwrap(), CheckDigit::Digit(1));
    }

    #[test]
    fn test_inter_free_segment_is_25_digits() {
        let mut boleto = boleto_with_account("919898");
        boleto.set_document_number("15234");
        let segment = boleto.free_segment().unwrap();
        assert_eq!(segment, "1000121000152340000919898");
        assert_eq!(segment.len(), 25);
    }

    #[test]
    fn test_inter_layout_limits() {
        let mut boleto = boleto_with_account("61900");
        boleto.set_document_number("00000000002");
        let errors = Inter.validate_layout(&boleto);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "numero_documento");
    }
}

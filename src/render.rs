// 🖨️ Rendering contract - hand the encoded boleto to whoever prints it
//
// Graphic output (PDF, images, logos) lives outside this crate. Renderers
// receive a PaymentSlip with every printable field already computed.

use crate::boleto::Boleto;
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// PaymentSlip - everything printed on the ficha de compensação
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSlip {
    pub bank_code: String,
    pub bank_name: String,
    pub barcode: String,
    pub linha_digitavel: String,

    pub payment_place: String,
    pub due_date: NaiveDate,
    pub issue_date: NaiveDate,

    pub payee: Option<String>,
    pub payee_document: Option<String>,
    pub agency_account: String,

    pub document_number: String,
    pub our_number: String,
    pub document_kind: String,
    pub acceptance: String,
    pub wallet: String,
    pub species: String,
    pub quantity: u32,
    pub amount: Decimal,
    pub document_value: Decimal,

    pub payer: Option<String>,
    pub payer_document: Option<String>,
    pub payer_address: Option<String>,
    pub instructions: Vec<String>,
}

impl PaymentSlip {
    /// Encode the boleto (through the validation gate) and collect its fields
    pub fn from_boleto(boleto: &Boleto) -> Result<PaymentSlip> {
        let barcode = boleto.barcode()?;
        let linha = barcode.linha_digitavel()?;

        Ok(PaymentSlip {
            bank_code: boleto.bank_code().to_string(),
            bank_name: boleto.bank().name().to_string(),
            barcode: barcode.to_string(),
            linha_digitavel: linha.to_string(),
            payment_place: boleto.payment_place().to_string(),
            due_date: boleto.due_date(),
            issue_date: boleto.issue_date(),
            payee: boleto.payee().map(str::to_string),
            payee_document: boleto.payee_document().map(str::to_string),
            agency_account: boleto.agency_account_display()?,
            document_number: boleto.document_number().unwrap_or_default().to_string(),
            our_number: boleto.our_number_display()?,
            document_kind: boleto.document_kind().to_string(),
            acceptance: boleto.acceptance().to_string(),
            wallet: boleto.wallet().to_string(),
            species: boleto.species().to_string(),
            quantity: boleto.quantity(),
            amount: boleto.amount(),
            document_value: boleto.require_document_value()?,
            payer: boleto.payer().map(str::to_string),
            payer_document: boleto.payer_document().map(str::to_string),
            payer_address: boleto.payer_address().map(str::to_string),
            instructions: boleto.instructions().to_vec(),
        })
    }
}

/// BoletoRenderer - external document renderer contract
pub trait BoletoRenderer {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    fn render(&self, slip: &PaymentSlip) -> Result<Vec<u8>>;
}

/// Renders the slip as JSON, for hosts that lay out the document themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        JsonRenderer { pretty: false }
    }

    pub fn pretty() -> Self {
        JsonRenderer { pretty: true }
    }
}

impl BoletoRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, slip: &PaymentSlip) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(slip)?
        } else {
            serde_json::to_vec(slip)?
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banks::Bank;
    use crate::boleto::BoletoConfig;

    fn inter_boleto() -> Boleto {
        let config = BoletoConfig::from_json(
            r#"{
                "valor": "1.00",
                "data_documento": "2017-11-20",
                "data_vencimento": "2017-11-21",
                "numero_documento": "15234",
                "conta_corrente": "919898",
                "cedente": "Kivanio Barbosa",
                "documento_cedente": "12345678912",
                "sacado": "Claudio Pozzebom",
                "sacado_documento": "12345678900"
            }"#,
        )
        .unwrap();
        Boleto::from_config(Bank::Inter, config)
    }

    #[test]
    fn test_payment_slip_fields() {
        let slip = inter_boleto().payment_slip().unwrap();
        assert_eq!(slip.bank_code, "077");
        assert_eq!(slip.bank_name, "Banco Inter");
        assert_eq!(slip.barcode, "07793735000000001001000121000152340000919898");
        assert_eq!(
            slip.linha_digitavel,
            "07791.00015 21000.152344 00009.198987 3 73500000000100"
        );
        assert_eq!(slip.agency_account, "1-9 / 0000919898-9");
        assert_eq!(slip.our_number, "12/0015234-0");
        assert_eq!(slip.document_number, "0015234");
        assert_eq!(slip.document_kind, "OU");
    }

    #[test]
    fn test_payment_slip_refused_for_invalid_boleto() {
        assert!(Boleto::new(Bank::Inter).payment_slip().is_err());
    }

    #[test]
    fn test_json_renderer() {
        let boleto = inter_boleto();
        let renderer = JsonRenderer::new();
        let bytes = boleto.render(&renderer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(renderer.content_type(), "application/json");
        assert_eq!(value["bank_code"], "077");
        assert_eq!(value["due_date"], "2017-11-21");
    }
}

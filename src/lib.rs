// Boleto Construction - Core Library
// Encodes Brazilian boletos into the 44-digit barcode and the linha digitável

pub mod error;
pub mod checksum;        // modulo-10 / modulo-11 engine
pub mod formatter;       // fixed-width field normalization
pub mod banks;           // per-bank variants (Banco Inter)
pub mod boleto;          // aggregate record + configuration map
pub mod schema;          // validation gate
pub mod barcode;         // 44-digit barcode assembly
pub mod linha_digitavel; // 47-digit typeable line
pub mod render;          // rendering collaborator contract
pub mod batch;           // CSV batch encoding

// Re-export commonly used types
pub use error::{BoletoError, Result};
pub use checksum::{modulo10, modulo11, CheckDigit, Modulo11};
pub use formatter::{FieldSpec, Overflow};
pub use banks::{get_variant, Bank, BankChecksums, BankVariant, FieldLayout, Inter};
pub use boleto::{Boleto, BoletoConfig, RawValue};
pub use schema::{SchemaValidator, ValidationError, ValidationResult, Validator};
pub use barcode::{date_factor, Barcode, DATE_FACTOR_EPOCH};
pub use linha_digitavel::LinhaDigitavel;
pub use render::{BoletoRenderer, JsonRenderer, PaymentSlip};
pub use batch::{encode_boleto, encode_csv, encode_csv_path, BatchOutcome, EncodedBoleto};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

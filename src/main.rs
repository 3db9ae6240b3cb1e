use anyhow::{Context, Result};
use boleto_construction::{
    encode_csv_path, Bank, Barcode, Boleto, BoletoConfig, JsonRenderer, LinhaDigitavel,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "boleto", version, about = "Boleto barcode / linha digitável encoder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode one boleto from a JSON config (file or stdin)
    Encode {
        /// JSON config file (defaults to stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Bank name or compensation code
        #[arg(short = 'b', long = "bank", default_value = "inter")]
        bank: Bank,

        #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Encode every row of a CSV file
    Batch {
        file: PathBuf,

        #[arg(short = 'b', long = "bank", default_value = "inter")]
        bank: Bank,
    },

    /// Validate a barcode or linha digitável and show both forms
    Decode { code: String },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("boleto_construction=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode {
            input,
            bank,
            format,
        } => run_encode(input, bank, format),
        Command::Batch { file, bank } => run_batch(&file, bank),
        Command::Decode { code } => run_decode(&code),
    }
}

fn run_encode(input: Option<PathBuf>, bank: Bank, format: OutputFormat) -> Result<()> {
    let json = match &input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read config from stdin")?;
            buf
        }
    };

    let config = BoletoConfig::from_json(&json).context("Invalid boleto config")?;
    let boleto = Boleto::from_config(bank, config);
    tracing::info!(bank = %bank, "encoding boleto");

    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Text => {
            let barcode = boleto.barcode().context("Boleto could not be encoded")?;
            let linha = barcode.linha_digitavel()?;
            writeln!(stdout, "Nosso número:    {}", boleto.our_number_display()?)?;
            writeln!(stdout, "Agência/conta:   {}", boleto.agency_account_display()?)?;
            writeln!(stdout, "Código de barras: {}", barcode)?;
            writeln!(stdout, "Linha digitável: {}", linha)?;
        }
        OutputFormat::Json => {
            let bytes = boleto
                .render(&JsonRenderer::pretty())
                .context("Boleto could not be encoded")?;
            stdout.write_all(&bytes)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

fn run_batch(file: &Path, bank: Bank) -> Result<()> {
    let outcomes = encode_csv_path(file, bank)
        .with_context(|| format!("Failed to read CSV: {}", file.display()))?;

    let mut stdout = io::stdout().lock();
    let mut failed = 0;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(encoded) => writeln!(
                stdout,
                "{}\t{}\t{}",
                outcome.line_number, encoded.barcode, encoded.linha_digitavel
            )?,
            Err(e) => {
                failed += 1;
                writeln!(stdout, "{}\tERROR\t{}", outcome.line_number, e)?;
            }
        }
    }

    tracing::info!(rows = outcomes.len(), failed, "batch complete");
    Ok(())
}

fn run_decode(code: &str) -> Result<()> {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();

    let barcode = if digits.len() == 44 {
        Barcode::parse(&digits)?
    } else {
        LinhaDigitavel::parse(code)?.to_barcode()?
    };
    let linha = barcode.linha_digitavel()?;

    let bank = Bank::from_code(barcode.bank_code())
        .map(|b| b.name().to_string())
        .unwrap_or_else(|_| "desconhecido".to_string());

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Banco:            {} ({})", barcode.bank_code(), bank)?;
    writeln!(stdout, "Moeda:            {}", barcode.currency())?;
    writeln!(stdout, "Fator vencimento: {}", barcode.date_factor())?;
    writeln!(stdout, "Valor:            {}", barcode.amount())?;
    writeln!(stdout, "Campo livre:      {}", barcode.free_segment())?;
    writeln!(stdout, "Código de barras: {}", barcode)?;
    writeln!(stdout, "Linha digitável: {}", linha)?;

    Ok(())
}

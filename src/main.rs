use clap::{Parser, Subcommand};
use signature_extract::batch::{self, BatchOptions};
use signature_extract::config::{ConfigArgs, ExtractorConfig};
use signature_extract::SignatureExtractor;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "signature-extract")]
#[command(about = "Extract handwritten signatures from scanned pages as transparent PNGs")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the signature from a single page
    Extract {
        /// Scanned page (any format the decoder understands)
        input: PathBuf,

        /// Destination PNG
        #[arg(default_value = "extracted.png")]
        output: PathBuf,

        #[command(flatten)]
        tuning: ConfigArgs,
    },

    /// Extract signatures from every matching page in a folder
    Batch {
        #[arg(default_value = "input_images")]
        input_dir: PathBuf,

        /// Created if it does not exist
        #[arg(default_value = "output_signatures")]
        output_dir: PathBuf,

        /// File-name pattern of pages to process
        #[arg(long, env = "SIGNATURE_PATTERN", default_value = batch::DEFAULT_PATTERN)]
        pattern: String,

        /// Appended to each page's file stem to name its output
        #[arg(long, default_value = batch::DEFAULT_SUFFIX)]
        suffix: String,

        /// Print a JSON summary to stdout when done
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        tuning: ConfigArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!(
        "Starting signature-extract v{}",
        env!("CARGO_PKG_VERSION")
    );

    match args.command {
        Command::Extract {
            input,
            output,
            tuning,
        } => {
            let extractor = SignatureExtractor::new(ExtractorConfig::from(tuning))?;
            let outcome = batch::run_file(&extractor, &input, &output);
            if !outcome.is_success() {
                anyhow::bail!(
                    "{}",
                    outcome.message.unwrap_or_else(|| outcome.code.clone())
                );
            }
        }
        Command::Batch {
            input_dir,
            output_dir,
            pattern,
            suffix,
            report,
            tuning,
        } => {
            let extractor = SignatureExtractor::new(ExtractorConfig::from(tuning))?;
            let options = BatchOptions { pattern, suffix };
            let summary = batch::process_folder(&extractor, &input_dir, &output_dir, &options)?;
            if report {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }

    Ok(())
}

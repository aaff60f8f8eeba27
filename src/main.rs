//! qrpng - render text as a QR code PNG.
//!
//! ```text
//! qrpng "https://example.com" -o example.png --ecl M --size 8 --border 2
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qrpng::helper::{save_png, RenderOptions};
use qrpng::{EncodeOptions, Mask, QrCode, QrCodeEcc, Version};

/// Encode text into a QR code and save it as a PNG image
#[derive(Parser, Debug)]
#[command(name = "qrpng")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text to encode
    text: String,

    /// Output PNG file
    #[arg(short, long, default_value = "qr.png")]
    output: String,

    /// Error correction level (L, M, Q, H)
    #[arg(short, long, default_value = "L")]
    ecl: QrCodeEcc,

    /// Pixels per module
    #[arg(short, long, default_value_t = 10, env = "QRPNG_BOX_SIZE", allow_negative_numbers = true)]
    size: i32,

    /// Quiet zone width in modules
    #[arg(short, long, default_value_t = 4, env = "QRPNG_BORDER", allow_negative_numbers = true)]
    border: i32,

    /// Use a fixed mask (0-7) instead of the lowest-penalty one
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7))]
    mask: Option<u8>,

    /// Raise the error correction level when it costs no extra version
    #[arg(long)]
    boost_ecl: bool,

    /// Smallest symbol version to use
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=40))]
    min_version: u8,

    /// Largest symbol version to use
    #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(u8).range(1..=40))]
    max_version: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let options = EncodeOptions {
        ecl: cli.ecl,
        min_version: Version::try_from(cli.min_version)?,
        max_version: Version::try_from(cli.max_version)?,
        mask: cli.mask.map(Mask::try_from).transpose()?,
        boost_ecl: cli.boost_ecl,
        render: RenderOptions {
            box_size: cli.size,
            border: cli.border,
        },
    };

    let qr = QrCode::encode_text(&cli.text, &options).context("Failed to encode QR code")?;
    save_png(&qr, &cli.output, &options.render)
        .with_context(|| format!("Failed to write {}", cli.output))?;

    info!(
        "Wrote {} (version {}, level {}, mask {}, {}x{} modules)",
        cli.output,
        qr.version(),
        qr.error_correction_level(),
        qr.mask().value(),
        qr.size(),
        qr.size()
    );
    Ok(())
}

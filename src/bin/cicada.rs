//! # Cicada CLI
//!
//! Hide a message or a file inside a PNG, or recover it again.
//!
//! ## Usage
//!
//! ```bash
//! cicada encode --image cover.png --output secret.png --message "meet at noon"
//! cicada encode --image cover.png --output secret.png --file report.pdf
//! cicada decode --image secret.png --output recovered
//! cicada decode --image old.png --auto
//! cicada capacity --image cover.png --bits 1
//! ```

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use cicada_stego::common::config::{load_config, StegoConfig};
use cicada_stego::processing::codec::CapacityReport;
use cicada_stego::processing::{image_io, steganography, BitsPerChannel, PayloadFrame};
use cicada_stego::server::server::AUTO_DETECT_CANDIDATES;
use cicada_stego::utils::init_logger;

/// Files above this size trigger a warning before encoding.
const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Command-line arguments for the cicada binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message or file in an image
    Encode(EncodeArgs),
    /// Recover hidden data from an image
    Decode(DecodeArgs),
    /// Show how many bytes an image can carry
    Capacity(CapacityArgs),
}

/// Codec settings shared by all subcommands.
#[derive(Args, Debug)]
struct CodecArgs {
    /// Codec configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Low-order bits per channel (overrides the config file)
    #[arg(short, long)]
    bits: Option<u8>,
}

impl CodecArgs {
    fn resolve(&self) -> Result<StegoConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => StegoConfig::default(),
        };
        if let Some(bits) = self.bits {
            config.bits_per_channel = bits;
        }
        // validate early so a bad value fails before any image work
        config.bits_per_channel()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("payload").required(true).args(["message", "file"])))]
struct EncodeArgs {
    /// Cover image
    #[arg(short, long)]
    image: PathBuf,

    /// Where to write the PNG carrying the payload
    #[arg(short, long)]
    output: PathBuf,

    /// Text message to hide
    #[arg(short, long)]
    message: Option<String>,

    /// File to hide
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Embed the frame without zlib compression
    #[arg(long)]
    no_compress: bool,

    #[command(flatten)]
    codec: CodecArgs,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Image carrying hidden data
    #[arg(short, long)]
    image: PathBuf,

    /// Where to save a recovered file (its extension is appended when missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Try 2 and then 1 bits per channel instead of the configured value
    #[arg(long, conflicts_with = "bits")]
    auto: bool,

    #[command(flatten)]
    codec: CodecArgs,
}

#[derive(Args, Debug)]
struct CapacityArgs {
    /// Image to measure
    #[arg(short, long)]
    image: PathBuf,

    #[command(flatten)]
    codec: CodecArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Encode(args) => encode(args),
        Command::Decode(args) => decode(args),
        Command::Capacity(args) => capacity(args),
    }
}

fn encode(args: EncodeArgs) -> Result<()> {
    let mut config = args.codec.resolve()?;
    if args.no_compress {
        config.compress = false;
    }

    let frame = match (&args.message, &args.file) {
        (Some(message), _) => PayloadFrame::text(message.trim())?,
        (None, Some(path)) => {
            let size = std::fs::metadata(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
                .len();
            if size > LARGE_FILE_BYTES {
                warn!(
                    "{} is {:.2} MB; encoding needs a large cover image and may take a while",
                    path.display(),
                    size as f64 / 1024.0 / 1024.0
                );
            }
            PayloadFrame::from_path(path)?
        }
        (None, None) => anyhow::bail!("Nothing to hide: pass --message or --file"),
    };

    let cover = image_io::load_grid(&args.image)?;
    info!(
        "{}",
        CapacityReport::new(cover.width(), cover.height(), config.bits_per_channel()?)
    );

    let stego = steganography::hide(&cover, &frame, &config)?;
    image_io::save_png(&stego, &args.output)?;

    println!("Data encoded successfully!");
    println!("Output image: {}", args.output.display());
    Ok(())
}

fn decode(args: DecodeArgs) -> Result<()> {
    let config = args.codec.resolve()?;
    let grid = image_io::load_grid(&args.image)?;

    let (bits, frame) = if args.auto {
        steganography::reveal_auto(&grid, &AUTO_DETECT_CANDIDATES)?
    } else {
        let bits = config.bits_per_channel()?;
        (bits, steganography::reveal(&grid, bits)?)
    };
    info!("Decoded {} frame at {} bits per channel", frame.kind(), bits);

    match frame {
        PayloadFrame::Text(text) => println!("{}", text),
        PayloadFrame::Legacy(text) => {
            println!("Decoded message (legacy format):");
            println!("{}", text);
        }
        PayloadFrame::File { extension, content } => {
            let path = output_path(args.output.as_deref(), &extension);
            std::fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "File decoded successfully! Saved to {} ({:.2} KB)",
                path.display(),
                content.len() as f64 / 1024.0
            );
        }
        PayloadFrame::Unknown(data) => {
            let path = output_path(args.output.as_deref(), ".bin");
            std::fs::write(&path, &data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Binary data decoded successfully! Saved to {} ({:.2} KB)",
                path.display(),
                data.len() as f64 / 1024.0
            );
        }
    }

    Ok(())
}

fn capacity(args: CapacityArgs) -> Result<()> {
    let bits: BitsPerChannel = args.codec.resolve()?.bits_per_channel()?;
    let grid = image_io::load_grid(&args.image)?;
    let report = CapacityReport::new(grid.width(), grid.height(), bits);

    println!("{}", report);
    println!(
        "Largest frame at {} bits per channel: {} bytes",
        bits,
        report.max_frame_bytes()
    );
    Ok(())
}

/// Destination for a recovered file: the user's path, or `decoded` plus the
/// recorded extension. An extension is appended when the path has none.
fn output_path(requested: Option<&Path>, extension: &str) -> PathBuf {
    let base = requested.unwrap_or_else(|| Path::new("decoded"));
    if base.extension().is_some() || extension.is_empty() {
        return base.to_path_buf();
    }
    let mut name = base.as_os_str().to_owned();
    name.push(extension);
    PathBuf::from(name)
}

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xtmax_bootrom::{
    check_header_file, emit_header_file, inspect_image, patch_image_file, AddressSource,
    ElementFormat, HeaderOptions, DEFAULT_BOOTROM_ADDR, DEFAULT_COLUMNS,
};

const DEFAULT_ARRAY_NAME: &str = "BOOTROM";

#[derive(Debug, Clone, Args)]
struct AddressArgs {
    /// NASM source declaring `%define ROM_SEGMENT (<hex>)`; BOOTROM_ADDR is that segment << 4.
    #[arg(long, value_name = "PATH", conflicts_with = "addr")]
    asm: Option<PathBuf>,

    /// Linear load address in hex (default: 0xCE000).
    #[arg(long, value_name = "HEX", value_parser = parse_hex_addr)]
    addr: Option<u64>,
}

impl AddressArgs {
    fn to_source(&self) -> AddressSource {
        match (&self.asm, self.addr) {
            (Some(path), _) => AddressSource::AsmSource(path.clone()),
            (None, Some(addr)) => AddressSource::Fixed(addr),
            (None, None) => AddressSource::Fixed(DEFAULT_BOOTROM_ADDR),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct HeaderArgs {
    /// Header file to generate (e.g. Code/XTMax/bootrom.h).
    #[arg(long, value_name = "PATH")]
    out: PathBuf,

    #[command(flatten)]
    address: AddressArgs,

    /// Name of the generated array.
    #[arg(long, default_value = DEFAULT_ARRAY_NAME)]
    name: String,

    /// Array elements per line.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_COLUMNS)]
    columns: NonZeroUsize,

    /// Emit bytes as 0xNN instead of decimal.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    hex: bool,
}

impl HeaderArgs {
    fn to_opts(&self) -> HeaderOptions {
        HeaderOptions {
            array_name: self.name.clone(),
            columns: self.columns,
            element_format: if self.hex {
                ElementFormat::Hex
            } else {
                ElementFormat::Decimal
            },
            ..Default::default()
        }
    }

    /// Flags that reproduce this header, as they would be typed after `header <IMAGE>`.
    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["--out".to_string(), self.out.display().to_string()];
        match (&self.address.asm, self.address.addr) {
            (Some(path), _) => args.extend(["--asm".to_string(), path.display().to_string()]),
            (None, Some(addr)) => args.extend(["--addr".to_string(), format!("{addr:#x}")]),
            (None, None) => {}
        }
        if self.name != DEFAULT_ARRAY_NAME {
            args.extend(["--name".to_string(), self.name.clone()]);
        }
        if self.columns != DEFAULT_COLUMNS {
            args.extend(["--columns".to_string(), self.columns.to_string()]);
        }
        if self.hex {
            args.push("--hex".to_string());
        }
        args
    }
}

#[derive(Debug, Parser)]
#[command(name = "bootrom_gen")]
#[command(about = "Checksum patching and C header generation for the XTMax boot ROM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite the last byte of the image so all bytes sum to zero (mod 256).
    Checksum {
        /// Assembled ROM image, patched in place.
        image: PathBuf,
    },

    /// Generate the C header embedding the image.
    Header {
        /// Assembled ROM image.
        image: PathBuf,

        #[command(flatten)]
        header: HeaderArgs,

        /// Verify the header is up to date instead of writing it.
        #[arg(long)]
        check: bool,
    },

    /// Patch the checksum, then generate the header.
    Build {
        /// Assembled ROM image, patched in place.
        image: PathBuf,

        #[command(flatten)]
        header: HeaderArgs,
    },

    /// Report checksum and option ROM header status without modifying anything.
    Verify {
        image: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Checksum { image } => checksum(&image),
        Commands::Header {
            image,
            header,
            check,
        } => {
            if check {
                check_header(&image, &header)
            } else {
                write_header(&image, &header)
            }
        }
        Commands::Build { image, header } => {
            checksum(&image)?;
            write_header(&image, &header)
        }
        Commands::Verify { image } => verify(&image),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn checksum(image: &Path) -> Result<()> {
    let patch = patch_image_file(image)
        .with_context(|| format!("patch checksum of {}", image.display()))?;

    let verb = if patch.changed() { "patched" } else { "unchanged" };
    println!(
        "{verb}: {} (checksum 0x{:02X})",
        image.display(),
        patch.checksum
    );
    Ok(())
}

fn write_header(image: &Path, args: &HeaderArgs) -> Result<()> {
    let report = emit_header_file(image, &args.out, &args.address.to_source(), &args.to_opts())
        .with_context(|| format!("generate {}", args.out.display()))?;

    let verb = if report.changed { "wrote" } else { "unchanged" };
    println!(
        "{verb}: {} ({} bytes at {:#x})",
        report.path.display(),
        report.image_len,
        report.addr
    );
    Ok(())
}

fn check_header(image: &Path, args: &HeaderArgs) -> Result<()> {
    check_header_file(image, &args.out, &args.address.to_source(), &args.to_opts()).with_context(
        || {
            format!(
                "{} is stale.\nRegenerate with: bootrom_gen header {} {}",
                args.out.display(),
                image.display(),
                args.to_cli_args().join(" ")
            )
        },
    )?;

    println!("up to date: {}", args.out.display());
    Ok(())
}

fn verify(image: &Path) -> Result<()> {
    let bytes =
        std::fs::read(image).with_context(|| format!("read ROM image {}", image.display()))?;
    let report = inspect_image(&bytes);

    println!("image: {} ({} bytes)", image.display(), report.len);
    println!("sum: 0x{:02X}", report.sum);
    match report.header {
        Some(header) => println!(
            "option rom: {} block(s) ({} bytes)",
            header.blocks,
            header.declared_len()
        ),
        None => println!("option rom: no 55 AA signature"),
    }
    if report.declared_len_mismatch() {
        eprintln!(
            "warning: header declares {} bytes but image is {} bytes",
            report.header.map_or(0, |h| h.declared_len()),
            report.len
        );
    }

    if !report.checksum_valid {
        bail!(
            "checksum invalid: {} sums to 0x{:02X} (run `bootrom_gen checksum`)",
            image.display(),
            report.sum
        );
    }
    println!("checksum: ok");
    Ok(())
}

fn parse_hex_addr(s: &str) -> std::result::Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address {s:?}: {e}"))
}

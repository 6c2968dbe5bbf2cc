use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use regmap_gen::{check, parse, render, Error, GeneratorConfig};

/// Generate Rust register accessors from a register bit-field table.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Register table to read.
    input: PathBuf,

    /// File to write. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base name of the generated struct. Defaults to the input file stem.
    #[arg(long)]
    name: Option<String>,

    /// Bit position of the address in the SPI word.
    #[arg(long, default_value_t = GeneratorConfig::DEFAULT_ADDR_SHIFT)]
    addr_shift: u32,

    /// Bit set in the SPI word to request a read.
    #[arg(long, default_value_t = GeneratorConfig::DEFAULT_READ_FLAG_BIT)]
    read_flag_bit: u32,

    /// Only parse and validate the table.
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| default_name(&args.input));
    let source_name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());

    let config = GeneratorConfig::new(&name)
        .with_source_name(&source_name)
        .with_addr_shift(args.addr_shift)
        .with_read_flag_bit(args.read_flag_bit);
    config.validate()?;

    let source = fs::read_to_string(&args.input).map_err(|source| Error::Io {
        path: args.input.clone(),
        source,
    })?;
    let map = parse(&source)?;

    if args.check {
        check(&map, &config)?;
        log::info!(
            "{}: {} fields in {} registers",
            args.input.display(),
            map.fields().len(),
            map.addresses().len()
        );
        return Ok(());
    }

    let code = render(&map, &config)?;
    match &args.output {
        Some(output) => {
            fs::write(output, code).map_err(|source| Error::Io {
                path: output.clone(),
                source,
            })?;
            log::info!("wrote {}", output.display());
        }
        None => print!("{code}"),
    }
    Ok(())
}

/// `ad9142a.regs` -> `ad9142a`
fn default_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "regs".to_string());
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

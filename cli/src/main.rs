mod error;
mod project;
mod report;

use clap::Parser;
use std::path::PathBuf;

use bootscan::{cart::Cart, disasm::Disassembler};

/// Disassemble the reset handler of a Super Famicom cartridge image
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the cartridge image
    pub rom_path: PathBuf,

    /// Bytes to decode starting at the reset vector (decimal or 0x-prefixed hex)
    #[arg(long, default_value = "0x180", value_parser = parse_number)]
    pub window: usize,

    /// Number of listing lines to print
    #[arg(long, default_value_t = 20)]
    pub lines: usize,

    /// Print header and disassembly as JSON
    #[arg(long)]
    pub json: bool,

    /// Write a reverse-engineering project into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_number(s: &str) -> Result<usize, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    res.map_err(|err| format!("`{s}` is not a number: {err}"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: Args) -> error::Result<()> {
    let bytes = std::fs::read(&args.rom_path).map_err(|source| error::Error::Read {
        path: args.rom_path.clone(),
        source,
    })?;
    log::info!("loaded {} bytes from {}", bytes.len(), args.rom_path.display());

    let cart = Cart::from_bytes(bytes)?;
    let disasm = Disassembler::new(cart.mapping())
        .with_window(args.window)
        .run(&cart.rom.data, cart.reset_vector());

    let mut stdout = std::io::stdout().lock();
    if args.json {
        report::write_json(&mut stdout, &args.rom_path, &cart, &disasm)?;
    } else {
        report::write_text(&mut stdout, &args.rom_path, &cart, &disasm, args.lines)?;
    }

    if let Some(dir) = &args.export {
        project::write_project(&args.rom_path, &cart, &disasm, dir)?;
        log::info!("project written to {}", dir.display());
    }
    Ok(())
}

fn main_err() -> Result<(), String> {
    let args = Args::parse();
    init_logging(args.verbose);

    run(args).map_err(|err| err.to_string())
}

fn main() {
    if let Err(err) = main_err() {
        eprintln!("\x1b[1;31merror:\x1b[m {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_in_both_radixes() {
        assert_eq!(parse_number("384"), Ok(384));
        assert_eq!(parse_number("0x180"), Ok(0x180));
        assert_eq!(parse_number("0X20"), Ok(0x20));
        assert!(parse_number("0xzz").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["bootscan", "game.sfc"]).unwrap();
        assert_eq!(args.rom_path, PathBuf::from("game.sfc"));
        assert_eq!(args.window, bootscan::disasm::DEFAULT_WINDOW);
        assert_eq!(args.lines, 20);
        assert!(!args.json);
        assert!(args.export.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn all_flags() {
        let args = Args::try_parse_from([
            "bootscan", "game.sfc", "--window", "0x40", "--lines", "5", "--json", "--export",
            "out", "-vv",
        ])
        .unwrap();
        assert_eq!(args.window, 0x40);
        assert_eq!(args.lines, 5);
        assert!(args.json);
        assert_eq!(args.export, Some(PathBuf::from("out")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn rom_path_is_required() {
        assert!(Args::try_parse_from(["bootscan"]).is_err());
    }
}

use std::io::{self, Write};
use std::path::PathBuf;
use std::{fs, process};

use clap::Parser;
use typesmith_core::{explain, load_units, EmitState, Result, UnitIndex};
use typesmith_utils::{debug, info, init_logging};

/// Reconstruct C type declarations from a binary's DWARF debug info.
#[derive(Parser, Debug)]
#[command(name = "typesmith")]
#[command(version)]
#[command(about = "Reconstruct C type declarations from a binary's DWARF debug info", long_about = None)]
struct Cli
{
    /// Path to the binary to inspect
    #[arg(default_value = "./a.out")]
    path: PathBuf,
}

fn main()
{
    // Initialize logging (reads from RUST_LOG env var); logs go to stderr
    // so they never mix with the declarations on stdout.
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()>
{
    info!("Reading debug info from {}", cli.path.display());
    let data = fs::read(&cli.path)?;
    let units = load_units(&data)?;
    info!("Decoded {} compilation unit(s)", units.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // One shared state across all units, so a type described by several
    // units is defined exactly once in the output.
    let mut state = EmitState::new();
    for unit in units {
        let index = UnitIndex::new(unit);
        if index.is_empty() {
            debug!("Skipping unit {} (unsupported language)", index.path());
            continue;
        }
        debug!("Explaining unit {}", index.path());
        explain(&index, &mut state, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

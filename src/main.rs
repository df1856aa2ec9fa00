//! ibis-ami - IBIS and IBIS-AMI file checker
//!
//! Parses a model file, validates it and prints a summary followed by any
//! warnings or errors found.
//!
//! # Usage
//!
//! ```bash
//! ibis-ami example_tx.ibs
//! ibis-ami example_tx.ami --inputs
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use ibis_ami::{
    ami::{self, AmiFile},
    error::Result,
    ibis::{self, IbisFile},
    Diagnostics, ParseConfig,
};
use tracing_subscriber::EnvFilter;

/// IBIS / IBIS-AMI model checker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an IBIS (.ibs) or AMI parameter (.ami) file
    #[arg(value_name = "MODEL_FILE")]
    file: PathBuf,

    /// Log parser progress at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Print the input-parameter string passed to the model (AMI files only)
    #[arg(long)]
    inputs: bool,

    /// Keep POWER, GND and NC pins in component pin lists
    #[arg(long)]
    keep_supply_pins: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "ibis_ami=debug" } else { "ibis_ami=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = ParseConfig::new().with_filter_supply_pins(!args.keep_supply_pins);

    if is_ami_file(&args.file) {
        let file = ami::parse_ami_file(&args.file, &config)?;
        print_ami(&file, args.inputs);
        print_diagnostics(&file.diagnostics);
    } else {
        let file = ibis::parse_ibis_file(&args.file, &config)?;
        print_ibis(&file);
        print_diagnostics(&file.diagnostics);
    }

    Ok(())
}

fn is_ami_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("ami"))
}

fn print_ami(file: &AmiFile, inputs: bool) {
    println!("Model: {}", file.root_name);
    if let Some(description) = &file.description {
        println!("  {}", description);
    }
    println!("Reserved parameters: {}", file.reserved.len());
    println!("Model-specific parameters: {}", file.model_specific.len());
    if inputs {
        println!("{}", file.serialize_input_params());
    }
}

fn print_ibis(file: &IbisFile) {
    if let Some(version) = file.ibis_ver {
        println!("IBIS version: {}", version);
    }
    for component in file.components.values() {
        println!("Component: {} ({} pins)", component.name, component.pins.len());
    }
    for model in file.models.values() {
        let kind = model
            .model_type
            .as_ref()
            .map_or_else(|| "?".to_string(), |t| t.to_string());
        print!("Model: {} [{}]", model.name, kind);
        if let Some(z) = model.impedance() {
            print!("  Z = {:.1} Ohm", z);
        }
        if let Some(slew) = model.slew() {
            print!("  slew = {:.2} V/ns", slew);
        }
        if let Some(exe) = model.host_executable() {
            print!("  executable = {} ({})", exe.library, exe.parameter_file);
        }
        println!();
    }
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if !diagnostics.is_empty() {
        eprint!("{}", diagnostics);
    }
}

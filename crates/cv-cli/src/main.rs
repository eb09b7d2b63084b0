//! `cvt`: compile a Clairvoyant source file into psykick JavaScript modules.

mod commands;
mod writer;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use cv_core::{BuildConfig, ReporterKind, Variant};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "cvt",
    about = "Clairvoyant: compile entity, template and system definitions into psykick modules",
    version
)]
struct Cli {
    /// Source file to compile
    #[arg(short, long, value_name = "FILE")]
    src: PathBuf,

    /// Directory the generated files are written to
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Target runtime: 2d (psykick2d) or 3d (psykick3d)
    #[arg(long, value_name = "VARIANT", default_value_t = Variant::TwoD)]
    target: Variant,

    /// Shorthand for --target 3d
    #[arg(long = "3d", conflicts_with = "target")]
    three_d: bool,

    /// Keep compiling after warnings instead of aborting on the first one
    #[arg(long)]
    fail_on_warning: bool,

    /// Replace files that already exist in the output directory
    #[arg(long)]
    overwrite: bool,

    /// Reporter: default, json or json-pretty
    #[arg(long, value_name = "NAME", default_value = "default")]
    reporter: ReporterKind,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Logs go to stderr so reporter output on stdout stays machine-readable.
/// `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,cvt=debug,cv_dsl=debug,cv_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let variant = if cli.three_d {
        Variant::ThreeD
    } else {
        cli.target
    };
    let config = BuildConfig::default()
        .with_variant(variant)
        .with_fail_on_warning(cli.fail_on_warning)
        .with_overwrite(cli.overwrite);

    let result = commands::build::run(&cli.src, &cli.output, &config, cli.reporter);

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

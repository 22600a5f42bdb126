use std::path::PathBuf;

use clap::Parser;
use log::info;
use sevare_parser::{parse_results, ParseOptions};

/// Parse the result table of a sevarebench run into 2D data files.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The results directory of the run (contains `data/`).
    data_dir: PathBuf,
    /// Overwrite an existing `parsed` directory.
    #[clap(short, long)]
    force: bool,
    /// Hold datatype and input size at the largest values listed in `E*-run-summary.dat`
    /// instead of at their first-seen values.
    #[clap(long)]
    pin_to_summary: bool,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init_timed();
    let args = Args::parse();
    let report = parse_results(
        &args.data_dir,
        &ParseOptions {
            force: args.force,
            pin_to_summary: args.pin_to_summary,
        },
    )?;
    info!(
        "Wrote {} slice files for {} protocols from {:?}",
        report.files, report.protocols, report.table
    );
    Ok(())
}

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use log::info;
use sevare_plotter::{compile::TexCompiler, plot_results, PlotOptions};

/// Plot the 2D data files written by sevare-parser as a beamer slide deck.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The results directory of the run (contains `parsed/`).
    data_dir: PathBuf,
    /// Overwrite an existing `plotted` directory.
    #[clap(short, long)]
    force: bool,
    /// The TeX compiler used to build the PDF.
    #[clap(long, default_value = "pdflatex")]
    compiler: PathBuf,
    /// Give up on a compiler run after this many seconds (it is retried once).
    #[clap(long, default_value_t = 300)]
    timeout_secs: u64,
    /// Only write the .tex document.
    #[clap(long)]
    no_compile: bool,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init_timed();
    let args = Args::parse();
    let compiler = (!args.no_compile).then(|| {
        TexCompiler::new(args.compiler).with_timeout(Duration::from_secs(args.timeout_secs))
    });
    let report = plot_results(
        &args.data_dir,
        &PlotOptions {
            force: args.force,
            compiler,
        },
    )?;
    info!(
        "Plotted {} charts into {:?}",
        report.charts,
        report.pdf.as_ref().unwrap_or(&report.document)
    );
    Ok(())
}

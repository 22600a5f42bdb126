/*!
Render sliced sevarebench results into a slide deck.

[`plot_results`] reads the files `sevare-parser` wrote to `parsed/2D/`, groups every protocol's
series sharing a slicing prefix and switch constellation onto one chart, writes a beamer
document with one pgfplots slide per chart to `plotted/`, and compiles it with an external TeX
compiler.
*/

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use log::{debug, info, warn};
use sevare_layout::{prepare_output_dir, read_protocol_infos, ResultsDir};

pub mod beamer;
pub mod catalog;
pub mod compile;

use crate::catalog::Catalog;
use crate::compile::{remove_auxiliary_files, TexCompiler};

pub const DOCUMENT_NAME: &str = "sevare-plots.tex";

// From `plotted/` back to `parsed/2D/`.
const DATA_PREFIX: &str = "../parsed/2D/";

#[derive(Clone, Debug, Default)]
pub struct PlotOptions {
    /// Replace an existing `plotted` directory.
    pub force: bool,
    /// Leave the document uncompiled when `None`.
    pub compiler: Option<TexCompiler>,
}

#[derive(Debug)]
pub struct PlotReport {
    pub document: PathBuf,
    pub pdf: Option<PathBuf>,
    pub charts: usize,
}

pub fn plot_results(root: &Path, options: &PlotOptions) -> eyre::Result<PlotReport> {
    let layout = ResultsDir::new(root);
    let slices_dir = layout.slices_dir();
    eyre::ensure!(
        slices_dir.is_dir(),
        "Could not find {slices_dir:?}, make sure you ran sevare-parser before calling the plotter"
    );
    let catalog = Catalog::scan(&slices_dir)?;
    eyre::ensure!(
        !catalog.charts().is_empty(),
        "No slice in {slices_dir:?} has data points to plot"
    );
    info!("Found {} charts", catalog.charts().len());

    let infos_path = layout.protocol_infos_path();
    let infos = if infos_path.is_file() {
        Some(read_protocol_infos(&infos_path)?)
    } else {
        warn!("No {infos_path:?}, leaving out the protocol overview");
        None
    };

    let plotted = layout.plotted_dir();
    prepare_output_dir(&plotted, options.force)?;
    let document = plotted.join(DOCUMENT_NAME);
    let tex = beamer::render(catalog.charts(), infos.as_deref(), DATA_PREFIX)?;
    std::fs::write(&document, tex)
        .wrap_err_with(|| format!("Unable to write {document:?}"))?;
    info!("Wrote {document:?}");

    let pdf = match &options.compiler {
        Some(compiler) => {
            let compiled = compiler.compile(&plotted, DOCUMENT_NAME);
            match remove_auxiliary_files(&plotted, compiled.is_err()) {
                Ok(removed) => debug!("Removed {removed} auxiliary files"),
                // The compiler's error is the one worth reporting.
                Err(e) if compiled.is_err() => warn!("Cleaning up {plotted:?}: {e:#}"),
                Err(e) => return Err(e),
            }
            let pdf = compiled?;
            info!("Wrote {pdf:?}");
            Some(pdf)
        }
        None => None,
    };
    Ok(PlotReport {
        document,
        pdf,
        charts: catalog.charts().len(),
    })
}

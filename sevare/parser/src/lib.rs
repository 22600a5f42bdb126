/*!
Slice sevarebench result tables into per-variable 2D data files.

Given a results directory, [`parse_results`] locates the run's result table under `data/`, cuts
it into one `(value, runtime)` series per protocol, datatype, tracked variable and switch
constellation, and writes the series to `parsed/2D/<protocol>/` following the naming convention
of [`sevare_layout::SliceName`]. Per-protocol communication metrics go to
`parsed/protocol_infos.json`.
*/

use std::path::{Path, PathBuf};

use log::info;
use sevare_layout::{prepare_output_dir, write_protocol_infos, ResultsDir, Variable};

pub mod slicer;
pub mod summary;
pub mod table;

use crate::slicer::Slicer;
use crate::summary::RunSummary;
use crate::table::{find_result_table, ResultTable};

#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Replace an existing `parsed` directory.
    pub force: bool,
    /// Hold datatype and input size at the maxima listed in the run summary.
    pub pin_to_summary: bool,
}

#[derive(Debug)]
pub struct ParseReport {
    pub table: PathBuf,
    pub protocols: usize,
    pub variables: Vec<Variable>,
    pub files: usize,
}

pub fn parse_results(root: &Path, options: &ParseOptions) -> eyre::Result<ParseReport> {
    let layout = ResultsDir::new(root);
    let table_path = find_result_table(&layout.data_dir())?;
    info!("Found results table {table_path:?}");
    let table = ResultTable::read(&table_path)?;

    let mut slicer = Slicer::new(&table)?;
    if options.pin_to_summary {
        let summary_path = RunSummary::find(root)?.ok_or_else(|| {
            eyre::eyre!("No E*-run-summary.dat in {root:?} to pin datatype and input size to")
        })?;
        let summary = RunSummary::read(&summary_path)?;
        info!("Pinning to {summary:?} from {summary_path:?}");
        slicer = slicer.pin_to(&summary);
    }
    let variables: Vec<Variable> = slicer.columns().variables.iter().map(|(v, _)| *v).collect();
    info!("Tracked variables in table: {variables:?}");
    let slices = slicer.slice()?;
    let infos = slicer.protocol_infos()?;

    prepare_output_dir(&layout.parsed_dir(), options.force)?;
    std::fs::create_dir_all(layout.slices_dir())?;
    slices.write(&layout)?;
    write_protocol_infos(&layout.protocol_infos_path(), &infos)?;

    Ok(ParseReport {
        table: table_path,
        protocols: infos.len(),
        variables,
        files: slices.len(),
    })
}

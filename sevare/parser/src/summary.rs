use std::path::{Path, PathBuf};

use eyre::WrapErr;
use regex::Regex;

/// The parts of a run summary (`E<n>-run-summary.dat`) the parser uses.
///
/// The summary lists the swept parameter values of a run, e.g.
///
/// ```text
/// Inputs: 1000 10000 100000
/// Datatypes: 1 32 64
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub max_input: Option<u64>,
    pub max_datatype: Option<u64>,
}

impl RunSummary {
    /// Locate the run summary in a results directory.
    pub fn find(root: &Path) -> eyre::Result<Option<PathBuf>> {
        let mut found = Vec::new();
        for entry in root
            .read_dir()
            .wrap_err_with(|| format!("Error reading directory {root:?}"))?
        {
            let path = entry?.path();
            let is_summary = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with('E') && n.ends_with("-run-summary.dat"));
            if is_summary && path.is_file() {
                found.push(path);
            }
        }
        found.sort();
        Ok(found.into_iter().next())
    }

    pub fn read(path: &Path) -> eyre::Result<RunSummary> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read run summary {path:?}"))?;
        RunSummary::parse(&contents).wrap_err_with(|| format!("Parsing run summary {path:?}"))
    }

    pub fn parse(contents: &str) -> eyre::Result<RunSummary> {
        let numbers = Regex::new(r"\b\d+\b")?;
        let line_max = |line: &str, key: &str| {
            let at = line.find(key)?;
            numbers
                .find_iter(&line[at..])
                .filter_map(|m| m.as_str().parse::<u64>().ok())
                .max()
        };
        let mut summary = RunSummary::default();
        for line in contents.lines() {
            if let Some(max) = line_max(line, "Inputs") {
                summary.max_input = Some(max);
            }
            if let Some(max) = line_max(line, "Datatypes") {
                summary.max_datatype = Some(max);
            }
        }
        Ok(summary)
    }
}

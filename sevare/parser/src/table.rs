//! Reading sevarebench result tables.
//!
//! A result table is a semicolon separated file with a header row, e.g.
//!
//! ```text
//! program;c.domain;adv.model;protocol;partysize;comp.time(s);...;input_size;runtime_chrono(s);...
//! ```
//!
//! Only the columns named by [`Columns`] matter. Everything else is carried along untouched.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use eyre::WrapErr;
use sevare_layout::{Switch, Variable};

pub const PROTOCOL_COLUMN: &str = "protocol";
pub const RUNTIME_COLUMN: &str = "runtime_chrono(s)";
pub const P0_DATA_SENT_COLUMN: &str = "P0dataSent(MB)";
pub const ALL_DATA_SENT_COLUMN: &str = "ALLdataSent(MB)";

/// Find the result table of a run: the first `.csv` file (by name) in `data_dir` with `full` or
/// `short` in its name.
pub fn find_result_table(data_dir: &Path) -> eyre::Result<PathBuf> {
    let mut names = Vec::new();
    for entry in data_dir
        .read_dir()
        .wrap_err_with(|| format!("Error reading directory {data_dir:?}"))?
    {
        let entry = entry.wrap_err_with(|| format!("Error reading directory {data_dir:?}"))?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    names
        .into_iter()
        .find(|name| name.ends_with(".csv") && (name.contains("full") || name.contains("short")))
        .map(|name| data_dir.join(name))
        .ok_or_else(|| {
            eyre::eyre!(
                "Could not find a csv file with 'full' or 'short' in the name in {data_dir:?}"
            )
        })
}

#[derive(Clone, Debug)]
pub struct Row {
    /// 1-based line number in the table file.
    pub line: u64,
    cells: Vec<String>,
}

impl Row {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(String::as_str)
    }

    /// The cell at `idx`, or an error naming the line when the row is too short.
    pub fn cell(&self, idx: usize, column: &str) -> eyre::Result<&str> {
        self.get(idx)
            .ok_or_else(|| eyre::eyre!("line {} has no {column:?} cell", self.line))
    }
}

#[derive(Clone, Debug)]
pub struct ResultTable {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn read(path: &Path) -> eyre::Result<ResultTable> {
        let file =
            std::fs::File::open(path).wrap_err_with(|| format!("Unable to open {path:?}"))?;
        ResultTable::parse(file).wrap_err_with(|| format!("Reading result table {path:?}"))
    }

    pub fn parse<R: Read>(src: R) -> eyre::Result<ResultTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(src);
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        eyre::ensure!(
            header.iter().any(|h| !h.is_empty()),
            "result table has no header"
        );
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(Row {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                cells: record.iter().map(str::to_string).collect(),
            });
        }
        Ok(ResultTable { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Indices of the columns the parser cares about.
#[derive(Clone, Debug)]
pub struct Columns {
    pub protocol: usize,
    pub runtime: usize,
    /// Tracked variables present in the table, in [`Variable::ALL`] order.
    pub variables: Vec<(Variable, usize)>,
    pub switches: Vec<(Switch, usize)>,
    pub p0_data_sent: Option<usize>,
    pub all_data_sent: Option<usize>,
}

impl Columns {
    pub fn locate(table: &ResultTable) -> eyre::Result<Columns> {
        let required = |name: &str| {
            table
                .column(name)
                .ok_or_else(|| eyre::eyre!("result table has no {name:?} column"))
        };
        Ok(Columns {
            protocol: required(PROTOCOL_COLUMN)?,
            runtime: required(RUNTIME_COLUMN)?,
            variables: Variable::ALL
                .into_iter()
                .filter_map(|v| Some((v, table.column(v.column())?)))
                .collect(),
            switches: Switch::ALL
                .into_iter()
                .filter_map(|s| Some((s, table.column(s.column())?)))
                .collect(),
            p0_data_sent: table.column(P0_DATA_SENT_COLUMN),
            all_data_sent: table.column(ALL_DATA_SENT_COLUMN),
        })
    }

    pub fn variable(&self, variable: Variable) -> Option<usize> {
        self.variables
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|(_, idx)| *idx)
    }
}

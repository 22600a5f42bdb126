//! Cutting a result table into 2D slices.
//!
//! For every tracked variable present in the table, each protocol's rows are filtered down to
//! those where all *other* tracked variables sit at their controlled value (the value seen in
//! the protocol's first row). What remains is a `(variable value, runtime)` series per
//! datatype and switch constellation.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
};

use eyre::WrapErr;
use log::{debug, info};
use sevare_layout::{
    validate_protocol, Datatype, ProtocolInfo, ResultsDir, SliceName, SwitchConstellation,
    Variable,
};

use crate::summary::RunSummary;
use crate::table::{Columns, ResultTable, Row, RUNTIME_COLUMN};

/// Compare two table cells, numerically when both are numbers.
pub fn same_value(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub value: String,
    pub runtime: String,
}

/// All slices of a table, keyed by protocol and slice file name.
#[derive(Debug, Default)]
pub struct Slices {
    files: BTreeMap<(String, SliceName), Vec<Point>>,
}

impl Slices {
    pub fn get(&self, protocol: &str, name: &SliceName) -> Option<&[Point]> {
        self.files
            .get(&(protocol.to_string(), name.clone()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SliceName, &[Point])> {
        self.files
            .iter()
            .map(|((protocol, name), points)| (protocol.as_str(), name, points.as_slice()))
    }

    /// Write one tab separated file per slice below `parsed/2D/<protocol>/`.
    pub fn write(&self, layout: &ResultsDir) -> eyre::Result<()> {
        for (protocol, name, points) in self.iter() {
            let dir = layout.protocol_dir(protocol);
            std::fs::create_dir_all(&dir)
                .wrap_err_with(|| format!("Unable to create {dir:?}"))?;
            let path = dir.join(name.file_name());
            let file = File::create(&path).wrap_err_with(|| format!("Unable to create {path:?}"))?;
            let mut out = BufWriter::new(file);
            for point in points {
                writeln!(out, "{}\t{}", point.value, point.runtime)?;
            }
            out.flush()
                .wrap_err_with(|| format!("Writing slice {path:?}"))?;
            debug!("{protocol}: {name} ({} points)", points.len());
        }
        Ok(())
    }
}

pub struct Slicer<'a> {
    table: &'a ResultTable,
    columns: Columns,
    pinned_datatype: Option<String>,
    pinned_input: Option<String>,
}

impl<'a> Slicer<'a> {
    pub fn new(table: &'a ResultTable) -> eyre::Result<Self> {
        Ok(Slicer {
            columns: Columns::locate(table)?,
            table,
            pinned_datatype: None,
            pinned_input: None,
        })
    }

    /// Control the datatype and the input size at the largest values a run swept over, instead
    /// of at their first-seen values.
    pub fn pin_to(mut self, summary: &RunSummary) -> Self {
        self.pinned_datatype = summary.max_datatype.map(|v| v.to_string());
        self.pinned_input = summary.max_input.map(|v| v.to_string());
        self
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Rows grouped by protocol, keeping table order within each protocol.
    fn protocol_groups(&self) -> eyre::Result<BTreeMap<&'a str, Vec<&'a Row>>> {
        let mut groups: BTreeMap<&str, Vec<&Row>> = BTreeMap::new();
        for row in self.table.rows() {
            let protocol = row.cell(self.columns.protocol, "protocol")?;
            validate_protocol(protocol).wrap_err_with(|| format!("line {}", row.line))?;
            groups.entry(protocol).or_default().push(row);
        }
        Ok(groups)
    }

    fn control_value(&self, variable: Variable, first_seen: &str) -> String {
        let pinned = match variable {
            Variable::Datatype => self.pinned_datatype.as_ref(),
            Variable::InputSize => self.pinned_input.as_ref(),
            _ => None,
        };
        pinned.cloned().unwrap_or_else(|| first_seen.to_string())
    }

    fn switches(&self, row: &Row) -> eyre::Result<SwitchConstellation> {
        let mut out = SwitchConstellation::default();
        for &(switch, idx) in &self.columns.switches {
            let cell = row.cell(idx, switch.column())?;
            let value = cell.parse::<u8>().map_err(|_| {
                eyre::eyre!(
                    "line {}: {:?} is not a valid {:?} setting",
                    row.line,
                    cell,
                    switch.column()
                )
            })?;
            out = out.with(switch, value);
        }
        Ok(out)
    }

    pub fn slice(&self) -> eyre::Result<Slices> {
        let groups = self.protocol_groups()?;
        let datatype_column = self.columns.variable(Variable::Datatype);
        let mut slices = Slices::default();
        for &(variable, variable_idx) in &self.columns.variables {
            for (protocol, rows) in &groups {
                let Some(first) = rows.first() else {
                    continue;
                };
                // Input size charts are drawn per datatype, so the datatype isn't held fixed.
                let controls = self
                    .columns
                    .variables
                    .iter()
                    .filter(|(v, _)| {
                        *v != variable
                            && !(variable == Variable::InputSize && *v == Variable::Datatype)
                    })
                    .map(|&(v, idx)| -> eyre::Result<_> {
                        Ok((v, idx, self.control_value(v, first.cell(idx, v.column())?)))
                    })
                    .collect::<eyre::Result<Vec<_>>>()?;
                let fixed_datatype = controls
                    .iter()
                    .find(|(v, _, _)| *v == Variable::Datatype)
                    .map(|(_, _, control)| Datatype::value(control))
                    .transpose()
                    .wrap_err_with(|| format!("protocol {protocol}"))?
                    .unwrap_or(Datatype::All);
                debug!(
                    "{protocol} {}: controlling {:?}",
                    variable.tag(),
                    controls
                        .iter()
                        .map(|(v, _, control)| format!("{}={control}", v.tag()))
                        .collect::<Vec<_>>()
                );

                for row in rows {
                    let datatype = match (variable, datatype_column) {
                        (Variable::InputSize, Some(idx)) => {
                            Datatype::value(row.cell(idx, Variable::Datatype.column())?)
                                .wrap_err_with(|| format!("line {}", row.line))?
                        }
                        _ => fixed_datatype.clone(),
                    };
                    let name = SliceName {
                        variable,
                        datatype,
                        switches: self.switches(row)?,
                    };
                    let points = slices
                        .files
                        .entry((protocol.to_string(), name))
                        .or_default();
                    let mut controlled = true;
                    for (v, idx, control) in &controls {
                        if !same_value(row.cell(*idx, v.column())?, control) {
                            controlled = false;
                            break;
                        }
                    }
                    if controlled {
                        points.push(Point {
                            value: row.cell(variable_idx, variable.column())?.to_string(),
                            runtime: row.cell(self.columns.runtime, RUNTIME_COLUMN)?.to_string(),
                        });
                    }
                }
            }
        }
        info!(
            "Sliced {} protocols over {} variables into {} files",
            groups.len(),
            self.columns.variables.len(),
            slices.len()
        );
        Ok(slices)
    }

    pub fn protocol_infos(&self) -> eyre::Result<Vec<ProtocolInfo>> {
        let metric = |row: &Row, idx: Option<usize>| {
            idx.and_then(|idx| row.get(idx))
                .and_then(|cell| cell.parse::<f64>().ok())
        };
        Ok(self
            .protocol_groups()?
            .into_iter()
            .filter_map(|(protocol, rows)| {
                let first = *rows.first()?;
                Some(ProtocolInfo {
                    protocol: protocol.to_string(),
                    runs: rows.len(),
                    p0_data_sent_mb: metric(first, self.columns.p0_data_sent),
                    all_data_sent_mb: metric(first, self.columns.all_data_sent),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sevare_layout::Switch;

    fn name(variable: Variable, datatype: &str, switches: SwitchConstellation) -> SliceName {
        SliceName {
            variable,
            datatype: if datatype == "all" {
                Datatype::All
            } else {
                Datatype::value(datatype).unwrap()
            },
            switches,
        }
    }

    fn values(points: &[Point]) -> Vec<(&str, &str)> {
        points
            .iter()
            .map(|p| (p.value.as_str(), p.runtime.as_str()))
            .collect()
    }

    fn slice(table: &str) -> Slices {
        let table = ResultTable::parse(table.as_bytes()).unwrap();
        Slicer::new(&table).unwrap().slice().unwrap()
    }

    #[test]
    fn numeric_equality() {
        assert!(same_value("10", "10.0"));
        assert!(same_value(" 1e3", "1000"));
        assert!(!same_value("10", "11"));
        assert!(same_value("rep3", "rep3"));
        assert!(!same_value("rep3", "rep4"));
    }

    #[test]
    fn other_variables_are_controlled() {
        let slices = slice(
            "protocol;latencies(ms);bandwidths(Mbs);runtime_chrono(s)\n\
             rep3;0;1000;1.0\n\
             rep3;10;1000;2.0\n\
             rep3;20;1000;3.0\n\
             rep3;0;100;4.0\n\
             rep3;0;10;5.0\n\
             rep3;10;10;6.0\n",
        );
        let d = SwitchConstellation::default();
        assert_eq!(slices.len(), 2);
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "all", d)).unwrap()),
            [("0", "1.0"), ("10", "2.0"), ("20", "3.0")]
        );
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Bandwidth, "all", d)).unwrap()),
            [("1000", "1.0"), ("100", "4.0"), ("10", "5.0")]
        );
    }

    #[test]
    fn protocols_are_grouped_and_controlled_separately() {
        let slices = slice(
            "protocol;latencies(ms);bandwidths(Mbs);runtime_chrono(s)\n\
             shamir;0;100;1.0\n\
             rep3;0;1000;2.0\n\
             shamir;5;100;3.0\n\
             rep3;5;1000;4.0\n\
             shamir;5;1000;5.0\n",
        );
        let d = SwitchConstellation::default();
        assert_eq!(
            values(slices.get("shamir", &name(Variable::Latency, "all", d)).unwrap()),
            [("0", "1.0"), ("5", "3.0")]
        );
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "all", d)).unwrap()),
            [("0", "2.0"), ("5", "4.0")]
        );
        let protocols: Vec<_> = slices.iter().map(|(p, _, _)| p).collect();
        assert_eq!(protocols, ["rep3", "rep3", "shamir", "shamir"]);
    }

    #[test]
    fn datatype_in_file_names() {
        let table = "protocol;datatype;latencies(ms);input_size;runtime_chrono(s)\n\
             rep3;32;0;100;1.0\n\
             rep3;32;10;100;2.0\n\
             rep3;64;0;100;3.0\n\
             rep3;32;0;200;4.0\n\
             rep3;64;0;200;5.0\n";
        let slices = slice(table);
        let d = SwitchConstellation::default();
        // Sliced by datatype: nothing is known about the datatype.
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Datatype, "all", d)).unwrap()),
            [("32", "1.0"), ("64", "3.0")]
        );
        // Sliced by latency: the datatype is held at its first value.
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "32", d)).unwrap()),
            [("0", "1.0"), ("10", "2.0")]
        );
        // Sliced by input size: one file per datatype.
        assert_eq!(
            values(slices.get("rep3", &name(Variable::InputSize, "32", d)).unwrap()),
            [("100", "1.0"), ("200", "4.0")]
        );
        assert_eq!(
            values(slices.get("rep3", &name(Variable::InputSize, "64", d)).unwrap()),
            [("100", "3.0"), ("200", "5.0")]
        );
        assert_eq!(slices.len(), 4);
    }

    #[test]
    fn input_size_without_datatype_column() {
        let slices = slice(
            "protocol;latencies(ms);input_size;runtime_chrono(s)\n\
             rep3;0;100;1.0\n\
             rep3;0;200;2.0\n\
             rep3;10;200;3.0\n",
        );
        let d = SwitchConstellation::default();
        assert_eq!(
            values(slices.get("rep3", &name(Variable::InputSize, "all", d)).unwrap()),
            [("100", "1.0"), ("200", "2.0")]
        );
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "all", d)).unwrap()),
            [("0", "1.0")]
        );
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn pinned_to_summary() {
        let table = ResultTable::parse(
            "protocol;datatype;latencies(ms);input_size;runtime_chrono(s)\n\
             rep3;32;0;100;1.0\n\
             rep3;64;0;200;2.0\n\
             rep3;64;10;200;3.0\n\
             rep3;32;10;100;4.0\n"
                .as_bytes(),
        )
        .unwrap();
        let summary = RunSummary {
            max_input: Some(200),
            max_datatype: Some(64),
        };
        let slices = Slicer::new(&table).unwrap().pin_to(&summary).slice().unwrap();
        let d = SwitchConstellation::default();
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "64", d)).unwrap()),
            [("0", "2.0"), ("10", "3.0")]
        );
        assert!(slices.get("rep3", &name(Variable::Latency, "32", d)).is_none());
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Datatype, "all", d)).unwrap()),
            [("64", "2.0")]
        );
    }

    #[test]
    fn switch_constellations() {
        let slices = slice(
            "protocol;latencies(ms);bandwidths(Mbs);preprocess;ssl;runtime_chrono(s)\n\
             rep3;0;1000;0;1;1.0\n\
             rep3;10;1000;0;1;2.0\n\
             rep3;0;1000;1;1;3.0\n\
             rep3;10;1000;1;1;4.0\n\
             rep3;10;500;0;0;5.0\n",
        );
        let d = SwitchConstellation::default();
        let pre = d.with(Switch::Preprocess, 1);
        let no_ssl = d.with(Switch::Ssl, 0);
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "all", d)).unwrap()),
            [("0", "1.0"), ("10", "2.0")]
        );
        assert_eq!(
            values(slices.get("rep3", &name(Variable::Latency, "all", pre)).unwrap()),
            [("0", "3.0"), ("10", "4.0")]
        );
        // The row reaches its file even though it's filtered out by the bandwidth control.
        assert_eq!(
            slices.get("rep3", &name(Variable::Latency, "all", no_ssl)),
            Some(&[][..])
        );
        assert!(slices
            .get("rep3", &name(Variable::Bandwidth, "all", no_ssl))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn bad_switch_value() {
        let table = ResultTable::parse(
            "protocol;latencies(ms);packbool;runtime_chrono(s)\nrep3;0;yes;1.0\n".as_bytes(),
        )
        .unwrap();
        let err = Slicer::new(&table).unwrap().slice().unwrap_err();
        assert!(format!("{err:#}").contains("packbool"), "{err:#}");
    }

    #[test]
    fn unusable_protocol_name() {
        for protocol in [".rep3", "rep%3"] {
            let table = ResultTable::parse(
                format!("protocol;latencies(ms);runtime_chrono(s)\n{protocol};0;1.0\n").as_bytes(),
            )
            .unwrap();
            let err = Slicer::new(&table).unwrap().slice().unwrap_err();
            assert!(format!("{err:#}").contains("line 2"), "{err:#}");
        }
    }

    #[test]
    fn short_row() {
        let table = ResultTable::parse(
            "protocol;latencies(ms);runtime_chrono(s)\nrep3;0;1.0\nrep3;10\n".as_bytes(),
        )
        .unwrap();
        let err = Slicer::new(&table).unwrap().slice().unwrap_err();
        assert!(format!("{err:#}").contains("line 3"), "{err:#}");
    }

    #[test]
    fn infos() {
        let table = ResultTable::parse(
            "protocol;latencies(ms);runtime_chrono(s);P0dataSent(MB);ALLdataSent(MB)\n\
             shamir;0;1.0;2.5;7.5\n\
             rep3;0;1.0;1;n/a\n\
             shamir;10;1.0;3;9\n"
                .as_bytes(),
        )
        .unwrap();
        let infos = Slicer::new(&table).unwrap().protocol_infos().unwrap();
        assert_eq!(
            infos,
            vec![
                ProtocolInfo {
                    protocol: "rep3".into(),
                    runs: 1,
                    p0_data_sent_mb: Some(1.0),
                    all_data_sent_mb: None,
                },
                ProtocolInfo {
                    protocol: "shamir".into(),
                    runs: 2,
                    p0_data_sent_mb: Some(2.5),
                    all_data_sent_mb: Some(7.5),
                },
            ]
        );
    }

    proptest! {
        #[test]
        fn slices_hold_exactly_the_controlled_rows(
            grid in proptest::collection::vec((0u8..4, 0u8..3), 1..40)
        ) {
            let mut table = String::from("protocol;latencies(ms);bandwidths(Mbs);runtime_chrono(s)\n");
            for (i, (lat, bwd)) in grid.iter().enumerate() {
                table.push_str(&format!("p;{lat};{bwd};{i}\n"));
            }
            let slices = slice(&table);
            let d = SwitchConstellation::default();
            let (lat0, bwd0) = grid[0];

            let expect = |keep: &dyn Fn(u8, u8) -> bool, pick: &dyn Fn(u8, u8) -> u8| {
                grid.iter()
                    .enumerate()
                    .filter(|(_, (l, b))| keep(*l, *b))
                    .map(|(i, (l, b))| Point { value: pick(*l, *b).to_string(), runtime: i.to_string() })
                    .collect::<Vec<_>>()
            };
            prop_assert_eq!(
                slices.get("p", &name(Variable::Latency, "all", d)).unwrap(),
                &expect(&|_, b| b == bwd0, &|l, _| l)[..]
            );
            prop_assert_eq!(
                slices.get("p", &name(Variable::Bandwidth, "all", d)).unwrap(),
                &expect(&|l, _| l == lat0, &|_, b| b)[..]
            );
        }
    }
}

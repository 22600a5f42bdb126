use std::{collections::BTreeMap, path::Path};

use eyre::WrapErr;
use log::{debug, warn};
use sevare_layout::SliceName;

/// One protocol's data file on a chart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Series {
    pub protocol: String,
    /// `<protocol>/<file name>`, relative to the slices directory.
    pub rel_path: String,
}

/// Everything plotted on one slide: all protocols' files sharing a slicing prefix and a switch
/// constellation.
#[derive(Clone, Debug)]
pub struct Chart {
    pub name: SliceName,
    pub series: Vec<Series>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    charts: Vec<Chart>,
}

fn sorted_entries(dir: &Path) -> eyre::Result<Vec<(String, std::fs::FileType)>> {
    let mut entries = Vec::new();
    for entry in dir
        .read_dir()
        .wrap_err_with(|| format!("Error reading directory {dir:?}"))?
    {
        let entry = entry.wrap_err_with(|| format!("Error reading directory {dir:?}"))?;
        let Ok(name) = entry.file_name().into_string() else {
            warn!("Skipping non UTF-8 name in {dir:?}");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        entries.push((name, entry.file_type()?));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

impl Catalog {
    /// Collect the charts described by a `parsed/2D` directory.
    pub fn scan(slices_dir: &Path) -> eyre::Result<Catalog> {
        let mut charts: BTreeMap<SliceName, Vec<Series>> = BTreeMap::new();
        for (protocol, file_type) in sorted_entries(slices_dir)? {
            if !file_type.is_dir() {
                warn!("Skipping {protocol:?}: not a protocol directory");
                continue;
            }
            let protocol_dir = slices_dir.join(&protocol);
            for (file, file_type) in sorted_entries(&protocol_dir)? {
                let name: SliceName = match file.parse() {
                    Ok(name) if file_type.is_file() => name,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Skipping {protocol}/{file}: {e}");
                        continue;
                    }
                };
                let path = protocol_dir.join(&file);
                let len = std::fs::metadata(&path)
                    .wrap_err_with(|| format!("Unable to stat {path:?}"))?
                    .len();
                if len == 0 {
                    debug!("Skipping {protocol}/{file}: no data points");
                    continue;
                }
                charts.entry(name).or_default().push(Series {
                    rel_path: format!("{protocol}/{file}"),
                    protocol: protocol.clone(),
                });
            }
        }
        Ok(Catalog {
            charts: charts
                .into_iter()
                .map(|(name, series)| Chart { name, series })
                .collect(),
        })
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }
}

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use eyre::WrapErr;
use serde::{Deserialize, Serialize};

/// Per-protocol metrics collected while slicing a result table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProtocolInfo {
    pub protocol: String,
    /// Number of data rows of the protocol in the table.
    pub runs: usize,
    /// First-seen `P0dataSent(MB)`.
    pub p0_data_sent_mb: Option<f64>,
    /// First-seen `ALLdataSent(MB)`.
    pub all_data_sent_mb: Option<f64>,
}

pub fn write_protocol_infos(path: &Path, infos: &[ProtocolInfo]) -> eyre::Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("Unable to create {path:?}"))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, infos)
        .wrap_err_with(|| format!("Writing protocol infos to {path:?}"))?;
    out.flush()
        .wrap_err_with(|| format!("Writing protocol infos to {path:?}"))
}

pub fn read_protocol_infos(path: &Path) -> eyre::Result<Vec<ProtocolInfo>> {
    let file = File::open(path).wrap_err_with(|| format!("Unable to open {path:?}"))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .wrap_err_with(|| format!("Parsing protocol infos in {path:?}"))
}

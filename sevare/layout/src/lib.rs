/*!
Shared vocabulary of the sevarebench report tools.

A sevarebench results directory holds the raw result tables of a measurement run under `data/`.
`sevare-parser` slices those tables into `parsed/2D/<protocol>/` and `sevare-plotter` turns the
slices into a slide deck under `plotted/`. This crate owns everything both sides must agree on:
the tracked variables and switches, how slice files are named, and where things live.
*/

use std::path::{Path, PathBuf};

use eyre::WrapErr;

mod infos;
mod naming;
mod switches;
mod variables;

pub use infos::{read_protocol_infos, write_protocol_infos, ProtocolInfo};
pub use naming::{validate_protocol, Datatype, SliceName, SLICE_EXTENSION};
pub use switches::{Switch, SwitchConstellation};
pub use variables::Variable;

/// Paths inside a sevarebench results directory.
#[derive(Clone, Debug)]
pub struct ResultsDir {
    root: PathBuf,
}

impl ResultsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ResultsDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the raw result tables live.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn parsed_dir(&self) -> PathBuf {
        self.root.join("parsed")
    }

    pub fn slices_dir(&self) -> PathBuf {
        self.parsed_dir().join("2D")
    }

    pub fn protocol_dir(&self, protocol: &str) -> PathBuf {
        self.slices_dir().join(protocol)
    }

    pub fn slice_path(&self, protocol: &str, name: &SliceName) -> PathBuf {
        self.protocol_dir(protocol).join(name.file_name())
    }

    pub fn protocol_infos_path(&self) -> PathBuf {
        self.parsed_dir().join("protocol_infos.json")
    }

    pub fn plotted_dir(&self) -> PathBuf {
        self.root.join("plotted")
    }
}

/// Create `path` as a fresh, empty directory.
///
/// An existing directory is only replaced when `force` is set.
pub fn prepare_output_dir(path: &Path, force: bool) -> eyre::Result<()> {
    if path.exists() {
        eyre::ensure!(
            force,
            "{path:?} already exists. Run with --force to overwrite it"
        );
        log::info!("Removing existing {path:?}");
        std::fs::remove_dir_all(path).wrap_err_with(|| format!("Unable to remove {path:?}"))?;
    }
    std::fs::create_dir_all(path).wrap_err_with(|| format!("Unable to create {path:?}"))
}

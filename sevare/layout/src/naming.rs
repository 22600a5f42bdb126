//! The slice file naming convention.
//!
//! A sliced data file is named `d<datatype>_<Tag>_<constellation>.txt`, for example
//! `d32_Lat_pre0split0pack0opt1ssl1fun0.txt`. The part before the constellation,
//! `d<datatype>_<Tag>`, is the *slicing prefix*: every file sharing a prefix and a constellation
//! across protocols belongs on the same chart.

use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{SwitchConstellation, Variable};

pub const SLICE_EXTENSION: &str = "txt";

/// Which datatype a slice was taken at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// The datatype was not controlled (it is the sliced variable, or it wasn't measured).
    All,
    Value(String),
}

impl Datatype {
    /// Wrap a datatype cell taken from a result table.
    pub fn value(v: &str) -> eyre::Result<Datatype> {
        let v = v.trim();
        eyre::ensure!(!v.is_empty(), "empty datatype value");
        eyre::ensure!(
            v != "all",
            "datatype value {v:?} collides with the uncontrolled-datatype marker"
        );
        eyre::ensure!(
            !v.contains(|c: char| c == '_' || c == '/' || c == '\\' || c.is_whitespace()),
            "datatype value {v:?} can't be used in a file name"
        );
        Ok(Datatype::Value(v.to_string()))
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::All => f.write_str("all"),
            Datatype::Value(v) => f.write_str(v),
        }
    }
}

// `all` sorts first, then numeric values ascending, then anything else by text.
impl Ord for Datatype {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Datatype::All, Datatype::All) => Ordering::Equal,
            (Datatype::All, _) => Ordering::Less,
            (_, Datatype::All) => Ordering::Greater,
            (Datatype::Value(a), Datatype::Value(b)) => {
                match (a.parse::<f64>().ok(), b.parse::<f64>().ok()) {
                    (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => a.cmp(b),
                }
            }
        }
    }
}

impl PartialOrd for Datatype {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The identity of one sliced data file within a protocol directory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SliceName {
    pub variable: Variable,
    pub datatype: Datatype,
    pub switches: SwitchConstellation,
}

impl SliceName {
    /// `d<datatype>_<Tag>`, shared by every file plotted on the same chart.
    pub fn prefix(&self) -> String {
        format!("d{}_{}", self.datatype, self.variable.tag())
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}.{SLICE_EXTENSION}", self.prefix(), self.switches)
    }
}

impl fmt::Display for SliceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl FromStr for SliceName {
    type Err = eyre::Report;

    fn from_str(name: &str) -> eyre::Result<Self> {
        let stem = name
            .strip_suffix(SLICE_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .ok_or_else(|| eyre::eyre!("{name:?} is not a .{SLICE_EXTENSION} file"))?;
        let stem = stem
            .strip_prefix('d')
            .ok_or_else(|| eyre::eyre!("{name:?} doesn't start with a datatype"))?;
        let mut parts = stem.splitn(3, '_');
        let (Some(datatype), Some(tag), Some(switches)) = (parts.next(), parts.next(), parts.next())
        else {
            eyre::bail!("{name:?} doesn't have the form d<datatype>_<variable>_<switches>");
        };
        let variable = Variable::from_tag(tag)
            .ok_or_else(|| eyre::eyre!("unknown variable tag {tag:?} in {name:?}"))?;
        let datatype = if datatype == "all" {
            Datatype::All
        } else {
            Datatype::value(datatype)?
        };
        Ok(SliceName {
            variable,
            datatype,
            switches: switches.parse()?,
        })
    }
}

// Characters TeX would interpret inside a pgfplots `table {<path>}`.
const TEX_SPECIALS: [char; 8] = ['%', '#', '{', '}', '$', '&', '^', '~'];

/// Check that a protocol name can be used as a directory name and inside a TeX file path.
pub fn validate_protocol(protocol: &str) -> eyre::Result<()> {
    eyre::ensure!(!protocol.is_empty(), "empty protocol name");
    eyre::ensure!(
        !protocol.starts_with('.') && !protocol.contains(['/', '\\']),
        "protocol name {protocol:?} can't be used as a directory name"
    );
    eyre::ensure!(
        !protocol.contains(TEX_SPECIALS),
        "protocol name {protocol:?} can't be referenced from a TeX document"
    );
    Ok(())
}

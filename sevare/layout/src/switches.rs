use std::{fmt, str::FromStr};

/// An on/off feature of a benchmark run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Switch {
    Preprocess,
    SplitRoles,
    PackBool,
    OptShare,
    Ssl,
    Function,
}

impl Switch {
    pub const ALL: [Switch; 6] = [
        Switch::Preprocess,
        Switch::SplitRoles,
        Switch::PackBool,
        Switch::OptShare,
        Switch::Ssl,
        Switch::Function,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Switch::Preprocess => "preprocess",
            Switch::SplitRoles => "splitroles",
            Switch::PackBool => "packbool",
            Switch::OptShare => "optshare",
            Switch::Ssl => "ssl",
            Switch::Function => "function",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Switch::Preprocess => "pre",
            Switch::SplitRoles => "split",
            Switch::PackBool => "pack",
            Switch::OptShare => "opt",
            Switch::Ssl => "ssl",
            Switch::Function => "fun",
        }
    }

    /// The value assumed when the result table has no column for this switch.
    pub fn default_value(self) -> u8 {
        match self {
            Switch::OptShare | Switch::Ssl => 1,
            _ => 0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The values of all six switches of a run.
///
/// Renders as `pre0split0pack0opt1ssl1fun0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwitchConstellation([u8; 6]);

impl Default for SwitchConstellation {
    fn default() -> Self {
        SwitchConstellation(Switch::ALL.map(Switch::default_value))
    }
}

impl SwitchConstellation {
    pub fn get(&self, switch: Switch) -> u8 {
        self.0[switch.index()]
    }

    pub fn with(mut self, switch: Switch, value: u8) -> Self {
        self.0[switch.index()] = value;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Switch, u8)> + '_ {
        Switch::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}

impl fmt::Display for SwitchConstellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (switch, value) in self.iter() {
            write!(f, "{}{}", switch.tag(), value)?;
        }
        Ok(())
    }
}

impl FromStr for SwitchConstellation {
    type Err = eyre::Report;

    fn from_str(s: &str) -> eyre::Result<Self> {
        let mut rest = s;
        let mut out = SwitchConstellation::default();
        for switch in Switch::ALL {
            rest = rest.strip_prefix(switch.tag()).ok_or_else(|| {
                eyre::eyre!("switch constellation {s:?} is missing {:?}", switch.tag())
            })?;
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            eyre::ensure!(
                digits > 0,
                "switch {:?} in {s:?} has no value",
                switch.tag()
            );
            let value = rest[..digits]
                .parse()
                .map_err(|e| eyre::eyre!("switch {:?} in {s:?}: {e}", switch.tag()))?;
            out = out.with(switch, value);
            rest = &rest[digits..];
        }
        eyre::ensure!(rest.is_empty(), "trailing text {rest:?} in switch constellation {s:?}");
        Ok(out)
    }
}

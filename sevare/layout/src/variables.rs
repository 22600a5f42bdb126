use std::fmt;

/// An independent benchmark parameter that gets its own 2D slices.
///
/// The declaration order is significant: slices are produced (and charts are ordered) in this
/// order, with the datatype first and the input size last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    Datatype,
    Threads,
    TxBuffer,
    RxBuffer,
    Latency,
    Bandwidth,
    PacketLoss,
    Frequency,
    Quota,
    Cpus,
    InputSize,
}

impl Variable {
    pub const ALL: [Variable; 11] = [
        Variable::Datatype,
        Variable::Threads,
        Variable::TxBuffer,
        Variable::RxBuffer,
        Variable::Latency,
        Variable::Bandwidth,
        Variable::PacketLoss,
        Variable::Frequency,
        Variable::Quota,
        Variable::Cpus,
        Variable::InputSize,
    ];

    /// The header of the result-table column holding this variable.
    pub fn column(self) -> &'static str {
        match self {
            Variable::Datatype => "datatype",
            Variable::Threads => "threads",
            Variable::TxBuffer => "txbuffer",
            Variable::RxBuffer => "rxbuffer",
            Variable::Latency => "latencies(ms)",
            Variable::Bandwidth => "bandwidths(Mbs)",
            Variable::PacketLoss => "packetdrops(%)",
            Variable::Frequency => "freqs(GHz)",
            Variable::Quota => "quotas(%)",
            Variable::Cpus => "cpus",
            Variable::InputSize => "input_size",
        }
    }

    /// The three-letter tag used in slice file names.
    pub fn tag(self) -> &'static str {
        match self {
            Variable::Datatype => "Dtp",
            Variable::Threads => "Thd",
            Variable::TxBuffer => "txB",
            Variable::RxBuffer => "rxB",
            Variable::Latency => "Lat",
            Variable::Bandwidth => "Bwd",
            Variable::PacketLoss => "Pdr",
            Variable::Frequency => "Frq",
            Variable::Quota => "Quo",
            Variable::Cpus => "Cpu",
            Variable::InputSize => "Inp",
        }
    }

    /// Human readable label, used for chart axes.
    pub fn axis_label(self) -> &'static str {
        match self {
            Variable::Datatype => "Datatype (bits)",
            Variable::Threads => "Threads",
            Variable::TxBuffer => "TX Buffer",
            Variable::RxBuffer => "RX Buffer",
            Variable::Latency => "Latency (ms)",
            Variable::Bandwidth => "Bandwidth (Mbit/s)",
            Variable::PacketLoss => "Packet Loss (%)",
            Variable::Frequency => "Frequency (GHz)",
            Variable::Quota => "CPU Quota (%)",
            Variable::Cpus => "CPU Threads",
            Variable::InputSize => "Input Size",
        }
    }

    pub fn from_column(column: &str) -> Option<Variable> {
        Variable::ALL.into_iter().find(|v| v.column() == column)
    }

    pub fn from_tag(tag: &str) -> Option<Variable> {
        Variable::ALL.into_iter().find(|v| v.tag() == tag)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

//! Rendering charts into a beamer document with one pgfplots slide per chart.

use std::fmt::Write as _;

use sevare_layout::{Datatype, ProtocolInfo};

use crate::catalog::Chart;

// `white` is left out: it doesn't show on the slide background.
const COLORS: [&str; 18] = [
    "black", "blue", "brown", "cyan", "darkgray", "gray", "green", "lightgray", "lime", "magenta",
    "olive", "orange", "pink", "purple", "red", "teal", "violet", "yellow",
];

const PREAMBLE: &str = r"\documentclass[8pt]{beamer}
\setbeamertemplate{itemize item}{$-$}
\usepackage{pgf}
\usepackage{pgfplots}
\pgfplotsset{compat=newest}

\begin{document}
";

/// Escape text for use in TeX paragraph mode.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn datatype_caption(datatype: &Datatype) -> String {
    match datatype {
        Datatype::All => "all datatypes".to_string(),
        Datatype::Value(v) => format!("datatype {}", escape(v)),
    }
}

fn write_chart(out: &mut String, chart: &Chart, data_prefix: &str) -> std::fmt::Result {
    let label = escape(chart.name.variable.axis_label());
    writeln!(out, r"\begin{{frame}}")?;
    writeln!(
        out,
        r"    \frametitle{{{label}, {}, {}}}",
        datatype_caption(&chart.name.datatype),
        chart.name.switches
    )?;
    writeln!(out, r"    \begin{{figure}}")?;
    writeln!(out, r"        \begin{{tikzpicture}}")?;
    writeln!(out, r"            \begin{{axis}}[")?;
    writeln!(
        out,
        r"                xlabel={{{label}}}, ylabel={{runtime [s]}}, legend style={{anchor=west, legend pos=outer north east}}]"
    )?;
    for (i, series) in chart.series.iter().enumerate() {
        writeln!(
            out,
            r"                \addplot[mark=|, color={}, thick] table {{{data_prefix}{}}};",
            COLORS[i % COLORS.len()],
            series.rel_path
        )?;
    }
    let legend: Vec<String> = chart
        .series
        .iter()
        .map(|s| format!("{{{}}}", escape(&s.protocol)))
        .collect();
    writeln!(out, r"                \legend{{{}}}", legend.join(","))?;
    writeln!(out, r"            \end{{axis}}")?;
    writeln!(out, r"        \end{{tikzpicture}}")?;
    writeln!(out, r"        \begin{{itemize}}")?;
    writeln!(out, r"            \item Metric: {label} -- runtime")?;
    let switches: Vec<String> = chart
        .name
        .switches
        .iter()
        .map(|(switch, value)| format!("{}={value}", switch.column()))
        .collect();
    writeln!(out, r"            \item Switches: {}", switches.join(", "))?;
    writeln!(
        out,
        r"            \item Data: {}",
        escape(&chart.name.file_name())
    )?;
    writeln!(out, r"        \end{{itemize}}")?;
    writeln!(out, r"    \end{{figure}}")?;
    writeln!(out, r"\end{{frame}}")?;
    writeln!(out)
}

fn write_infos(out: &mut String, infos: &[ProtocolInfo]) -> std::fmt::Result {
    let mb = |v: Option<f64>| v.map_or_else(|| "--".to_string(), |v| v.to_string());
    writeln!(out, r"\begin{{frame}}")?;
    writeln!(out, r"    \frametitle{{Protocols}}")?;
    writeln!(out, r"    \begin{{tabular}}{{lrrr}}")?;
    writeln!(
        out,
        r"        Protocol & Runs & P0 sent (MB) & All sent (MB) \\"
    )?;
    writeln!(out, r"        \hline")?;
    for info in infos {
        writeln!(
            out,
            r"        {} & {} & {} & {} \\",
            escape(&info.protocol),
            info.runs,
            mb(info.p0_data_sent_mb),
            mb(info.all_data_sent_mb)
        )?;
    }
    writeln!(out, r"    \end{{tabular}}")?;
    writeln!(out, r"\end{{frame}}")?;
    writeln!(out)
}

/// Render the whole slide deck.
///
/// `data_prefix` is prepended to each series' path, so it must lead from the directory the
/// document is compiled in to the slices directory.
pub fn render(
    charts: &[Chart],
    infos: Option<&[ProtocolInfo]>,
    data_prefix: &str,
) -> eyre::Result<String> {
    let mut out = String::from(PREAMBLE);
    writeln!(out)?;
    for chart in charts {
        write_chart(&mut out, chart, data_prefix)?;
    }
    if let Some(infos) = infos.filter(|infos| !infos.is_empty()) {
        write_infos(&mut out, infos)?;
    }
    writeln!(out, r"\end{{document}}")?;
    Ok(out)
}

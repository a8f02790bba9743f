//! Human-readable rendering of profiles for the terminal.

use upstage_core::Profile;

const ABSENT: &str = "-";

/// One profile as aligned `key: value` lines.
pub fn format_profile(p: &Profile) -> String {
    let port = p.port.to_string();
    let rows = [
        ("name", p.name.as_str()),
        ("host", p.host.as_str()),
        ("port", port.as_str()),
        ("username", p.username.as_deref().unwrap_or(ABSENT)),
        ("key", p.key.as_deref().unwrap_or(ABSENT)),
    ];
    rows.iter()
        .map(|(label, value)| format!("{:<9} {value}\n", format!("{label}:")))
        .collect()
}

/// A `NAME HOST PORT USER KEY` table, columns padded to the widest cell.
pub fn format_table<'a>(profiles: impl IntoIterator<Item = &'a Profile>) -> String {
    let header = ["NAME", "HOST", "PORT", "USER", "KEY"].map(String::from);
    let rows: Vec<[String; 5]> = profiles
        .into_iter()
        .map(|p| {
            [
                p.name.clone(),
                p.host.clone(),
                p.port.to_string(),
                p.username.clone().unwrap_or_else(|| ABSENT.into()),
                p.key.clone().unwrap_or_else(|| ABSENT.into()),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Joins argv for copy-pasting into a POSIX shell, single-quoting where needed.
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            let plain = !arg.is_empty()
                && arg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "-_./@:~=+,%".contains(c));
            if plain {
                arg.clone()
            } else {
                format!("'{}'", arg.replace('\'', r"'\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// src/renderer.rs

use crate::error::{EnvironmentError, Result};
use crate::model::*;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Bullet used for versions or dates that recorded no message text
pub const PLACEHOLDER: &str = "Bugfixes and improvements";

/// Where a rendered changelog goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

/// Line layout of the markdown report. The console gets a blank line before
/// every section and a trailing newline; files have neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Console,
    File,
}

impl From<&Sink> for Layout {
    fn from(sink: &Sink) -> Self {
        match sink {
            Sink::Stdout => Layout::Console,
            Sink::File(_) => Layout::File,
        }
    }
}

/// Fixed-width sort key: up to three components, each zero-padded to 4 digits
pub fn version_key(label: &str) -> String {
    let mut parts = label.split('.');
    let mut next = || parts.next().unwrap_or("0");
    let (major, minor, patch) = (next(), next(), next());
    format!("{major:0>4}.{minor:0>4}.{patch:0>4}")
}

/// Versions newest first; labels with equal keys keep ledger order
pub fn sorted_versions(ledger: &VersionLedger) -> Vec<(&str, &DateBucket)> {
    let mut versions: Vec<_> = ledger.iter().collect();
    versions.sort_by_cached_key(|(label, _)| std::cmp::Reverse(version_key(label)));
    versions
}

/// Dates newest first
pub fn sorted_dates(bucket: &DateBucket) -> Vec<(&str, &[String])> {
    let mut dates: Vec<_> = bucket.iter().collect();
    dates.sort_by(|(a, _), (b, _)| b.cmp(a));
    dates
}

struct Line {
    text: String,
    spaced: bool,
}

impl Line {
    fn plain(text: String) -> Self {
        Self { text, spaced: false }
    }

    fn spaced(text: String) -> Self {
        Self { text, spaced: true }
    }
}

pub fn render_markdown(name: &str, ledger: &VersionLedger, date_group: bool, layout: Layout) -> String {
    let mut lines = vec![Line::plain(format!("# {name}"))];
    let mut last_heading: Option<&str> = None;

    for (version, bucket) in sorted_versions(ledger) {
        lines.push(Line::spaced(format!("## Version {version}")));

        if date_group {
            for (date, messages) in sorted_dates(bucket) {
                if messages.is_empty() {
                    // borrow the heading printed just before, if any
                    let heading = *last_heading.get_or_insert(date);
                    lines.push(Line::spaced(format!("### Date: {heading}")));
                    lines.push(Line::plain(format!("    - {PLACEHOLDER}")));
                } else {
                    last_heading = Some(date);
                    lines.push(Line::spaced(format!("### Date: {date}")));
                    lines.extend(sorted(messages).map(|m| Line::plain(format!("    - {m}"))));
                }
            }
        } else {
            let combined: Vec<String> = bucket.iter().flat_map(|(_, m)| m.iter().cloned()).collect();
            if combined.is_empty() {
                lines.push(Line::plain(format!("  - {PLACEHOLDER}")));
            } else {
                lines.extend(sorted(&combined).map(|m| Line::plain(format!("  - {m}"))));
            }
        }
    }

    let mut out = String::new();
    match layout {
        Layout::Console => {
            for line in &lines {
                if line.spaced {
                    out.push('\n');
                }
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        Layout::File => {
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&line.text);
            }
        }
    }
    out
}

fn sorted(messages: &[String]) -> impl Iterator<Item = &String> {
    let mut messages: Vec<_> = messages.iter().collect();
    messages.sort();
    messages.into_iter()
}

#[derive(Serialize)]
struct Document<'a> {
    versions: &'a VersionLedger,
}

/// `{ name: { "versions": { version: { date: [messages] } } } }`, indented by 4
pub fn render_json(name: &str, ledger: &VersionLedger) -> Result<String> {
    let mut document = IndexMap::new();
    document.insert(name, Document { versions: ledger });

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Sends rendered text to its sink in one write
pub fn write_output(sink: &Sink, contents: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut console = stdout.lock();
    write_output_to(sink, contents, &mut console)
}

/// Like [`write_output`], with `console` standing in for standard output
pub fn write_output_to<W: Write>(sink: &Sink, contents: &str, console: &mut W) -> Result<()> {
    match sink {
        Sink::Stdout => write_console(console, contents),
        Sink::File(path) => {
            write_file(path, contents)?;
            write_console(
                console,
                &format!("File \"{}\" was saved successfully!\n", path.display()),
            )
        }
    }
}

fn write_console<W: Write>(console: &mut W, text: &str) -> Result<()> {
    console
        .write_all(text.as_bytes())
        .and_then(|()| console.flush())
        .map_err(EnvironmentError::WriteConsole)?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| EnvironmentError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = contents.len(), "changelog written");
    Ok(())
}

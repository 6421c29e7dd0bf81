//! Statistics reporter
//!
//! Provides formatting and output for statistics.

use std::fmt::Write;
use std::str::FromStr;

use serde::Deserialize;

use crate::diagnostics::DiagnosticsSink;
use crate::stats::tracker::StatisticsTracker;
use crate::stats::value::StatsSnapshot;

/// Output format for statistics reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// CSV format, one row per key
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Statistics reporter
///
/// Formats tracker snapshots, sorted by key.
#[derive(Debug, Clone)]
pub struct StatsReporter {
    /// Output format
    format: ReportFormat,
    /// Whether to list associated patterns
    detailed: bool,
}

impl StatsReporter {
    /// Create a new reporter with the given format
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            detailed: true,
        }
    }

    /// Create a reporter with text format
    pub fn text() -> Self {
        Self::new(ReportFormat::Text)
    }

    /// Create a reporter with CSV format
    pub fn csv() -> Self {
        Self::new(ReportFormat::Csv)
    }

    /// Set whether to include associated patterns
    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Generate a report from a tracker
    pub fn report(&self, tracker: &StatisticsTracker) -> String {
        self.report_snapshots(&tracker.sorted_snapshots())
    }

    /// Generate a report from snapshots
    pub fn report_snapshots(&self, snapshots: &[StatsSnapshot]) -> String {
        match self.format {
            ReportFormat::Text => self.format_text(snapshots),
            ReportFormat::Csv => self.format_csv(snapshots),
        }
    }

    /// Send the report to `sink`, line by line
    pub fn emit(&self, tracker: &StatisticsTracker, sink: &dyn DiagnosticsSink) {
        for line in self.report(tracker).lines() {
            sink.emit(line);
        }
    }

    fn format_text(&self, snapshots: &[StatsSnapshot]) -> String {
        let mut output = String::new();

        writeln!(output, "=== Config Statistics ===").unwrap();
        writeln!(output, "Keys: {}", snapshots.len()).unwrap();
        let total: u64 = snapshots.iter().map(|s| s.count).sum();
        writeln!(output, "Lookups: {total}").unwrap();

        for snapshot in snapshots {
            writeln!(
                output,
                "  {}  count={}  avg={:.1}ns",
                snapshot.key, snapshot.count, snapshot.average_latency_ns
            )
            .unwrap();
            if self.detailed {
                for pattern in &snapshot.associated_patterns {
                    writeln!(output, "    <- {pattern}").unwrap();
                }
            }
        }

        output
    }

    fn format_csv(&self, snapshots: &[StatsSnapshot]) -> String {
        let mut output = String::new();

        if self.detailed {
            writeln!(output, "key,count,average_latency_ns,last_accessed_ms,patterns").unwrap();
        } else {
            writeln!(output, "key,count,average_latency_ns,last_accessed_ms").unwrap();
        }

        for snapshot in snapshots {
            write!(
                output,
                "{},{},{:.1},{}",
                csv_field(&snapshot.key),
                snapshot.count,
                snapshot.average_latency_ns,
                snapshot.last_accessed_millis().unwrap_or(0)
            )
            .unwrap();
            if self.detailed {
                let patterns: Vec<&str> = snapshot
                    .associated_patterns
                    .iter()
                    .map(String::as_str)
                    .collect();
                write!(output, ",{}", csv_field(&patterns.join("|"))).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }
}

impl Default for StatsReporter {
    fn default() -> Self {
        Self::text()
    }
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

// Run Reporter
// Renders run summaries as terminal text, TAP, JUnit XML or JSON

use super::summary::RunSummary;
use crate::execution::TileStatus;

use std::fmt;

/// Output format for run reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable terminal output
    #[default]
    Terminal,
    /// TAP (Test Anything Protocol) format
    Tap,
    /// JUnit XML format (for CI systems)
    JUnit,
    /// Pretty-printed JSON of the whole summary
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Terminal => write!(f, "terminal"),
            ReportFormat::Tap => write!(f, "tap"),
            ReportFormat::JUnit => write!(f, "junit"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" | "console" => Ok(ReportFormat::Terminal),
            "tap" => Ok(ReportFormat::Tap),
            "junit" | "junit-xml" | "xml" => Ok(ReportFormat::JUnit),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "Unknown report format '{}'. Valid formats: terminal, tap, junit, json",
                s
            )),
        }
    }
}

/// Renders a [`RunSummary`] in the requested format
pub struct Reporter;

impl Reporter {
    /// Generate a report in the specified format
    pub fn render(summary: &RunSummary, format: ReportFormat) -> String {
        match format {
            ReportFormat::Terminal => Self::to_terminal(summary),
            ReportFormat::Tap => Self::to_tap(summary),
            ReportFormat::JUnit => Self::to_junit_xml(summary),
            ReportFormat::Json => Self::to_json(summary),
        }
    }

    /// Failure lines, flag notice, tile count and the final status line
    pub fn to_terminal(summary: &RunSummary) -> String {
        let mut out = String::new();

        for line in &summary.failure_report {
            out.push_str(line);
            out.push('\n');
        }

        if let Some(notice) = summary.flags.notice() {
            out.push_str(&notice);
            out.push('\n');
        }

        out.push_str(&format!(
            "Ran {} tiles in {}ms\n",
            summary.stats.tile_count, summary.duration_ms
        ));
        out.push_str(&summary.status_line());
        out.push('\n');
        out
    }

    /// Generate TAP (Test Anything Protocol) output
    ///
    /// TAP version 13 compatible
    pub fn to_tap(summary: &RunSummary) -> String {
        let mut tap = String::new();
        tap.push_str("TAP version 13\n");
        tap.push_str(&format!("1..{}\n", summary.tiles.len()));

        for (i, tile) in summary.tiles.iter().enumerate() {
            let test_num = i + 1;

            if tile.passed() {
                tap.push_str(&format!("ok {} - {}\n", test_num, tile.name()));
                continue;
            }

            tap.push_str(&format!("not ok {} - {}\n", test_num, tile.name()));

            // YAML diagnostics block; JSON strings are valid YAML scalars
            tap.push_str("  ---\n");
            tap.push_str(&format!("  status: {}\n", tile.status.word()));
            if !tile.info.is_empty() {
                tap.push_str("  info:\n");
                for info in &tile.info {
                    tap.push_str(&format!("    - {}\n", json_string(info)));
                }
            }
            tap.push_str("  ...\n");
        }

        if let Some(notice) = summary.flags.notice() {
            tap.push_str(&format!("# {}\n", notice));
        }
        tap.push_str(&format!(
            "# tests {}\n# pass {}\n# fail {}\n# abort {}\n# raise {}\n# duration {}ms\n",
            summary.stats.tile_count,
            summary.stats.tile_passed,
            summary.stats.tile_failed,
            summary.stats.tile_aborted,
            summary.stats.tile_raised,
            summary.duration_ms
        ));

        tap
    }

    /// Generate JUnit XML output
    ///
    /// Failed and aborted tiles become `failure` elements, raised tiles
    /// become `error` elements.
    pub fn to_junit_xml(summary: &RunSummary) -> String {
        let failures = summary.stats.tile_failed + summary.stats.tile_aborted;
        let errors = summary.stats.tile_raised;
        let seconds = summary.duration().as_secs_f64();

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"{:.3}\">\n",
            summary.stats.tile_count, failures, errors, seconds
        ));
        xml.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" time=\"{:.3}\">\n",
            xml_escape(&summary.suite_name),
            summary.stats.tile_count,
            failures,
            errors,
            seconds
        ));

        for tile in &summary.tiles {
            xml.push_str(&format!(
                "    <testcase name=\"{}\" classname=\"{}\"",
                xml_escape(&tile.name()),
                xml_escape(&summary.suite_name)
            ));

            let element = match tile.status {
                TileStatus::Pristine => {
                    xml.push_str(" />\n");
                    continue;
                }
                TileStatus::Failed | TileStatus::Aborted => "failure",
                TileStatus::Raised => "error",
            };

            let message = tile.info.first().map(String::as_str).unwrap_or("");
            let first_line = message.lines().next().unwrap_or("");
            xml.push_str(">\n");
            xml.push_str(&format!(
                "      <{} type=\"{}\" message=\"{}\">\n",
                element,
                tile.status.word(),
                xml_escape(first_line)
            ));
            for info in &tile.info {
                xml.push_str(&format!("        {}\n", xml_escape(info)));
            }
            xml.push_str(&format!("      </{}>\n", element));
            xml.push_str("    </testcase>\n");
        }

        xml.push_str("  </testsuite>\n");
        xml.push_str("</testsuites>\n");
        xml
    }

    /// Pretty-printed JSON of the summary
    pub fn to_json(summary: &RunSummary) -> String {
        match serde_json::to_string_pretty(summary) {
            Ok(mut json) => {
                json.push('\n');
                json
            }
            Err(err) => format!("{{\"error\": {}}}\n", json_string(&err.to_string())),
        }
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Escape special XML characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

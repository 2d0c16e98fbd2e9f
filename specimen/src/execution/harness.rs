// Execution Harness
// Runs every selected leaf tile by tile and aggregates the outcomes

use super::context::ExecutionContext;
use super::fault::catch_panic;
use super::matrix::MatrixExpander;
use super::registry::BoxRegistry;
use crate::document::SpecFile;
use crate::reporting::{Outcome, ReportFormat, Reporter, RunSummary};
use crate::selection::FocusResolver;
use crate::spec::{SpecParser, SpecTree};

use std::io::{self, Write};
use std::time::Instant;

// =============================================================================
// Harness Configuration
// =============================================================================

/// Environment variable selecting the report format
pub const FORMAT_ENV: &str = "SPECIMEN_FORMAT";
/// Environment variable naming the suite in reports
pub const SUITE_ENV: &str = "SPECIMEN_SUITE";

/// Configuration for the harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Name of the suite in TAP, JUnit and JSON reports
    pub suite_name: String,
    pub format: ReportFormat,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            suite_name: "Specimen".to_string(),
            format: ReportFormat::Terminal,
        }
    }
}

impl HarnessConfig {
    /// Read `SPECIMEN_FORMAT` and `SPECIMEN_SUITE`, keeping the defaults
    /// for unset or invalid values
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(format) = lookup(FORMAT_ENV) {
            match format.parse() {
                Ok(format) => config.format = format,
                Err(err) => tracing::warn!("{}: {}", FORMAT_ENV, err),
            }
        }

        if let Some(suite_name) = lookup(SUITE_ENV).filter(|name| !name.trim().is_empty()) {
            config.suite_name = suite_name;
        }

        config
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A parsed spec tree together with the test functions it refers to
pub struct Harness {
    registry: BoxRegistry,
    tree: SpecTree,
    config: HarnessConfig,
}

impl Harness {
    /// Parse the files against the registry. Bad files and subtrees are
    /// dropped with a diagnostic; nothing here fails.
    pub fn new(files: Vec<SpecFile>, registry: BoxRegistry) -> Self {
        let mut parser = SpecParser::new(&registry);
        for file in &files {
            parser.parse_file(file);
        }
        let tree = parser.finish();

        Self {
            registry,
            tree,
            config: HarnessConfig::default(),
        }
    }

    /// Set the whole configuration
    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the report format
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the suite name
    pub fn with_suite_name(mut self, suite_name: impl Into<String>) -> Self {
        self.config.suite_name = suite_name.into();
        self
    }

    pub fn tree(&self) -> &SpecTree {
        &self.tree
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every selected tile, then write diagnostics and the report to `sink`
    pub fn run(&mut self, sink: &mut dyn Write) -> io::Result<RunSummary> {
        let selection = FocusResolver::select_leaves(&self.tree);

        for diagnostic in self.tree.diagnostics().iter().chain(&selection.warnings) {
            writeln!(sink, "{}", diagnostic)?;
        }

        let start = Instant::now();
        let mut context = ExecutionContext::new();
        let mut tiles = Vec::new();

        for &leaf_id in &selection.leaves {
            let leaf = &self.tree[leaf_id];
            let Some(function) = leaf.codebox.and_then(|id| self.registry.function_mut(id)) else {
                tracing::warn!(location = %leaf.location, "leaf has no test function");
                continue;
            };

            for tile in MatrixExpander::expand(leaf) {
                context.begin_tile();
                let outcome = catch_panic(|| function(&mut context, &tile));
                context.settle(outcome);

                let record = context.end_tile(&leaf.location, tile.index);
                tracing::debug!(
                    location = %leaf.location,
                    index = tile.index,
                    status = ?record.status,
                    "tile finished"
                );
                tiles.push(record);
            }
        }

        let failure_report = context.failure_report().to_vec();
        let outcome = if failure_report.is_empty() {
            Outcome::Success
        } else {
            Outcome::Failure
        };

        let summary = RunSummary {
            suite_name: self.config.suite_name.clone(),
            stats: context.stats(),
            flags: selection.stats,
            failure_report,
            tiles,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            outcome,
        };

        tracing::info!(
            tiles = summary.stats.tile_count,
            passed = summary.stats.tile_passed,
            failed = summary.stats.tile_failed,
            aborted = summary.stats.tile_aborted,
            raised = summary.stats.tile_raised,
            duration_ms = summary.duration_ms,
            "run finished: {}",
            summary.outcome
        );

        sink.write_all(Reporter::render(&summary, self.config.format).as_bytes())?;
        sink.flush()?;
        Ok(summary)
    }

    /// [`Harness::run`] with standard output as the sink
    pub fn run_to_stdout(&mut self) -> io::Result<RunSummary> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.run(&mut handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::TileStatus;
    use std::collections::HashMap;

    fn run(harness: &mut Harness) -> (RunSummary, String) {
        let mut out = Vec::new();
        let summary = harness.run(&mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_config_from_lookup() {
        let env: HashMap<&str, &str> = [(FORMAT_ENV, "junit"), (SUITE_ENV, "Zoo")]
            .into_iter()
            .collect();
        let config = HarnessConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.format, ReportFormat::JUnit);
        assert_eq!(config.suite_name, "Zoo");

        let config =
            HarnessConfig::from_lookup(|key| (key == FORMAT_ENV).then(|| "yaml".to_string()));
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_builders() {
        let harness = Harness::new(Vec::new(), BoxRegistry::new())
            .with_format(ReportFormat::Tap)
            .with_suite_name("Zoo");
        assert_eq!(harness.config().format, ReportFormat::Tap);
        assert_eq!(harness.config().suite_name, "Zoo");

        let harness = harness.with_config(HarnessConfig::default());
        assert_eq!(harness.config(), &HarnessConfig::default());
    }

    #[test]
    fn test_empty_run_succeeds() {
        let mut harness = Harness::new(Vec::new(), BoxRegistry::new());
        let (summary, out) = run(&mut harness);
        assert!(summary.is_success());
        assert_eq!(summary.stats.tile_count, 0);
        assert!(out.ends_with("SUCCESS -- 0 Passed | 0 Failed | 0 Aborted | 0 Raised\n"));
    }

    #[test]
    fn test_matrix_tiles_run_in_order() {
        let mut registry = BoxRegistry::new();
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let record = seen.clone();
        registry.register("zoo", move |_, tile| {
            record.borrow_mut().push(format!("{}{}", tile.str("size")?, tile.int("count")?));
            Ok(())
        });

        let file = SpecFile::virtual_file_dedent(
            "matrix.yaml",
            "
            box: zoo
            input: {}
            matrix:
              size: [s, l]
              count: [1, 2, 3]
            ",
        );
        let mut harness = Harness::new(vec![file], registry);
        let (summary, _) = run(&mut harness);

        assert_eq!(*seen.borrow(), vec!["s1", "s2", "s3", "l1", "l2", "l3"]);
        assert_eq!(summary.stats.tile_count, 6);
        let indices: Vec<usize> = summary.tiles.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_outcomes_are_classified() {
        let mut registry = BoxRegistry::new();
        registry.register("zoo", |ctx, tile| {
            match tile.str("mode")? {
                "pass" => {}
                "fail" => ctx.fail("wrong animal"),
                "abort" => return ctx.abort("enclosure closed"),
                "error" => {
                    tile.int("mode")?;
                }
                _ => panic!("unexpected mode"),
            }
            Ok(())
        });

        let file = SpecFile::virtual_file_dedent(
            "modes.yaml",
            "
            box: zoo
            input: {}
            matrix:
              mode: [pass, fail, abort, error, panic]
            ",
        );
        let mut harness = Harness::new(vec![file], registry);
        let (summary, out) = run(&mut harness);

        let statuses: Vec<TileStatus> = summary.tiles.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![
                TileStatus::Pristine,
                TileStatus::Failed,
                TileStatus::Aborted,
                TileStatus::Raised,
                TileStatus::Raised
            ]
        );
        assert_eq!(summary.outcome, Outcome::Failure);
        assert_eq!(summary.failure_report[0], "FAIL[modes.yaml:1:1][1]: wrong animal");
        assert_eq!(summary.failure_report[1], "ABORT[modes.yaml:1:1][2]: enclosure closed");
        assert!(summary.failure_report[2].starts_with(
            "RAISE[modes.yaml:1:1][3]: error: binding \"mode\" has type string, expected int"
        ));
        assert!(summary.failure_report[3]
            .starts_with("RAISE[modes.yaml:1:1][4]: panic: unexpected mode at "));
        assert!(out.contains("FAILURE -- 1 Passed | 1 Failed | 1 Aborted | 2 Raised"));
    }

    #[test]
    fn test_diagnostics_come_first() {
        let mut registry = BoxRegistry::new();
        registry.register("zoo", |_, _| Ok(()));
        let file = SpecFile::virtual_file_dedent(
            "warn.yaml",
            "
            box: zoo
            colour: blue
            input: {}
            ",
        );
        let mut harness = Harness::new(vec![file], registry).with_format(ReportFormat::Tap);
        let (_, out) = run(&mut harness);

        assert!(out.starts_with(
            "Warning: File (warn.yaml:1:1): Unknown key \"colour\". It has been ignored.\nTAP version 13\n"
        ));
    }
}

use colored::Colorize;
use serde::Serialize;
use similar::{Algorithm, ChangeTag, TextDiff};
use crate::ddl::StatementOrigin;
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::policy::EquivalencePolicy;

const CONTEXT_LINES: usize = 3;

/// Outcome of comparing an expected statement with an actual one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDiff {
    pub has_diff: bool,
    /// Unified diff, empty when `has_diff` is false.
    pub text: String,
}

impl TableDiff {
    pub fn none() -> Self {
        Self {
            has_diff: false,
            text: String::new(),
        }
    }

    fn from_text(text: String) -> Self {
        Self {
            has_diff: !text.is_empty(),
            text,
        }
    }
}

/// Compares two `CREATE TABLE` statements on their canonical forms.
///
/// The expected side is always parsed as the reference schema and printed as
/// `--- Original`; the actual side is the live schema, printed as `+++ New`.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    normalizer: Normalizer,
}

impl DiffEngine {
    pub fn new(policy: EquivalencePolicy) -> Result<Self> {
        Ok(Self::with_normalizer(Normalizer::new(policy)?))
    }

    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn diff(&self, expected_raw: &str, actual_raw: &str) -> Result<TableDiff> {
        let expected = self.normalizer.normalize(expected_raw, StatementOrigin::Reference)?;
        let actual = self.normalizer.normalize(actual_raw, StatementOrigin::Live)?;
        Ok(TableDiff::from_text(unified_diff(&expected, &actual)))
    }

    pub fn has_differences(&self, expected_raw: &str, actual_raw: &str) -> Result<bool> {
        Ok(self.diff(expected_raw, actual_raw)?.has_diff)
    }

    /// Diff of a declared table absent from the database: every line removed.
    pub fn diff_missing(&self, expected_raw: &str) -> Result<TableDiff> {
        let expected = self.normalizer.normalize(expected_raw, StatementOrigin::Reference)?;
        Ok(TableDiff::from_text(unified_diff(&expected, "")))
    }

    /// Diff of an undeclared live table: every line added.
    pub fn diff_unknown(&self, actual_raw: &str) -> Result<TableDiff> {
        let actual = self.normalizer.normalize(actual_raw, StatementOrigin::Live)?;
        Ok(TableDiff::from_text(unified_diff("", &actual)))
    }
}

/// Line diff of two canonical statements, in unified style without line
/// numbers. Returns an empty string when both sides are equal.
pub fn unified_diff(original: &str, new: &str) -> String {
    let original = with_trailing_newline(original);
    let new = with_trailing_newline(new);

    if original == new {
        return String::new();
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_lines(original.as_str(), new.as_str());

    let mut output = String::from("--- Original\n+++ New\n");

    for group in diff.grouped_ops(CONTEXT_LINES) {
        output.push_str("@@ @@\n");
        for op in &group {
            for change in diff.iter_changes(op) {
                let marker = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                output.push(marker);
                output.push_str(change.value().trim_end_matches('\n'));
                output.push('\n');
            }
        }
    }

    output
}

fn with_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

/// Colors a unified diff for terminal output.
pub fn format_sql_diff(diff_text: &str) -> String {
    let mut output = String::new();

    for line in diff_text.lines() {
        let formatted = if line.starts_with("--- ") || line.starts_with("+++ ") {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else {
            line.to_string()
        };
        output.push_str(&formatted);
        output.push('\n');
    }

    output
}

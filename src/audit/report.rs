use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    AlteredTable,
    MissingTable,
    UnknownTable,
}

impl DifferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferenceKind::AlteredTable => "altered_table",
            DifferenceKind::MissingTable => "missing_table",
            DifferenceKind::UnknownTable => "unknown_table",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            DifferenceKind::AlteredTable => "⚠",
            DifferenceKind::MissingTable => "✗",
            DifferenceKind::UnknownTable => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub table_name: String,
    #[serde(rename = "type")]
    pub kind: DifferenceKind,
    #[serde(rename = "diff")]
    pub diff_text: String,
}

impl Difference {
    pub fn new(table_name: impl Into<String>, kind: DifferenceKind, diff_text: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            kind,
            diff_text: diff_text.into(),
        }
    }

    pub fn removed_lines(&self) -> usize {
        self.count_lines('-', "--- ")
    }

    pub fn added_lines(&self) -> usize {
        self.count_lines('+', "+++ ")
    }

    fn count_lines(&self, marker: char, header: &str) -> usize {
        self.diff_text
            .lines()
            .filter(|l| l.starts_with(marker) && !l.starts_with(header))
            .count()
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct DifferenceTableRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Changes")]
    pub changes: String,
}

impl From<&Difference> for DifferenceTableRow {
    fn from(difference: &Difference) -> Self {
        let status = format!("{} {}", difference.kind.symbol(), difference.kind.as_str());
        let changes = format!("-{} +{}", difference.removed_lines(), difference.added_lines());

        DifferenceTableRow {
            table: difference.table_name.clone(),
            status,
            changes,
        }
    }
}

/// Differences found by one audit, in evaluation order: declared tables in
/// file order, then unknown tables in listing order. Matching tables are not
/// recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaReport {
    pub differences: Vec<Difference>,
}

impl SchemaReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty diffs mean "no difference" and are dropped.
    pub fn add(&mut self, difference: Difference) {
        if !difference.diff_text.is_empty() {
            self.differences.push(difference);
        }
    }

    pub fn get(&self, table_name: &str) -> Option<&Difference> {
        self.differences.iter().find(|d| d.table_name == table_name)
    }

    pub fn is_clean(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.differences.iter().map(|d| d.table_name.as_str()).collect()
    }

    pub fn count(&self, kind: DifferenceKind) -> usize {
        self.differences.iter().filter(|d| d.kind == kind).count()
    }

    pub fn altered_count(&self) -> usize {
        self.count(DifferenceKind::AlteredTable)
    }

    pub fn missing_count(&self) -> usize {
        self.count(DifferenceKind::MissingTable)
    }

    pub fn unknown_count(&self) -> usize {
        self.count(DifferenceKind::UnknownTable)
    }

    pub fn rows(&self) -> Vec<DifferenceTableRow> {
        self.differences.iter().map(DifferenceTableRow::from).collect()
    }
}

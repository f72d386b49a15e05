use std::collections::{HashMap, HashSet};
use std::path::Path;
use async_trait::async_trait;
use crate::ddl::{extract_tables, extract_tables_from_file, TableDefinition};
use crate::error::{ConnectionError, Result};
use super::connector::SchemaConnector;

/// In-memory connector over a captured schema.
///
/// Built from a dump of `SHOW CREATE TABLE` statements (or table by table),
/// it lets an audit run without a server. Failures can be injected to
/// exercise error handling:
///
/// ```rust,ignore
/// let connector = SnapshotConnector::new(true)
///     .with_table("glpi_items", "CREATE TABLE `glpi_items` (...)")
///     .with_table_error("glpi_logs", ConnectionError::query_failed("SHOW CREATE TABLE `glpi_logs`", "lost connection"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotConnector {
    tables: Vec<TableDefinition>,
    errors: HashMap<String, ConnectionError>,
    dropped: HashSet<String>,
    unavailable: Option<String>,
    utf8mb4: bool,
}

impl SnapshotConnector {
    pub fn new(uses_utf8mb4: bool) -> Self {
        Self {
            utf8mb4: uses_utf8mb4,
            ..Self::default()
        }
    }

    pub fn from_dump(contents: &str, uses_utf8mb4: bool) -> Result<Self> {
        Ok(Self::from_tables(extract_tables(contents)?, uses_utf8mb4))
    }

    pub fn from_dump_file(path: &Path, uses_utf8mb4: bool) -> Result<Self> {
        Ok(Self::from_tables(extract_tables_from_file(path)?, uses_utf8mb4))
    }

    pub fn from_tables(tables: Vec<TableDefinition>, uses_utf8mb4: bool) -> Self {
        let mut connector = Self::new(uses_utf8mb4);
        for table in tables {
            connector.insert(table);
        }
        connector
    }

    /// Adds or replaces a table. Replaced tables keep their listing position.
    pub fn with_table(mut self, name: impl Into<String>, raw_sql: impl Into<String>) -> Self {
        self.insert(TableDefinition::new(name, raw_sql));
        self
    }

    pub fn with_table_error(mut self, name: impl Into<String>, error: ConnectionError) -> Self {
        self.errors.insert(name.into(), error);
        self
    }

    /// The table stays listed and reported as existing, but its definition
    /// can no longer be read, as when it is dropped while an audit runs.
    pub fn with_dropped_table(mut self, name: impl Into<String>) -> Self {
        self.dropped.insert(name.into());
        self
    }

    /// Every call fails as if the server could not be reached.
    pub fn with_connection_failure(mut self, reason: impl Into<String>) -> Self {
        self.unavailable = Some(reason.into());
        self
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    fn insert(&mut self, table: TableDefinition) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    fn check_available(&self) -> std::result::Result<(), ConnectionError> {
        match &self.unavailable {
            Some(reason) => Err(ConnectionError::Unavailable {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_table(&self, table: &str) -> std::result::Result<(), ConnectionError> {
        self.check_available()?;
        match self.errors.get(table) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SchemaConnector for SnapshotConnector {
    fn name(&self) -> &'static str {
        "Snapshot"
    }

    fn uses_utf8mb4(&self) -> bool {
        self.utf8mb4
    }

    async fn show_create_table(&self, table: &str) -> std::result::Result<Option<String>, ConnectionError> {
        self.check_table(table)?;
        if self.dropped.contains(table) {
            return Ok(None);
        }
        Ok(self
            .tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.raw_sql.clone()))
    }

    async fn table_exists(&self, table: &str) -> std::result::Result<bool, ConnectionError> {
        self.check_table(table)?;
        Ok(self.tables.iter().any(|t| t.name == table))
    }

    async fn list_tables(&self, prefix: &str) -> std::result::Result<Vec<String>, ConnectionError> {
        self.check_available()?;
        Ok(self
            .tables
            .iter()
            .filter(|t| t.name.starts_with(prefix))
            .map(|t| t.name.clone())
            .collect())
    }
}

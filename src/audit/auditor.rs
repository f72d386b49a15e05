use std::collections::HashSet;
use std::path::Path;
use crate::ddl::{extract_tables_from_file, TableDefinition};
use crate::diff::{DiffEngine, TableDiff};
use crate::error::{ConnectionError, Result};
use crate::live::{LiveSchemaReader, SchemaConnector};
use crate::policy::EquivalencePolicy;
use super::context::AuditContext;
use super::report::{Difference, DifferenceKind, SchemaReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    /// Report live tables of the audited context that the schema file does
    /// not declare.
    pub detect_unknown_tables: bool,
    /// `""`, `"core"` or `"plugin:<key>"`.
    pub context: String,
    /// Prefix shared by every table of the installation, e.g. `glpi_`.
    pub table_prefix: String,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            detect_unknown_tables: true,
            context: String::new(),
            table_prefix: String::new(),
        }
    }
}

impl AuditOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_tables(mut self, detect: bool) -> Self {
        self.detect_unknown_tables = detect;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
}

/// Compares a reference schema file with a live database.
///
/// Tables are processed one after the other, so the report order matches the
/// schema file and then the live listing. The first connector failure aborts
/// the audit.
pub struct SchemaAuditor<'a> {
    reader: LiveSchemaReader<'a>,
    engine: DiffEngine,
}

impl<'a> SchemaAuditor<'a> {
    pub fn new(connector: &'a dyn SchemaConnector, policy: EquivalencePolicy) -> Result<Self> {
        Ok(Self {
            reader: LiveSchemaReader::new(connector),
            engine: DiffEngine::new(policy)?,
        })
    }

    /// Default policy, with the charset default advertised by the connector.
    pub fn with_default_policy(connector: &'a dyn SchemaConnector) -> Result<Self> {
        Self::new(connector, EquivalencePolicy::for_target(connector.uses_utf8mb4()))
    }

    pub fn policy(&self) -> &EquivalencePolicy {
        self.engine.normalizer().policy()
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    pub async fn audit(&self, schema_path: &Path, options: &AuditOptions) -> Result<SchemaReport> {
        tracing::debug!("Reading reference schema from {}", schema_path.display());
        let declared = extract_tables_from_file(schema_path)?;
        self.audit_tables(&declared, options).await
    }

    pub async fn audit_tables(&self, declared: &[TableDefinition], options: &AuditOptions) -> Result<SchemaReport> {
        // context errors must surface before any query is issued
        let context = AuditContext::parse(&options.context)?;
        let mut report = SchemaReport::new();

        for table in declared {
            let (kind, diff) = self.compare(table).await?;
            if diff.has_diff {
                report.add(Difference::new(&table.name, kind, diff.text));
            }
        }

        if options.detect_unknown_tables {
            let declared_names: HashSet<&str> = declared.iter().map(|t| t.name.as_str()).collect();
            let filter = context.table_filter(&options.table_prefix);

            for name in self.reader.list_tables(&filter.prefix).await? {
                if declared_names.contains(name.as_str()) || !filter.matches(&name) {
                    continue;
                }
                let live = match self.reader.fetch(&name).await? {
                    Some(live) => live,
                    None => {
                        tracing::warn!("Table `{}` is listed but its definition cannot be read", name);
                        return Err(ConnectionError::query_failed(
                            format!("SHOW CREATE TABLE `{}`", name),
                            "table is listed but returned no definition",
                        )
                        .into());
                    }
                };
                let diff = self.engine.diff_unknown(&live.raw_sql)?;
                report.add(Difference::new(name, DifferenceKind::UnknownTable, diff.text));
            }
        }

        tracing::info!(
            "Audited {} declared tables in {} context: {} altered, {} missing, {} unknown",
            declared.len(),
            context,
            report.altered_count(),
            report.missing_count(),
            report.unknown_count()
        );

        Ok(report)
    }

    /// Whether `raw_sql` differs from the live definition of `table`.
    pub async fn has_differences(&self, table: &str, raw_sql: &str) -> Result<bool> {
        let (_, diff) = self.compare(&TableDefinition::new(table, raw_sql)).await?;
        Ok(diff.has_diff)
    }

    /// Unified diff between `raw_sql` and the live definition of `table`,
    /// empty when they are equivalent.
    pub async fn get_diff(&self, table: &str, raw_sql: &str) -> Result<String> {
        let (_, diff) = self.compare(&TableDefinition::new(table, raw_sql)).await?;
        Ok(diff.text)
    }

    /// One existence check, then one fetch when the table exists.
    async fn compare(&self, table: &TableDefinition) -> Result<(DifferenceKind, TableDiff)> {
        if !self.reader.exists(&table.name).await? {
            tracing::debug!("Table `{}` is missing from the database", table.name);
            let diff = self.engine.diff_missing(&table.raw_sql)?;
            return Ok((DifferenceKind::MissingTable, diff));
        }

        match self.reader.fetch(&table.name).await? {
            Some(live) => {
                tracing::debug!("Comparing `{}` with its live definition", table.name);
                let diff = self.engine.diff(&table.raw_sql, &live.raw_sql)?;
                Ok((DifferenceKind::AlteredTable, diff))
            }
            None => {
                let diff = self.engine.diff_missing(&table.raw_sql)?;
                Ok((DifferenceKind::MissingTable, diff))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConnectionError, SchemaCheckError};
    use crate::live::SnapshotConnector;

    const ITEMS: &str = "CREATE TABLE `glpi_items` (
  `id` int unsigned NOT NULL AUTO_INCREMENT,
  `name` varchar(255) NOT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci ROW_FORMAT=DYNAMIC";

    fn declared() -> Vec<TableDefinition> {
        vec![TableDefinition::new("glpi_items", ITEMS)]
    }

    #[tokio::test]
    async fn test_matching_table_is_not_reported() {
        let connector = SnapshotConnector::new(true).with_table("glpi_items", ITEMS);
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
        let report = auditor.audit_tables(&declared(), &AuditOptions::new()).await.unwrap();
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_get_diff_and_has_differences() {
        let live = ITEMS.replace("varchar(255)", "varchar(100)");
        let connector = SnapshotConnector::new(true).with_table("glpi_items", live);
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();

        assert!(auditor.has_differences("glpi_items", ITEMS).await.unwrap());
        let diff = auditor.get_diff("glpi_items", ITEMS).await.unwrap();
        assert!(diff.contains("-  `name` varchar(255) NOT NULL,\n"));
        assert!(diff.contains("+  `name` varchar(100) NOT NULL,\n"));
    }

    #[tokio::test]
    async fn test_invalid_context_fails_before_queries() {
        let connector = SnapshotConnector::new(true).with_connection_failure("down");
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
        let options = AuditOptions::new().with_context("nonsense");
        let err = auditor.audit_tables(&declared(), &options).await.unwrap_err();
        assert!(matches!(err, SchemaCheckError::Config(_)));
    }

    #[tokio::test]
    async fn test_connector_failure_aborts() {
        let connector = SnapshotConnector::new(true)
            .with_table("glpi_items", ITEMS)
            .with_table_error("glpi_items", ConnectionError::Timeout {
                operation: "SHOW CREATE TABLE".to_string(),
                duration_ms: Some(5000),
            });
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
        let err = auditor.audit_tables(&declared(), &AuditOptions::new()).await.unwrap_err();
        assert!(matches!(err, SchemaCheckError::Connection(ConnectionError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_unreadable_unknown_table_aborts() {
        let connector = SnapshotConnector::new(true)
            .with_table("glpi_items", ITEMS)
            .with_table("glpi_extras", "CREATE TABLE `glpi_extras` (`id` int NOT NULL)")
            .with_dropped_table("glpi_extras");
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
        let options = AuditOptions::new().with_table_prefix("glpi_");
        let err = auditor.audit_tables(&declared(), &options).await.unwrap_err();
        match err {
            SchemaCheckError::Connection(ConnectionError::QueryFailed { query, .. }) => {
                assert_eq!(query, "SHOW CREATE TABLE `glpi_extras`");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_policy_seeded_from_connector() {
        let connector = SnapshotConnector::new(true);
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
        assert!(auditor.policy().target_uses_utf8mb4);
        assert!(auditor.policy().strict);
    }
}

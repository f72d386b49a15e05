use crate::ddl::TableDefinition;
use crate::error::Result;
use super::connector::SchemaConnector;

/// Fetches live table definitions through a borrowed connector.
///
/// Connector failures are returned as [`SchemaCheckError::Connection`] and are
/// not retried.
///
/// [`SchemaCheckError::Connection`]: crate::error::SchemaCheckError::Connection
pub struct LiveSchemaReader<'a> {
    connector: &'a dyn SchemaConnector,
}

impl<'a> LiveSchemaReader<'a> {
    pub fn new(connector: &'a dyn SchemaConnector) -> Self {
        Self { connector }
    }

    pub fn uses_utf8mb4(&self) -> bool {
        self.connector.uses_utf8mb4()
    }

    /// `None` when the table does not exist.
    pub async fn fetch(&self, table: &str) -> Result<Option<TableDefinition>> {
        tracing::debug!("Fetching live definition of `{}` from {}", table, self.connector.name());
        let raw_sql = self.connector.show_create_table(table).await?;
        Ok(raw_sql.map(|sql| TableDefinition::new(table, sql)))
    }

    pub async fn exists(&self, table: &str) -> Result<bool> {
        Ok(self.connector.table_exists(table).await?)
    }

    pub async fn list_tables(&self, prefix: &str) -> Result<Vec<String>> {
        let tables = self.connector.list_tables(prefix).await?;
        tracing::debug!("{} live tables match prefix '{}'", tables.len(), prefix);
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaCheckError;
    use crate::live::SnapshotConnector;

    #[tokio::test]
    async fn test_fetch_and_exists() {
        let connector = SnapshotConnector::new(false).with_table("glpi_items", "CREATE TABLE `glpi_items` (`id` int)");
        let reader = LiveSchemaReader::new(&connector);

        let table = reader.fetch("glpi_items").await.unwrap().unwrap();
        assert_eq!(table.name, "glpi_items");
        assert!(reader.exists("glpi_items").await.unwrap());
        assert!(reader.fetch("glpi_logs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces() {
        let connector = SnapshotConnector::new(false).with_connection_failure("refused");
        let reader = LiveSchemaReader::new(&connector);
        let err = reader.fetch("glpi_items").await.unwrap_err();
        assert!(matches!(err, SchemaCheckError::Connection(_)));
        assert!(err.is_fatal_for_run());
    }
}

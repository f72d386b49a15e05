use async_trait::async_trait;
use crate::error::ConnectionError;

/// Read-only access to a running database's schema.
///
/// Implementations issue one introspection query per call and never retry.
#[async_trait]
pub trait SchemaConnector: Send + Sync {
    /// Connector name used in logs, e.g. "MySQL" or "Snapshot".
    fn name(&self) -> &'static str;

    /// Whether text columns default to `utf8mb4` on this server.
    fn uses_utf8mb4(&self) -> bool;

    /// Raw `SHOW CREATE TABLE` output, `None` when the table does not exist.
    async fn show_create_table(&self, table: &str) -> Result<Option<String>, ConnectionError>;

    async fn table_exists(&self, table: &str) -> Result<bool, ConnectionError>;

    /// Tables whose name starts with `prefix`, in the server's listing order.
    async fn list_tables(&self, prefix: &str) -> Result<Vec<String>, ConnectionError>;
}

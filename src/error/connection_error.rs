use std::fmt;

#[derive(Debug, Clone)]
pub enum ConnectionError {
    QueryFailed {
        query: String,
        message: String,
    },

    Timeout {
        operation: String,
        duration_ms: Option<u64>,
    },

    Unavailable {
        reason: String,
    },
}

/// 1-based position inside a DDL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

impl ConnectionError {
    pub fn query_failed(query: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectionError::QueryFailed {
            query: query.into(),
            message: message.into(),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ConnectionError::QueryFailed { .. } => {
                "Check that:\n  \
                 • The database user may run SHOW CREATE TABLE\n  \
                 • The table name is spelled correctly".to_string()
            }

            ConnectionError::Timeout { operation, .. } => {
                format!(
                    "Operation '{operation}' timed out:\n  \
                     • Check the database server load\n  \
                     • Re-run the check once the server is responsive"
                )
            }

            ConnectionError::Unavailable { .. } => {
                "Connection failed:\n  \
                 • Verify the database server is running\n  \
                 • Verify the connection settings".to_string()
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectionError::QueryFailed { .. } => "QUERY_FAILED",
            ConnectionError::Timeout { .. } => "TIMEOUT",
            ConnectionError::Unavailable { .. } => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::QueryFailed { query, message } => {
                write!(f, "Query failed: {message}")?;
                if !query.is_empty() {
                    write!(f, " (query: {query})")?;
                }
                Ok(())
            }

            ConnectionError::Timeout { operation, duration_ms } => {
                write!(f, "Timeout during {operation}")?;
                if let Some(ms) = duration_ms {
                    write!(f, " (after {}ms)", ms)?;
                }
                Ok(())
            }

            ConnectionError::Unavailable { reason } => {
                write!(f, "Database unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ConnectionError::query_failed("SHOW CREATE TABLE `t`", "denied");
        assert_eq!(err.error_code(), "QUERY_FAILED");
        assert!(err.to_string().contains("SHOW CREATE TABLE `t`"));

        let err = ConnectionError::Timeout { operation: "list_tables".to_string(), duration_ms: Some(500) };
        assert_eq!(err.error_code(), "TIMEOUT");
        assert_eq!(err.to_string(), "Timeout during list_tables (after 500ms)");
    }

    #[test]
    fn test_suggestion_mentions_operation() {
        let err = ConnectionError::Timeout { operation: "show_create_table".to_string(), duration_ms: None };
        assert!(err.suggestion().contains("show_create_table"));
    }
}

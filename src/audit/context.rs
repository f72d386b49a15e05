use std::fmt;
use crate::error::{Result, SchemaCheckError};

/// Namespace of tables an audit is responsible for.
///
/// `""` or `"core"` selects the application's own tables; `"plugin:<key>"`
/// selects the tables of one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditContext {
    Core,
    Plugin(String),
}

impl AuditContext {
    pub fn parse(context: &str) -> Result<Self> {
        match context {
            "" | "core" => Ok(AuditContext::Core),
            other => match other.strip_prefix("plugin:") {
                Some(key) if !key.is_empty() => Ok(AuditContext::Plugin(key.to_string())),
                _ => Err(SchemaCheckError::Config(format!(
                    "invalid audit context '{}': expected \"core\" or \"plugin:<key>\"",
                    context
                ))),
            },
        }
    }

    /// Live tables that belong to this context, given the installation's
    /// table prefix.
    pub fn table_filter(&self, table_prefix: &str) -> TableFilter {
        match self {
            AuditContext::Core => TableFilter {
                prefix: table_prefix.to_string(),
                excluded_prefix: Some(format!("{}plugin_", table_prefix)),
            },
            AuditContext::Plugin(key) => TableFilter {
                prefix: format!("{}plugin_{}_", table_prefix, key),
                excluded_prefix: None,
            },
        }
    }
}

impl fmt::Display for AuditContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditContext::Core => write!(f, "core"),
            AuditContext::Plugin(key) => write!(f, "plugin:{}", key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    pub prefix: String,
    pub excluded_prefix: Option<String>,
}

impl TableFilter {
    pub fn matches(&self, table: &str) -> bool {
        table.starts_with(&self.prefix)
            && self
                .excluded_prefix
                .as_deref()
                .map_or(true, |excluded| !table.starts_with(excluded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contexts() {
        assert_eq!(AuditContext::parse("").unwrap(), AuditContext::Core);
        assert_eq!(AuditContext::parse("core").unwrap(), AuditContext::Core);
        assert_eq!(
            AuditContext::parse("plugin:foo").unwrap(),
            AuditContext::Plugin("foo".to_string())
        );
        assert!(AuditContext::parse("plugin:").is_err());
        assert!(AuditContext::parse("addon:foo").is_err());
    }

    #[test]
    fn test_core_filter_excludes_plugins() {
        let filter = AuditContext::Core.table_filter("glpi_");
        assert!(filter.matches("glpi_computers"));
        assert!(!filter.matches("glpi_plugin_foo_bars"));
        assert!(!filter.matches("other_table"));
    }

    #[test]
    fn test_plugin_filter() {
        let filter = AuditContext::Plugin("foo".to_string()).table_filter("glpi_");
        assert_eq!(filter.prefix, "glpi_plugin_foo_");
        assert!(filter.matches("glpi_plugin_foo_bars"));
        assert!(!filter.matches("glpi_plugin_foobar_items"));
        assert!(!filter.matches("glpi_computers"));
    }
}

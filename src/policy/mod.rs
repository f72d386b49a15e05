use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{Result, SchemaCheckError};

pub const DEFAULT_FOREIGN_KEY_PATTERN: &str = r"^id$|_id$|_id_";

/// Which schema differences count when two `CREATE TABLE` statements are
/// compared.
///
/// Built once per audit and shared read-only by the normalizer and the diff
/// engine. Every `ignore_*` flag tolerates one class of drift left behind by
/// a migration that has not been run yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalencePolicy {
    /// Keep declared column and index order.
    pub strict: bool,
    /// The live server defaults text columns to `utf8mb4`.
    pub target_uses_utf8mb4: bool,
    pub ignore_utf8mb4_migration: bool,
    pub ignore_timestamps_migration: bool,
    pub ignore_dynamic_row_format_migration: bool,
    pub ignore_innodb_migration: bool,
    pub ignore_unsigned_keys_migration: bool,
    /// Drop `DEFAULT CURRENT_TIMESTAMP [ON UPDATE CURRENT_TIMESTAMP]` on
    /// `NOT NULL` temporal columns. MySQL adds these implicitly.
    pub implicit_timestamp_defaults: bool,
    /// Column names treated as keys by `ignore_unsigned_keys_migration`.
    pub foreign_key_pattern: String,
}

impl Default for EquivalencePolicy {
    fn default() -> Self {
        Self {
            strict: true,
            target_uses_utf8mb4: false,
            ignore_utf8mb4_migration: false,
            ignore_timestamps_migration: false,
            ignore_dynamic_row_format_migration: false,
            ignore_innodb_migration: false,
            ignore_unsigned_keys_migration: false,
            implicit_timestamp_defaults: true,
            foreign_key_pattern: DEFAULT_FOREIGN_KEY_PATTERN.to_string(),
        }
    }
}

impl EquivalencePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default policy, with the charset default advertised by the connector.
    pub fn for_target(target_uses_utf8mb4: bool) -> Self {
        Self {
            target_uses_utf8mb4,
            ..Self::default()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|_| SchemaCheckError::Config(format!("policy file not found: {}", path.display())))?;
        Self::from_yaml(&content)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enables every `ignore_*` flag.
    pub fn ignoring_all_migrations(mut self) -> Self {
        self.ignore_utf8mb4_migration = true;
        self.ignore_timestamps_migration = true;
        self.ignore_dynamic_row_format_migration = true;
        self.ignore_innodb_migration = true;
        self.ignore_unsigned_keys_migration = true;
        self
    }

    /// Effective charset of text columns when the table declares none.
    pub fn implicit_charset(&self) -> &'static str {
        if self.target_uses_utf8mb4 && !self.ignore_utf8mb4_migration {
            "utf8mb4"
        } else {
            "utf8"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = EquivalencePolicy::default();
        assert!(policy.strict);
        assert!(!policy.target_uses_utf8mb4);
        assert!(!policy.ignore_innodb_migration);
        assert!(policy.implicit_timestamp_defaults);
        assert_eq!(policy.foreign_key_pattern, DEFAULT_FOREIGN_KEY_PATTERN);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let policy = EquivalencePolicy::from_yaml(
            "strict: false\nignore_timestamps_migration: true\n",
        )
        .unwrap();
        assert!(!policy.strict);
        assert!(policy.ignore_timestamps_migration);
        assert!(!policy.ignore_innodb_migration);
        assert!(policy.implicit_timestamp_defaults);
    }

    #[test]
    fn test_unknown_yaml_type_is_error() {
        assert!(EquivalencePolicy::from_yaml("strict: maybe\n").is_err());
    }

    #[test]
    fn test_missing_policy_file() {
        let err = EquivalencePolicy::from_yaml_file(Path::new("/nonexistent/policy.yaml")).unwrap_err();
        assert!(matches!(err, SchemaCheckError::Config(_)));
    }

    #[test]
    fn test_implicit_charset() {
        assert_eq!(EquivalencePolicy::for_target(true).implicit_charset(), "utf8mb4");
        assert_eq!(EquivalencePolicy::for_target(false).implicit_charset(), "utf8");

        let mut policy = EquivalencePolicy::for_target(true);
        policy.ignore_utf8mb4_migration = true;
        assert_eq!(policy.implicit_charset(), "utf8");
    }
}

mod charset;
mod column;
mod index;
mod options;

use regex::Regex;
use crate::ddl::{parse_create_table, CreateTable, StatementOrigin};
use crate::error::{Result, SchemaCheckError};
use crate::policy::EquivalencePolicy;

pub use charset::{canonical_name, CharsetDefaults};
pub use column::canonical_type;
pub use options::canonical_engine;

use column::ColumnContext;

/// Rewrites `CREATE TABLE` statements into their canonical form under one
/// [`EquivalencePolicy`].
///
/// Two statements are equivalent under the policy exactly when their
/// canonical forms are equal. The canonical form is stable:
/// normalizing it again yields the same text.
#[derive(Debug, Clone)]
pub struct Normalizer {
    policy: EquivalencePolicy,
    key_pattern: Regex,
}

impl Normalizer {
    pub fn new(policy: EquivalencePolicy) -> Result<Self> {
        let key_pattern = Regex::new(&policy.foreign_key_pattern).map_err(|e| {
            SchemaCheckError::Config(format!(
                "invalid foreign_key_pattern '{}': {}",
                policy.foreign_key_pattern, e
            ))
        })?;

        Ok(Self { policy, key_pattern })
    }

    pub fn policy(&self) -> &EquivalencePolicy {
        &self.policy
    }

    /// Canonical text of `raw_sql`, one clause per line.
    pub fn normalize(&self, raw_sql: &str, origin: StatementOrigin) -> Result<String> {
        Ok(self.normalize_table(raw_sql, origin)?.to_string())
    }

    pub fn normalize_table(&self, raw_sql: &str, origin: StatementOrigin) -> Result<CreateTable> {
        let table = parse_create_table(raw_sql, origin)?;
        let table = self.canonicalize(table);
        tracing::debug!("Normalized {} table `{}`", origin, table.name);
        Ok(table)
    }

    pub fn canonicalize(&self, mut table: CreateTable) -> CreateTable {
        let policy = &self.policy;

        table.options = options::normalize_options(std::mem::take(&mut table.options), policy);
        let charset_defaults = charset::table_defaults(&table.options, policy);

        let primary_key: Vec<String> = table
            .primary_key_columns()
            .into_iter()
            .map(str::to_string)
            .collect();

        let ctx = ColumnContext {
            policy,
            key_pattern: &self.key_pattern,
            primary_key: &primary_key,
            charset_defaults: &charset_defaults,
        };
        for def in &mut table.columns {
            column::normalize_column(def, &ctx);
        }

        for def in &mut table.indexes {
            index::normalize_index(def);
        }

        if policy.ignore_utf8mb4_migration {
            charset::drop_migrated_table_defaults(&mut table.options);
        }
        options::order_options(&mut table.options);

        if !policy.strict {
            index::order_columns(&mut table.columns, &primary_key);
            index::order_indexes(&mut table.indexes);
            table.constraints.sort();
        }

        table
    }
}

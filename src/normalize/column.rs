use regex::Regex;
use crate::ddl::{ColumnDef, DataType, DefaultValue, Nullability};
use crate::policy::EquivalencePolicy;
use super::charset::{self, CharsetDefaults};

/// Per-table inputs shared by every column rule.
pub struct ColumnContext<'a> {
    pub policy: &'a EquivalencePolicy,
    pub key_pattern: &'a Regex,
    pub primary_key: &'a [String],
    pub charset_defaults: &'a CharsetDefaults,
}

impl ColumnContext<'_> {
    fn is_key_column(&self, name: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == name) || self.key_pattern.is_match(name)
    }
}

pub fn normalize_column(column: &mut ColumnDef, ctx: &ColumnContext<'_>) {
    let policy = ctx.policy;

    column.data_type = canonical_type(&column.data_type);

    if column.zerofill {
        column.unsigned = true;
    }

    if policy.ignore_timestamps_migration && column.data_type.name == "timestamp" {
        column.data_type.name = "datetime".to_string();
    }

    if policy.ignore_utf8mb4_migration && column.data_type.is_text_blob() {
        column.data_type.name = "text".to_string();
    }

    if policy.ignore_unsigned_keys_migration
        && column.unsigned
        && !column.zerofill
        && column.data_type.is_integer()
        && ctx.is_key_column(&column.name)
    {
        column.unsigned = false;
    }

    charset::normalize_column(column, ctx.charset_defaults, policy);

    let numeric_default = match &column.default {
        Some(DefaultValue::Str(value)) if is_numeric_literal(value) => Some(value.clone()),
        _ => None,
    };
    if let Some(value) = numeric_default {
        column.default = Some(DefaultValue::Number(value));
    }

    if column.nullability == Some(Nullability::Null) {
        column.nullability = None;
    }
    if column.default == Some(DefaultValue::Null) && !column.is_not_null() {
        column.default = None;
    }

    if policy.implicit_timestamp_defaults
        && column.data_type.is_temporal()
        && column.is_not_null()
        && column.default.as_ref().is_some_and(DefaultValue::is_current_timestamp)
        && column.on_update.as_ref().map_or(true, DefaultValue::is_current_timestamp)
    {
        column.default = None;
        column.on_update = None;
    }

    column.comment = None;

    for clause in &column.extra {
        tracing::warn!("Keeping unrecognized clause on column `{}`: {}", column.name, clause);
    }
}

/// Folds type aliases and drops integer display widths.
pub fn canonical_type(data_type: &DataType) -> DataType {
    let name = match data_type.name.as_str() {
        "integer" => "int",
        "bool" | "boolean" => "tinyint",
        "numeric" | "dec" | "fixed" => "decimal",
        other => other,
    };

    let canonical = DataType::new(name);
    if canonical.is_integer() {
        canonical
    } else {
        canonical.with_args(data_type.args.clone())
    }
}

fn is_numeric_literal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();

    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

use crate::ddl::{ColumnDef, TableOption};
use crate::policy::EquivalencePolicy;

/// Charset and collation a column inherits when it declares neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetDefaults {
    pub charset: String,
    pub collation: String,
}

/// Lower-cases a charset or collation name and folds legacy aliases.
///
/// `utf8mb3` is always `utf8`. With `fold_utf8mb4`, the `utf8mb4` family is
/// folded onto `utf8` as well.
pub fn canonical_name(name: &str, fold_utf8mb4: bool) -> String {
    let lower = name.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("utf8mb3") {
        return format!("utf8{}", rest);
    }
    if fold_utf8mb4 {
        if let Some(rest) = lower.strip_prefix("utf8mb4") {
            return format!("utf8{}", rest);
        }
    }
    lower
}

/// Charset a collation belongs to: `utf8mb4_unicode_ci` -> `utf8mb4`.
pub fn charset_of_collation(collation: &str) -> &str {
    collation.split('_').next().unwrap_or(collation)
}

pub fn default_collation(charset: &str) -> String {
    match charset {
        "latin1" => "latin1_swedish_ci".to_string(),
        "ascii" => "ascii_general_ci".to_string(),
        "binary" => "binary".to_string(),
        other => format!("{}_unicode_ci", other),
    }
}

/// Resolves the table-level defaults from already canonical options.
pub fn table_defaults(options: &[TableOption], policy: &EquivalencePolicy) -> CharsetDefaults {
    let declared_charset = options.iter().find_map(|o| match o {
        TableOption::Charset(c) => Some(c.clone()),
        _ => None,
    });
    let declared_collation = options.iter().find_map(|o| match o {
        TableOption::Collate(c) => Some(c.clone()),
        _ => None,
    });

    let charset = declared_charset
        .or_else(|| declared_collation.as_deref().map(|c| charset_of_collation(c).to_string()))
        .unwrap_or_else(|| policy.implicit_charset().to_string());
    let collation = declared_collation.unwrap_or_else(|| default_collation(&charset));

    CharsetDefaults { charset, collation }
}

pub fn normalize_column(column: &mut ColumnDef, defaults: &CharsetDefaults, policy: &EquivalencePolicy) {
    let fold = policy.ignore_utf8mb4_migration;

    column.charset = column.charset.as_deref().map(|c| canonical_name(c, fold));
    column.collation = column.collation.as_deref().map(|c| canonical_name(c, fold));

    if column.charset.is_none() {
        column.charset = column
            .collation
            .as_deref()
            .map(|c| charset_of_collation(c).to_string());
    }

    let Some(charset) = column.charset.clone() else {
        return;
    };

    // a bare CHARACTER SET takes that charset's default collation, not the table's
    let collation = column
        .collation
        .clone()
        .unwrap_or_else(|| default_collation(&charset));

    if charset == defaults.charset && collation == defaults.collation {
        column.charset = None;
        column.collation = None;
    } else {
        column.collation = Some(collation);
    }
}

/// Under `ignore_utf8mb4_migration`, the table-level utf8 default is no
/// longer compared. Non-default collations stay.
pub fn drop_migrated_table_defaults(options: &mut Vec<TableOption>) {
    options.retain(|o| match o {
        TableOption::Charset(c) => c != "utf8",
        TableOption::Collate(c) => c != "utf8_unicode_ci",
        _ => true,
    });
}

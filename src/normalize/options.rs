use crate::ddl::TableOption;
use crate::policy::EquivalencePolicy;
use super::charset::canonical_name;

/// Rewrites table options to canonical values. Options that are never
/// structural (`AUTO_INCREMENT=`, `COMMENT=`) and options silenced by the
/// policy are removed.
pub fn normalize_options(options: Vec<TableOption>, policy: &EquivalencePolicy) -> Vec<TableOption> {
    let fold = policy.ignore_utf8mb4_migration;

    options
        .into_iter()
        .filter_map(|option| match option {
            TableOption::AutoIncrement(_) | TableOption::Comment(_) => None,
            TableOption::Engine(_) if policy.ignore_innodb_migration => None,
            TableOption::RowFormat(_) if policy.ignore_dynamic_row_format_migration => None,
            TableOption::Engine(engine) => Some(TableOption::Engine(canonical_engine(&engine))),
            TableOption::RowFormat(format) => Some(TableOption::RowFormat(format.to_ascii_uppercase())),
            TableOption::Charset(charset) => Some(TableOption::Charset(canonical_name(&charset, fold))),
            TableOption::Collate(collation) => Some(TableOption::Collate(canonical_name(&collation, fold))),
            TableOption::Other(text) => {
                tracing::warn!("Keeping unrecognized table option: {}", text);
                Some(TableOption::Other(text))
            }
            TableOption::Trailing(text) => {
                tracing::warn!("Keeping trailing table clause: {}", text);
                Some(TableOption::Trailing(text))
            }
        })
        .collect()
}

/// Alphabetical by rendered text, trailing clauses kept last.
pub fn order_options(options: &mut [TableOption]) {
    options.sort_by_cached_key(|o| (o.is_trailing(), o.to_string()));
}

pub fn canonical_engine(engine: &str) -> String {
    match engine.to_ascii_lowercase().as_str() {
        "innodb" => "InnoDB".to_string(),
        "myisam" => "MyISAM".to_string(),
        "memory" | "heap" => "MEMORY".to_string(),
        "csv" => "CSV".to_string(),
        "archive" => "ARCHIVE".to_string(),
        "aria" => "Aria".to_string(),
        _ => engine.to_string(),
    }
}

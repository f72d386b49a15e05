use crate::ddl::{ColumnDef, IndexDef, IndexKind};

/// Name the server gives an unnamed index whose first key part is an expression.
const FUNCTIONAL_INDEX_NAME: &str = "functional_index";

pub fn normalize_index(index: &mut IndexDef) {
    index.comment = None;

    if index.kind == IndexKind::Primary {
        index.name = None;
    } else if index.name.is_none() {
        index.name = index.columns.first().map(|c| {
            if c.is_expression {
                FUNCTIONAL_INDEX_NAME.to_string()
            } else {
                c.name.clone()
            }
        });
    }

    for option in &index.options {
        if !option.starts_with("USING ") && !option.starts_with("KEY_BLOCK_SIZE=") {
            tracing::warn!(
                "Keeping unrecognized option on index `{}`: {}",
                index.name.as_deref().unwrap_or("PRIMARY"),
                option
            );
        }
    }
}

/// PRIMARY, UNIQUE, FULLTEXT, SPATIAL, then plain keys; by name within a kind.
pub fn order_indexes(indexes: &mut [IndexDef]) {
    indexes.sort_by(|a, b| {
        a.kind
            .precedence()
            .cmp(&b.kind.precedence())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Primary key columns first, in key order, then the rest by rendered line.
pub fn order_columns(columns: &mut [ColumnDef], primary_key: &[String]) {
    let rank = |column: &ColumnDef| primary_key.iter().position(|pk| *pk == column.name);

    columns.sort_by_cached_key(|column| match rank(column) {
        Some(position) => (0, position, String::new()),
        None => (1, 0, column.to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::{DataType, IndexColumn};

    fn key(kind: IndexKind, name: Option<&str>, column: &str) -> IndexDef {
        IndexDef::new(kind, name.map(str::to_string), vec![IndexColumn::named(column)])
    }

    #[test]
    fn test_missing_name_is_first_column() {
        let mut index = key(IndexKind::Fulltext, None, "content");
        normalize_index(&mut index);
        assert_eq!(index.name.as_deref(), Some("content"));
    }

    #[test]
    fn test_unnamed_functional_index() {
        let mut column = IndexColumn::named("(lower(`a`))");
        column.is_expression = true;
        let mut index = IndexDef::new(IndexKind::Plain, None, vec![column]);
        normalize_index(&mut index);
        assert_eq!(index.to_string(), "KEY `functional_index` ((lower(`a`)))");
    }

    #[test]
    fn test_primary_key_name_dropped() {
        let mut index = key(IndexKind::Primary, Some("PRIMARY"), "id");
        normalize_index(&mut index);
        assert_eq!(index.to_string(), "PRIMARY KEY (`id`)");
    }

    #[test]
    fn test_order_indexes() {
        let mut indexes = vec![
            key(IndexKind::Plain, Some("name"), "name"),
            key(IndexKind::Fulltext, Some("content"), "content"),
            key(IndexKind::Unique, Some("unicity"), "code"),
            key(IndexKind::Plain, Some("date"), "date"),
            key(IndexKind::Primary, None, "id"),
        ];
        order_indexes(&mut indexes);
        let names: Vec<_> = indexes.iter().map(|i| i.name.as_deref().unwrap_or("PRIMARY")).collect();
        assert_eq!(names, vec!["PRIMARY", "unicity", "content", "date", "name"]);
    }

    #[test]
    fn test_order_columns() {
        let mut columns: Vec<ColumnDef> = ["name", "b_id", "id", "a_id"]
            .iter()
            .map(|n| ColumnDef::new(*n, DataType::new("int")))
            .collect();
        order_columns(&mut columns, &["id".to_string()]);
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "a_id", "b_id", "name"]);
    }

    #[test]
    fn test_order_columns_by_rendered_line() {
        let mut columns: Vec<ColumnDef> = ["groups_id", "groups_id_tech"]
            .iter()
            .map(|n| ColumnDef::new(*n, DataType::new("int")))
            .collect();
        order_columns(&mut columns, &[]);
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["groups_id_tech", "groups_id"]);
    }
}

use std::fs;
use schemacheck::{extract_tables_from_file, SchemaCheckError};
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[test]
fn test_extract_from_schema_file() {
    let dir = setup_test_dir();
    let path = dir.path().join("schema.sql");
    fs::write(
        &path,
        "### Dump table glpi_alerts\n\
         DROP TABLE IF EXISTS `glpi_alerts`;\n\
         CREATE TABLE `glpi_alerts` (\n  `id` int unsigned NOT NULL AUTO_INCREMENT,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB;\n\
         /* multi\n   line */\n\
         CREATE TABLE `glpi_apiclients` (\n  `id` int unsigned NOT NULL AUTO_INCREMENT,\n  `name` varchar(255) DEFAULT NULL COMMENT 'semi;colon',\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB;\n",
    )
    .unwrap();

    let tables = extract_tables_from_file(&path).unwrap();
    let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["glpi_alerts", "glpi_apiclients"]);
    assert!(tables[0].raw_sql.starts_with("CREATE TABLE `glpi_alerts`"));
    assert!(tables[0].raw_sql.ends_with("ENGINE=InnoDB"));
    assert!(tables[1].raw_sql.contains("'semi;colon'"));
}

#[test]
fn test_missing_schema_file() {
    let dir = setup_test_dir();
    let err = extract_tables_from_file(&dir.path().join("missing.sql")).unwrap_err();
    assert!(matches!(err, SchemaCheckError::SchemaFileNotFound(_)));
}

#[test]
fn test_unterminated_statement_names_file() {
    let dir = setup_test_dir();
    let path = dir.path().join("broken.sql");
    fs::write(&path, "CREATE TABLE `glpi_a` (`id` int);\nCREATE TABLE `glpi_b` (\n  `id` int\n)\n").unwrap();

    let err = extract_tables_from_file(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("broken.sql"));
    assert!(message.contains("line 2, column 1"));
    assert!(message.contains("glpi_b"));
}

#[test]
fn test_unterminated_block_comment() {
    let dir = setup_test_dir();
    let path = dir.path().join("broken.sql");
    fs::write(&path, "CREATE TABLE `glpi_a` (`id` int);\n/* never closed").unwrap();

    assert!(matches!(
        extract_tables_from_file(&path),
        Err(SchemaCheckError::Parse { .. })
    ));
}

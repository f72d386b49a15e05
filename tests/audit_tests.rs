use std::fs;
use std::path::PathBuf;
use schemacheck::{
    AuditOptions, DifferenceKind, EquivalencePolicy, SchemaAuditor, SchemaCheckError, SnapshotConnector,
};
use tempfile::TempDir;

fn table_sql(name: &str, body: &str) -> String {
    format!(
        "CREATE TABLE `{}` (\n{}\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci ROW_FORMAT=DYNAMIC",
        name, body
    )
}

fn existing_table(name: &str) -> String {
    table_sql(
        name,
        "  `id` int unsigned NOT NULL AUTO_INCREMENT,\n  \
         `itemtype` varchar(100) NOT NULL,\n  \
         `items_id` int unsigned NOT NULL DEFAULT '0',\n  \
         `type` int NOT NULL DEFAULT '0',\n  \
         PRIMARY KEY (`id`),\n  \
         UNIQUE KEY `unicity` (`itemtype`,`items_id`,`type`),\n  \
         KEY `type` (`type`)",
    )
}

fn simple_table(name: &str) -> String {
    table_sql(
        name,
        "  `id` int unsigned NOT NULL AUTO_INCREMENT,\n  \
         `name` varchar(255) NOT NULL,\n  \
         `description` text,\n  \
         PRIMARY KEY (`id`)",
    )
}

fn write_schema(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("schema.sql");
    fs::write(&path, contents).unwrap();
    path
}

fn expected_diff(marker: char, name: &str) -> String {
    let lines = [
        format!("CREATE TABLE `{}` (", name),
        "  `id` int unsigned NOT NULL AUTO_INCREMENT,".to_string(),
        "  `name` varchar(255) NOT NULL,".to_string(),
        "  `description` text,".to_string(),
        "  PRIMARY KEY (`id`)".to_string(),
        ") COLLATE=utf8mb4_unicode_ci DEFAULT CHARSET=utf8mb4 ENGINE=InnoDB ROW_FORMAT=DYNAMIC".to_string(),
    ];
    let mut diff = String::from("--- Original\n+++ New\n@@ @@\n");
    for line in lines {
        diff.push(marker);
        diff.push_str(&line);
        diff.push('\n');
    }
    diff
}

#[tokio::test]
async fn test_missing_and_unknown_tables_per_context() {
    let contexts = [("core", "glpi_", "glpi_plugin_bar_things"), ("plugin:foo", "glpi_plugin_foo_", "glpi_computers")];

    for (context, prefix, foreign_table) in contexts {
        let existing = format!("{}existingtable", prefix);
        let missing = format!("{}missingtable", prefix);
        let unknown = format!("{}unknowntable", prefix);

        let dir = TempDir::new().unwrap();
        let schema = write_schema(
            &dir,
            &format!(
                "--\n-- Presence of multiline comments\n-- should not be an issue.\n--\n\n\
                 DROP TABLE IF EXISTS `glpi_somethings`;\n\n{};\n\n{};\n",
                existing_table(&existing),
                simple_table(&missing)
            ),
        );

        let connector = SnapshotConnector::new(true)
            .with_table(&existing, existing_table(&existing))
            .with_table(foreign_table, simple_table(foreign_table))
            .with_table(&unknown, simple_table(&unknown));
        let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();

        let options = AuditOptions::new().with_context(context).with_table_prefix("glpi_");
        let report = auditor.audit(&schema, &options).await.unwrap();

        assert_eq!(report.table_names(), vec![missing.as_str(), unknown.as_str()]);

        let missing_diff = report.get(&missing).unwrap();
        assert_eq!(missing_diff.kind, DifferenceKind::MissingTable);
        assert_eq!(missing_diff.diff_text, expected_diff('-', &missing));

        let unknown_diff = report.get(&unknown).unwrap();
        assert_eq!(unknown_diff.kind, DifferenceKind::UnknownTable);
        assert_eq!(unknown_diff.diff_text, expected_diff('+', &unknown));

        let without_unknown = auditor
            .audit(&schema, &options.clone().with_unknown_tables(false))
            .await
            .unwrap();
        assert_eq!(without_unknown.table_names(), vec![missing.as_str()]);
    }
}

#[tokio::test]
async fn test_altered_tables_keep_file_order() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(
        &dir,
        &format!(
            "{};\n{};\n{};\n",
            simple_table("glpi_c"),
            simple_table("glpi_a"),
            simple_table("glpi_b")
        ),
    );

    let connector = SnapshotConnector::new(true)
        .with_table("glpi_a", simple_table("glpi_a").replace("text", "mediumtext"))
        .with_table("glpi_b", simple_table("glpi_b"))
        .with_table("glpi_c", simple_table("glpi_c").replace("varchar(255)", "varchar(100)"));
    let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();

    let report = auditor.audit(&schema, &AuditOptions::new()).await.unwrap();
    assert_eq!(report.table_names(), vec!["glpi_c", "glpi_a"]);
    assert_eq!(report.altered_count(), 2);
    assert!(report.get("glpi_a").unwrap().diff_text.contains("+  `description` mediumtext,\n"));

    let mut policy = EquivalencePolicy::for_target(true);
    policy.ignore_utf8mb4_migration = true;
    let lenient = SchemaAuditor::new(&connector, policy).unwrap();
    let report = lenient.audit(&schema, &AuditOptions::new()).await.unwrap();
    assert_eq!(report.table_names(), vec!["glpi_c"]);
}

#[tokio::test]
async fn test_report_serializes_like_the_diagnostic_output() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, &format!("{};", simple_table("glpi_gone")));

    let connector = SnapshotConnector::new(true);
    let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
    let report = auditor.audit(&schema, &AuditOptions::new()).await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["differences"][0]["table_name"], "glpi_gone");
    assert_eq!(json["differences"][0]["type"], "missing_table");
    assert_eq!(json["differences"][0]["diff"], expected_diff('-', "glpi_gone"));
}

#[test]
fn test_audit_from_live_dump_file() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, &format!("{};", simple_table("glpi_items")));
    let dump = dir.path().join("live.sql");
    fs::write(&dump, format!("{};\n", simple_table("glpi_items").replace(" COLLATE=utf8mb4_unicode_ci", ""))).unwrap();

    let connector = SnapshotConnector::from_dump_file(&dump, true).unwrap();
    let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
    let report = tokio_test::block_on(auditor.audit(&schema, &AuditOptions::new())).unwrap();

    let diff = &report.get("glpi_items").unwrap().diff_text;
    assert!(diff.contains("-) COLLATE=utf8mb4_unicode_ci DEFAULT CHARSET=utf8mb4 ENGINE=InnoDB ROW_FORMAT=DYNAMIC\n"));
    assert!(diff.contains("+) DEFAULT CHARSET=utf8mb4 ENGINE=InnoDB ROW_FORMAT=DYNAMIC\n"));
}

#[tokio::test]
async fn test_parse_errors_abort_the_audit() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "CREATE TABLE `glpi_items` (`id` int");

    let connector = SnapshotConnector::new(false);
    let auditor = SchemaAuditor::with_default_policy(&connector).unwrap();
    let err = auditor.audit(&schema, &AuditOptions::new()).await.unwrap_err();
    assert!(matches!(err, SchemaCheckError::Parse { .. }));
}

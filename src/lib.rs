pub mod error;
pub mod ddl;
pub mod policy;
pub mod normalize;
pub mod diff;
pub mod live;
pub mod audit;

pub use error::{ConnectionError, Result, SchemaCheckError, SourceLocation};
pub use ddl::{
    extract_tables, extract_tables_from_file, parse_create_table, CreateTable, StatementOrigin,
    TableDefinition,
};
pub use policy::EquivalencePolicy;
pub use normalize::Normalizer;
pub use diff::{format_sql_diff, unified_diff, DiffEngine, TableDiff};
pub use live::{LiveSchemaReader, SchemaConnector, SnapshotConnector};
pub use audit::{
    AuditContext, AuditOptions, Difference, DifferenceKind, DifferenceTableRow, SchemaAuditor,
    SchemaReport,
};

mod auditor;
mod context;
mod report;

pub use auditor::{AuditOptions, SchemaAuditor};
pub use context::{AuditContext, TableFilter};
pub use report::{Difference, DifferenceKind, DifferenceTableRow, SchemaReport};

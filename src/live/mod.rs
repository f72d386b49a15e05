mod connector;
mod reader;
mod snapshot;

pub use connector::SchemaConnector;
pub use reader::LiveSchemaReader;
pub use snapshot::SnapshotConnector;

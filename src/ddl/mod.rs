mod extractor;
mod tokenizer;
mod statement;
mod parser;

pub use extractor::{extract_tables, extract_tables_from_file, TableDefinition};
pub use tokenizer::{tokenize, Lexeme};
pub use statement::{
    ColumnDef, CreateTable, DataType, DefaultValue, IndexColumn, IndexDef, IndexKind, Nullability,
    TableOption,
};
pub use parser::{parse_create_table, StatementOrigin};

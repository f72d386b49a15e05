use std::fmt;
use super::tokenizer::{quote_ident, quote_string};

/// Structured form of a `CREATE TABLE` statement.
///
/// `Display` renders the pretty-printed, one-clause-per-line layout that the
/// diff engine compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
    /// Foreign keys and check constraints, already rendered.
    pub constraints: Vec<String>,
    pub options: Vec<TableOption>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn primary_key(&self) -> Option<&IndexDef> {
        self.indexes.iter().find(|i| i.kind == IndexKind::Primary)
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.primary_key()
            .map(|pk| pk.columns.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn table_charset(&self) -> Option<&str> {
        self.options.iter().find_map(|o| match o {
            TableOption::Charset(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn table_collation(&self) -> Option<&str> {
        self.options.iter().find_map(|o| match o {
            TableOption::Collate(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let mut body: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        body.extend(self.indexes.iter().map(|i| i.to_string()));
        body.extend(self.constraints.iter().cloned());

        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(format!("CREATE TABLE {} (", quote_ident(&self.name)));

        let last = body.len().saturating_sub(1);
        for (i, item) in body.into_iter().enumerate() {
            if i == last {
                lines.push(format!("  {}", item));
            } else {
                lines.push(format!("  {},", item));
            }
        }

        let options: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();
        if options.is_empty() {
            lines.push(")".to_string());
        } else {
            lines.push(format!(") {}", options.join(" ")));
        }

        lines
    }
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    pub name: String,
    pub args: Vec<String>,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.name.as_str(),
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint"
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.name.as_str(), "timestamp" | "datetime")
    }

    pub fn is_text_blob(&self) -> bool {
        matches!(self.name.as_str(), "text" | "mediumtext" | "longtext")
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.args.join(","))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Null,
    NotNull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    Number(String),
    Str(String),
    /// `CURRENT_TIMESTAMP` and its synonyms, with optional fractional precision.
    CurrentTimestamp(Option<String>),
    Expression(String),
}

impl DefaultValue {
    pub fn is_current_timestamp(&self) -> bool {
        matches!(self, DefaultValue::CurrentTimestamp(_))
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => write!(f, "NULL"),
            DefaultValue::Number(n) => write!(f, "{}", n),
            DefaultValue::Str(s) => write!(f, "{}", quote_string(s)),
            DefaultValue::CurrentTimestamp(None) => write!(f, "CURRENT_TIMESTAMP"),
            DefaultValue::CurrentTimestamp(Some(p)) => write!(f, "CURRENT_TIMESTAMP({})", p),
            DefaultValue::Expression(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub unsigned: bool,
    pub zerofill: bool,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub nullability: Option<Nullability>,
    pub default: Option<DefaultValue>,
    pub on_update: Option<DefaultValue>,
    pub auto_increment: bool,
    pub comment: Option<String>,
    /// Clauses the parser does not model, kept verbatim.
    pub extra: Vec<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            unsigned: false,
            zerofill: false,
            charset: None,
            collation: None,
            nullability: None,
            default: None,
            on_update: None,
            auto_increment: false,
            comment: None,
            extra: Vec::new(),
        }
    }

    pub fn is_not_null(&self) -> bool {
        self.nullability == Some(Nullability::NotNull)
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote_ident(&self.name), self.data_type)?;
        if self.unsigned {
            write!(f, " unsigned")?;
        }
        if self.zerofill {
            write!(f, " zerofill")?;
        }
        if let Some(charset) = &self.charset {
            write!(f, " CHARACTER SET {}", charset)?;
        }
        if let Some(collation) = &self.collation {
            write!(f, " COLLATE {}", collation)?;
        }
        match self.nullability {
            Some(Nullability::NotNull) => write!(f, " NOT NULL")?,
            Some(Nullability::Null) => write!(f, " NULL")?,
            None => {}
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {}", default)?;
        }
        if let Some(on_update) = &self.on_update {
            write!(f, " ON UPDATE {}", on_update)?;
        }
        if self.auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        for clause in &self.extra {
            write!(f, " {}", clause)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", quote_string(comment))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKind {
    Primary,
    Unique,
    Fulltext,
    Spatial,
    Plain,
}

impl IndexKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            IndexKind::Primary => "PRIMARY KEY",
            IndexKind::Unique => "UNIQUE KEY",
            IndexKind::Fulltext => "FULLTEXT KEY",
            IndexKind::Spatial => "SPATIAL KEY",
            IndexKind::Plain => "KEY",
        }
    }

    /// Lower sorts first when indexes are reordered.
    pub fn precedence(&self) -> u8 {
        match self {
            IndexKind::Primary => 0,
            IndexKind::Unique => 1,
            IndexKind::Fulltext => 2,
            IndexKind::Spatial => 3,
            IndexKind::Plain => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// Column name, or the rendered expression of a functional key part.
    pub name: String,
    pub length: Option<String>,
    pub descending: bool,
    pub is_expression: bool,
}

impl IndexColumn {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: None,
            descending: false,
            is_expression: false,
        }
    }
}

impl fmt::Display for IndexColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_expression {
            write!(f, "{}", self.name)?;
        } else {
            write!(f, "{}", quote_ident(&self.name))?;
        }
        if let Some(length) = &self.length {
            write!(f, "({})", length)?;
        }
        if self.descending {
            write!(f, " DESC")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub kind: IndexKind,
    pub name: Option<String>,
    pub columns: Vec<IndexColumn>,
    /// `USING BTREE`, `KEY_BLOCK_SIZE=8`, ...
    pub options: Vec<String>,
    pub comment: Option<String>,
}

impl IndexDef {
    pub fn new(kind: IndexKind, name: Option<String>, columns: Vec<IndexColumn>) -> Self {
        Self {
            kind,
            name,
            columns,
            options: Vec::new(),
            comment: None,
        }
    }
}

impl fmt::Display for IndexDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.keyword())?;
        if self.kind != IndexKind::Primary {
            if let Some(name) = &self.name {
                write!(f, " {}", quote_ident(name))?;
            }
        }
        let columns: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        write!(f, " ({})", columns.join(","))?;
        for option in &self.options {
            write!(f, " {}", option)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", quote_string(comment))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOption {
    Engine(String),
    Charset(String),
    Collate(String),
    RowFormat(String),
    AutoIncrement(String),
    Comment(String),
    /// Any other option, rendered verbatim.
    Other(String),
    /// Clause following the options (`PARTITION BY ...`), rendered verbatim.
    Trailing(String),
}

impl TableOption {
    pub fn is_trailing(&self) -> bool {
        matches!(self, TableOption::Trailing(_))
    }
}

impl fmt::Display for TableOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOption::Engine(v) => write!(f, "ENGINE={}", v),
            TableOption::Charset(v) => write!(f, "DEFAULT CHARSET={}", v),
            TableOption::Collate(v) => write!(f, "COLLATE={}", v),
            TableOption::RowFormat(v) => write!(f, "ROW_FORMAT={}", v),
            TableOption::AutoIncrement(v) => write!(f, "AUTO_INCREMENT={}", v),
            TableOption::Comment(v) => write!(f, "COMMENT={}", quote_string(v)),
            TableOption::Other(v) | TableOption::Trailing(v) => write!(f, "{}", v),
        }
    }
}

use std::fs;
use std::path::Path;
use serde::Serialize;
use crate::error::{Result, SchemaCheckError, SourceLocation};
use super::tokenizer::executable_comment_body;

/// One `CREATE TABLE` statement, as declared in a schema file or returned by
/// the live database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    pub name: String,
    pub raw_sql: String,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, raw_sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_sql: raw_sql.into(),
        }
    }
}

pub fn extract_tables_from_file(path: &Path) -> Result<Vec<TableDefinition>> {
    if !path.exists() {
        return Err(SchemaCheckError::SchemaFileNotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)?;
    extract_from_source(&contents, &path.display().to_string())
}

/// Splits a schema file into its `CREATE TABLE` statements, in file order.
///
/// Other statements (`DROP TABLE`, `SET`, ...) are skipped. Comments are
/// removed from the extracted text, except MySQL executable comments
/// (`/*!50100 PARTITION BY ... */`) whose body is kept inline. Quoted strings
/// and identifiers are kept intact, so a `;` inside a `COMMENT '...'` does not
/// end the statement.
pub fn extract_tables(contents: &str) -> Result<Vec<TableDefinition>> {
    extract_from_source(contents, "schema source")
}

fn extract_from_source(contents: &str, origin: &str) -> Result<Vec<TableDefinition>> {
    let mut tables = Vec::new();

    for statement in split_statements(contents, origin)? {
        let text = statement.text.trim();
        if !starts_with_create_table(text) {
            continue;
        }

        let name = table_name(text).ok_or_else(|| {
            SchemaCheckError::parse(origin, statement.start, "CREATE TABLE without a table name")
        })?;

        if !statement.terminated {
            return Err(SchemaCheckError::parse(
                origin,
                statement.start,
                format!("CREATE TABLE `{}` is never terminated by ';'", name),
            ));
        }

        tables.push(TableDefinition::new(name, text));
    }

    Ok(tables)
}

struct RawStatement {
    text: String,
    start: SourceLocation,
    terminated: bool,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

fn split_statements(source: &str, origin: &str) -> Result<Vec<RawStatement>> {
    let mut statements = Vec::new();
    let mut cursor = Cursor::new(source);
    let mut current = String::new();
    let mut start: Option<SourceLocation> = None;

    while let Some(c) = cursor.peek() {
        let here = cursor.location();
        match c {
            '-' => {
                cursor.bump();
                if cursor.peek() == Some('-') {
                    skip_line(&mut cursor);
                    current.push('\n');
                } else {
                    start.get_or_insert(here);
                    current.push('-');
                }
            }
            '#' => {
                skip_line(&mut cursor);
                current.push('\n');
            }
            '/' => {
                cursor.bump();
                if cursor.peek() == Some('*') {
                    cursor.bump();
                    let comment = read_block_comment(&mut cursor, origin, here)?;
                    current.push(' ');
                    if let Some(body) = executable_comment_body(&comment) {
                        if !body.trim().is_empty() {
                            start.get_or_insert(here);
                            current.push_str(body.trim());
                            current.push(' ');
                        }
                    }
                } else {
                    start.get_or_insert(here);
                    current.push('/');
                }
            }
            '\'' | '"' | '`' => {
                start.get_or_insert(here);
                copy_quoted(&mut cursor, &mut current, origin, here)?;
            }
            ';' => {
                cursor.bump();
                if let Some(location) = start.take() {
                    statements.push(RawStatement {
                        text: std::mem::take(&mut current),
                        start: location,
                        terminated: true,
                    });
                }
                current.clear();
            }
            _ => {
                cursor.bump();
                if !c.is_whitespace() {
                    start.get_or_insert(here);
                }
                current.push(c);
            }
        }
    }

    if let Some(location) = start {
        statements.push(RawStatement {
            text: current,
            start: location,
            terminated: false,
        });
    }

    Ok(statements)
}

fn skip_line(cursor: &mut Cursor<'_>) {
    while let Some(c) = cursor.bump() {
        if c == '\n' {
            break;
        }
    }
}

/// Text between `/*` and `*/`, the opening delimiter already consumed.
fn read_block_comment(cursor: &mut Cursor<'_>, origin: &str, opened_at: SourceLocation) -> Result<String> {
    let mut body = String::new();
    while let Some(c) = cursor.bump() {
        if c == '/' && body.ends_with('*') {
            body.pop();
            return Ok(body);
        }
        body.push(c);
    }
    Err(SchemaCheckError::parse(origin, opened_at, "unterminated block comment"))
}

fn copy_quoted(cursor: &mut Cursor<'_>, out: &mut String, origin: &str, opened_at: SourceLocation) -> Result<()> {
    let quote = match cursor.bump() {
        Some(q) => q,
        None => return Ok(()),
    };
    out.push(quote);

    while let Some(c) = cursor.bump() {
        out.push(c);
        if c == '\\' && quote != '`' {
            if let Some(escaped) = cursor.bump() {
                out.push(escaped);
            }
            continue;
        }
        if c == quote {
            // doubled quote is an escaped quote
            if cursor.peek() == Some(quote) {
                if let Some(doubled) = cursor.bump() {
                    out.push(doubled);
                }
                continue;
            }
            return Ok(());
        }
    }

    Err(SchemaCheckError::parse(
        origin,
        opened_at,
        format!("unterminated quoted text starting with {}", quote),
    ))
}

fn starts_with_create_table(text: &str) -> bool {
    let mut words = text.split_whitespace();
    matches!(
        (words.next(), words.next()),
        (Some(a), Some(b)) if a.eq_ignore_ascii_case("CREATE") && b.eq_ignore_ascii_case("TABLE")
    )
}

fn table_name(text: &str) -> Option<String> {
    let rest = text.split_whitespace().skip(2).collect::<Vec<_>>().join(" ");
    let mut rest = rest.as_str();

    if let Some(stripped) = strip_prefix_ignore_case(rest, "IF NOT EXISTS") {
        rest = stripped.trim_start();
    }

    if let Some(quoted) = rest.strip_prefix('`') {
        let end = quoted.find('`')?;
        let name = &quoted[..end];
        return (!name.is_empty()).then(|| name.to_string());
    }

    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    (!name.is_empty()).then_some(name)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

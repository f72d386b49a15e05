use std::fmt;
use super::statement::{
    ColumnDef, CreateTable, DataType, DefaultValue, IndexColumn, IndexDef, IndexKind, Nullability,
    TableOption,
};
use super::tokenizer::{quote_string, render_lexemes, tokenize, Lexeme};
use crate::error::{Result, SchemaCheckError, SourceLocation};

/// Where a statement comes from. Only used to label errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOrigin {
    Reference,
    Live,
}

impl fmt::Display for StatementOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOrigin::Reference => write!(f, "reference schema"),
            StatementOrigin::Live => write!(f, "live schema"),
        }
    }
}

const TIMESTAMP_FUNCTIONS: &[&str] = &["current_timestamp", "now", "localtimestamp", "localtime"];

const CONSTRAINT_KEYWORDS: &[&str] = &[
    "CONSTRAINT", "FOREIGN", "KEY", "REFERENCES", "ON", "DELETE", "UPDATE", "CASCADE", "SET",
    "NULL", "RESTRICT", "NO", "ACTION", "DEFAULT", "MATCH", "FULL", "PARTIAL", "SIMPLE", "CHECK",
    "NOT", "ENFORCED", "AND", "OR", "IN", "IS", "LIKE", "BETWEEN",
];

const PARTITION_KEYWORDS: &[&str] = &[
    "PARTITION", "PARTITIONS", "SUBPARTITION", "SUBPARTITIONS", "BY", "LINEAR", "HASH", "KEY",
    "RANGE", "LIST", "COLUMNS", "ALGORITHM", "VALUES", "LESS", "THAN", "MAXVALUE", "IN", "ENGINE",
    "COMMENT", "DATA", "INDEX", "DIRECTORY", "MAX_ROWS", "MIN_ROWS", "TABLESPACE", "STORAGE",
    "DEFAULT", "NULL",
];

pub fn parse_create_table(sql: &str, origin: StatementOrigin) -> Result<CreateTable> {
    let label = origin.to_string();
    let lexemes = tokenize(sql, &label)?;
    Parser::new(lexemes, label).parse()
}

struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
    origin: String,
}

impl Parser {
    fn new(lexemes: Vec<Lexeme>, origin: String) -> Self {
        Self { lexemes, pos: 0, origin }
    }

    fn error(&self, message: impl Into<String>) -> SchemaCheckError {
        let message = match self.lexemes.get(self.pos) {
            Some(lexeme) => format!("{} near '{}'", message.into(), lexeme.render()),
            None => format!("{} at end of statement", message.into()),
        };
        SchemaCheckError::parse(self.origin.clone(), SourceLocation::start(), message)
    }

    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn next(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.pos).cloned();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn eat_word(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|l| l.is_word(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, keyword: &str) -> Result<()> {
        if self.eat_word(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", keyword)))
        }
    }

    fn parse(mut self) -> Result<CreateTable> {
        self.expect_word("CREATE")?;
        self.eat_word("TEMPORARY");
        self.expect_word("TABLE")?;
        if self.eat_word("IF") {
            self.expect_word("NOT")?;
            self.expect_word("EXISTS")?;
        }

        let mut name = self.next_name()?;
        while self.peek() == Some(&Lexeme::Period) {
            self.pos += 1;
            name = self.next_name()?;
        }

        let mut table = CreateTable::new(name);

        if self.next() != Some(Lexeme::LParen) {
            return Err(self.error(format!("expected '(' after table name `{}`", table.name)));
        }

        for item in self.body_items()? {
            parse_item(&item, &mut table).map_err(|message| {
                SchemaCheckError::parse(
                    self.origin.clone(),
                    SourceLocation::start(),
                    format!("table `{}`: {}", table.name, message),
                )
            })?;
        }

        let rest = self.lexemes[self.pos..].to_vec();
        table.options = parse_table_options(&rest);

        Ok(table)
    }

    fn next_name(&mut self) -> Result<String> {
        match self.next() {
            Some(Lexeme::Ident(name)) | Some(Lexeme::Word(name)) => Ok(name),
            _ => Err(self.error("expected table name")),
        }
    }

    /// Splits the parenthesized body on top-level commas. Empty items
    /// (a dangling comma before `)`) are dropped.
    fn body_items(&mut self) -> Result<Vec<Vec<Lexeme>>> {
        let mut items = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;

        loop {
            let lexeme = self
                .next()
                .ok_or_else(|| self.error("unbalanced parentheses in table body"))?;
            match lexeme {
                Lexeme::LParen => {
                    depth += 1;
                    current.push(lexeme);
                }
                Lexeme::RParen if depth == 0 => {
                    if !current.is_empty() {
                        items.push(current);
                    }
                    return Ok(items);
                }
                Lexeme::RParen => {
                    depth -= 1;
                    current.push(lexeme);
                }
                Lexeme::Comma if depth == 0 => {
                    if !current.is_empty() {
                        items.push(std::mem::take(&mut current));
                    }
                }
                other => current.push(other),
            }
        }
    }
}

/// Cursor over the lexemes of a single body item.
struct Item<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
}

impl<'a> Item<'a> {
    fn new(lexemes: &'a [Lexeme]) -> Self {
        Self { lexemes, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Lexeme> {
        self.lexemes.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.lexemes.get(self.pos);
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn eat_word(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|l| l.is_word(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat(&mut self, lexeme: &Lexeme) -> bool {
        if self.peek() == Some(lexeme) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a balanced `( ... )` group, returning its inner lexemes.
    fn group(&mut self) -> std::result::Result<&'a [Lexeme], String> {
        if !self.eat(&Lexeme::LParen) {
            return Err("expected '('".to_string());
        }
        let lexemes = self.lexemes;
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(lexeme) = self.next() {
            match lexeme {
                Lexeme::LParen => depth += 1,
                Lexeme::RParen if depth == 0 => return Ok(&lexemes[start..self.pos - 1]),
                Lexeme::RParen => depth -= 1,
                _ => {}
            }
        }
        Err("unbalanced parentheses".to_string())
    }

    /// Next lexeme, or a whole parenthesized group, as source-like text.
    fn next_clause(&mut self) -> Option<Vec<Lexeme>> {
        match self.peek()? {
            Lexeme::LParen => {
                let inner = self.group().ok()?;
                let mut clause = vec![Lexeme::LParen];
                clause.extend_from_slice(inner);
                clause.push(Lexeme::RParen);
                Some(clause)
            }
            _ => self.next().map(|l| vec![l.clone()]),
        }
    }

    fn value_text(&mut self) -> Option<String> {
        match self.next()? {
            Lexeme::Word(v) | Lexeme::Ident(v) | Lexeme::Str(v) | Lexeme::Number(v) => Some(v.clone()),
            other => Some(other.render()),
        }
    }
}

fn parse_item(lexemes: &[Lexeme], table: &mut CreateTable) -> std::result::Result<(), String> {
    let first = &lexemes[0];
    let keyword = match first {
        Lexeme::Word(w) => w.to_ascii_uppercase(),
        _ => String::new(),
    };

    match keyword.as_str() {
        "PRIMARY" | "UNIQUE" | "FULLTEXT" | "SPATIAL" | "KEY" | "INDEX" => {
            let index = parse_index(&mut Item::new(lexemes), None)?;
            table.indexes.push(index);
        }
        "CONSTRAINT" => {
            let mut item = Item::new(lexemes);
            item.next();
            let symbol = match item.peek() {
                Some(l) if !l.is_word("PRIMARY") && !l.is_word("UNIQUE") && !l.is_word("FOREIGN") && !l.is_word("CHECK") => {
                    item.next().and_then(|l| l.as_name()).map(|s| s.to_string())
                }
                _ => None,
            };
            if item.peek().is_some_and(|l| l.is_word("PRIMARY") || l.is_word("UNIQUE")) {
                let index = parse_index(&mut item, symbol)?;
                table.indexes.push(index);
            } else {
                table.constraints.push(render_constraint(lexemes));
            }
        }
        "FOREIGN" | "CHECK" => table.constraints.push(render_constraint(lexemes)),
        _ => {
            let (column, inline_index) = parse_column(lexemes)?;
            if let Some(kind) = inline_index {
                let name = (kind != IndexKind::Primary).then(|| column.name.clone());
                table
                    .indexes
                    .push(IndexDef::new(kind, name, vec![IndexColumn::named(column.name.clone())]));
            }
            table.columns.push(column);
        }
    }

    Ok(())
}

fn parse_column(lexemes: &[Lexeme]) -> std::result::Result<(ColumnDef, Option<IndexKind>), String> {
    let mut item = Item::new(lexemes);
    let name = item
        .next()
        .and_then(|l| l.as_name())
        .ok_or_else(|| "expected column name".to_string())?
        .to_string();

    let type_name = match item.next() {
        Some(Lexeme::Word(w)) => w.to_ascii_lowercase(),
        _ => return Err(format!("column `{}` has no data type", name)),
    };
    if type_name == "double" {
        item.eat_word("PRECISION");
    }

    let mut data_type = DataType::new(type_name);
    if item.peek() == Some(&Lexeme::LParen) {
        let args = item.group()?;
        data_type = data_type.with_args(type_args(args));
    }

    let mut column = ColumnDef::new(name, data_type);
    let mut inline_index = None;
    let mut pending: Vec<Lexeme> = Vec::new();

    while let Some(lexeme) = item.peek() {
        let known = match lexeme {
            Lexeme::Word(w) => w.to_ascii_uppercase(),
            _ => String::new(),
        };

        let recognized = match known.as_str() {
            "UNSIGNED" => {
                item.next();
                column.unsigned = true;
                true
            }
            "SIGNED" => {
                item.next();
                true
            }
            "ZEROFILL" => {
                item.next();
                column.zerofill = true;
                true
            }
            "CHARSET" => {
                item.next();
                column.charset = item.value_text().map(|v| v.to_ascii_lowercase());
                true
            }
            "CHARACTER" if item.peek_at(1).is_some_and(|l| l.is_word("SET")) => {
                item.next();
                item.next();
                column.charset = item.value_text().map(|v| v.to_ascii_lowercase());
                true
            }
            "COLLATE" => {
                item.next();
                column.collation = item.value_text().map(|v| v.to_ascii_lowercase());
                true
            }
            "NOT" if item.peek_at(1).is_some_and(|l| l.is_word("NULL")) => {
                item.next();
                item.next();
                column.nullability = Some(Nullability::NotNull);
                true
            }
            "NULL" => {
                item.next();
                column.nullability = Some(Nullability::Null);
                true
            }
            "DEFAULT" => {
                item.next();
                column.default = Some(parse_value(&mut item)?);
                true
            }
            "ON" if item.peek_at(1).is_some_and(|l| l.is_word("UPDATE")) => {
                item.next();
                item.next();
                column.on_update = Some(parse_value(&mut item)?);
                true
            }
            "AUTO_INCREMENT" => {
                item.next();
                column.auto_increment = true;
                true
            }
            "COMMENT" => {
                item.next();
                column.comment = item.value_text();
                true
            }
            "PRIMARY" | "KEY" => {
                item.next();
                item.eat_word("KEY");
                inline_index = Some(IndexKind::Primary);
                true
            }
            "UNIQUE" => {
                item.next();
                item.eat_word("KEY");
                inline_index = Some(IndexKind::Unique);
                true
            }
            _ => false,
        };

        if recognized {
            flush_pending(&mut pending, &mut column.extra);
        } else if let Some(clause) = item.next_clause() {
            pending.extend(clause);
        } else {
            return Err(format!("unbalanced clause in column `{}`", column.name));
        }
    }
    flush_pending(&mut pending, &mut column.extra);

    Ok((column, inline_index))
}

fn flush_pending(pending: &mut Vec<Lexeme>, extra: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let upper: Vec<Lexeme> = pending.drain(..).map(uppercase_keyword).collect();
    extra.push(render_lexemes(&upper));
}

fn uppercase_keyword(lexeme: Lexeme) -> Lexeme {
    match lexeme {
        Lexeme::Word(w) => Lexeme::Word(w.to_ascii_uppercase()),
        other => other,
    }
}

fn type_args(args: &[Lexeme]) -> Vec<String> {
    let mut values = Vec::new();
    let mut negative = false;
    for lexeme in args {
        match lexeme {
            Lexeme::Comma => {}
            Lexeme::Minus => negative = true,
            Lexeme::Number(n) if negative => {
                values.push(format!("-{}", n));
                negative = false;
            }
            Lexeme::Str(s) => values.push(quote_string(s)),
            other => values.push(other.render()),
        }
    }
    values
}

fn parse_value(item: &mut Item<'_>) -> std::result::Result<DefaultValue, String> {
    let lexeme = item.next().ok_or_else(|| "missing value after DEFAULT".to_string())?;
    let value = match lexeme {
        Lexeme::Word(w) if w.eq_ignore_ascii_case("NULL") => DefaultValue::Null,
        Lexeme::Number(n) => DefaultValue::Number(n.clone()),
        Lexeme::Minus => match item.next() {
            Some(Lexeme::Number(n)) => DefaultValue::Number(format!("-{}", n)),
            _ => return Err("expected number after '-'".to_string()),
        },
        Lexeme::Str(s) => DefaultValue::Str(s.clone()),
        Lexeme::Word(w) => {
            let call_args = if item.peek() == Some(&Lexeme::LParen) {
                Some(item.group()?)
            } else {
                None
            };
            if TIMESTAMP_FUNCTIONS.contains(&w.to_ascii_lowercase().as_str()) {
                let precision = call_args
                    .and_then(|args| args.first())
                    .and_then(|l| match l {
                        Lexeme::Number(n) => Some(n.clone()),
                        _ => None,
                    });
                DefaultValue::CurrentTimestamp(precision)
            } else {
                let mut rendered = vec![Lexeme::Word(w.to_ascii_uppercase())];
                if let Some(args) = call_args {
                    rendered.push(Lexeme::LParen);
                    rendered.extend_from_slice(args);
                    rendered.push(Lexeme::RParen);
                }
                DefaultValue::Expression(render_lexemes(&rendered))
            }
        }
        Lexeme::LParen => {
            item.pos -= 1;
            let inner = item.group()?;
            DefaultValue::Expression(format!("({})", render_lexemes(inner)))
        }
        other => DefaultValue::Expression(other.render()),
    };
    Ok(value)
}

fn parse_index(item: &mut Item<'_>, constraint_name: Option<String>) -> std::result::Result<IndexDef, String> {
    let kind = match item.next() {
        Some(l) if l.is_word("PRIMARY") => {
            item.eat_word("KEY");
            IndexKind::Primary
        }
        Some(l) if l.is_word("UNIQUE") => IndexKind::Unique,
        Some(l) if l.is_word("FULLTEXT") => IndexKind::Fulltext,
        Some(l) if l.is_word("SPATIAL") => IndexKind::Spatial,
        Some(l) if l.is_word("KEY") || l.is_word("INDEX") => IndexKind::Plain,
        _ => return Err("expected index definition".to_string()),
    };
    if kind != IndexKind::Primary && !item.eat_word("KEY") {
        item.eat_word("INDEX");
    }

    let mut name = None;
    let mut options = Vec::new();
    if let Some(lexeme) = item.peek() {
        let is_name = match lexeme {
            Lexeme::Ident(_) => true,
            Lexeme::Word(w) => !w.eq_ignore_ascii_case("USING"),
            _ => false,
        };
        if is_name {
            name = item.next().and_then(|l| l.as_name()).map(|s| s.to_string());
        }
    }
    if item.eat_word("USING") {
        if let Some(method) = item.value_text() {
            options.push(format!("USING {}", method.to_ascii_uppercase()));
        }
    }

    let parts = item.group()?;
    let columns = index_columns(parts)?;

    let mut index = IndexDef::new(kind, name.or(constraint_name), columns);
    index.options = options;

    let mut pending: Vec<Lexeme> = Vec::new();
    while item.peek().is_some() {
        if item.eat_word("USING") {
            if let Some(method) = item.value_text() {
                index.options.push(format!("USING {}", method.to_ascii_uppercase()));
            }
        } else if item.eat_word("COMMENT") {
            index.comment = item.value_text();
        } else if item.eat_word("VISIBLE") {
            // visibility is the default
        } else if item.eat_word("KEY_BLOCK_SIZE") {
            item.eat(&Lexeme::Eq);
            if let Some(size) = item.value_text() {
                index.options.push(format!("KEY_BLOCK_SIZE={}", size));
            }
        } else if let Some(clause) = item.next_clause() {
            pending.extend(clause);
            continue;
        } else {
            return Err("unbalanced index options".to_string());
        }
        flush_pending(&mut pending, &mut index.options);
    }
    flush_pending(&mut pending, &mut index.options);

    Ok(index)
}

fn index_columns(parts: &[Lexeme]) -> std::result::Result<Vec<IndexColumn>, String> {
    let mut columns = Vec::new();
    let mut item = Item::new(parts);

    while let Some(lexeme) = item.peek() {
        match lexeme {
            Lexeme::Comma => {
                item.next();
            }
            Lexeme::LParen => {
                let inner = item.group()?;
                let mut column = IndexColumn::named(format!("({})", render_lexemes(inner)));
                column.is_expression = true;
                column.descending = order_suffix(&mut item);
                columns.push(column);
            }
            Lexeme::Ident(name) | Lexeme::Word(name) => {
                item.next();
                let mut column = IndexColumn::named(name.clone());
                if item.peek() == Some(&Lexeme::LParen) {
                    let length = item.group()?;
                    column.length = Some(render_lexemes(length));
                }
                column.descending = order_suffix(&mut item);
                columns.push(column);
            }
            other => return Err(format!("unexpected '{}' in index column list", other.render())),
        }
    }

    if columns.is_empty() {
        return Err("index without columns".to_string());
    }
    Ok(columns)
}

fn order_suffix(item: &mut Item<'_>) -> bool {
    if item.eat_word("DESC") {
        return true;
    }
    item.eat_word("ASC");
    false
}

/// Foreign keys and check constraints are compared as normalized text.
/// Referential actions equal to the engine default are dropped.
fn render_constraint(lexemes: &[Lexeme]) -> String {
    let normalized: Vec<Lexeme> = lexemes
        .iter()
        .map(|l| match l {
            Lexeme::Word(w) if CONSTRAINT_KEYWORDS.contains(&w.to_ascii_uppercase().as_str()) => {
                Lexeme::Word(w.to_ascii_uppercase())
            }
            Lexeme::Word(w) => Lexeme::Ident(w.clone()),
            other => other.clone(),
        })
        .collect();

    let mut text = render_lexemes(&normalized);
    for default_action in [
        " ON DELETE RESTRICT",
        " ON UPDATE RESTRICT",
        " ON DELETE NO ACTION",
        " ON UPDATE NO ACTION",
    ] {
        text = text.replace(default_action, "");
    }
    text
}

/// Keywords and function names are upper-cased, other bare words are
/// treated as identifiers.
fn render_trailing_clause(lexemes: &[Lexeme]) -> String {
    let normalized: Vec<Lexeme> = lexemes
        .iter()
        .enumerate()
        .map(|(i, l)| match l {
            Lexeme::Word(w)
                if PARTITION_KEYWORDS.contains(&w.to_ascii_uppercase().as_str())
                    || lexemes.get(i + 1) == Some(&Lexeme::LParen) =>
            {
                Lexeme::Word(w.to_ascii_uppercase())
            }
            Lexeme::Word(w) => Lexeme::Ident(w.clone()),
            other => other.clone(),
        })
        .collect();
    render_lexemes(&normalized)
}

fn parse_table_options(lexemes: &[Lexeme]) -> Vec<TableOption> {
    let mut options = Vec::new();
    let mut item = Item::new(lexemes);

    while let Some(lexeme) = item.peek() {
        if *lexeme == Lexeme::Comma || lexeme.is_word("DEFAULT") {
            item.next();
            continue;
        }

        let keyword = match lexeme {
            Lexeme::Word(w) => w.to_ascii_uppercase(),
            _ => String::new(),
        };

        let option = match keyword.as_str() {
            "ENGINE" | "TYPE" => {
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(TableOption::Engine)
            }
            "CHARSET" => {
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(|v| TableOption::Charset(v.to_ascii_lowercase()))
            }
            "CHARACTER" if item.peek_at(1).is_some_and(|l| l.is_word("SET")) => {
                item.next();
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(|v| TableOption::Charset(v.to_ascii_lowercase()))
            }
            "COLLATE" => {
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(|v| TableOption::Collate(v.to_ascii_lowercase()))
            }
            "ROW_FORMAT" => {
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(TableOption::RowFormat)
            }
            "AUTO_INCREMENT" => {
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(TableOption::AutoIncrement)
            }
            "COMMENT" => {
                item.next();
                item.eat(&Lexeme::Eq);
                item.value_text().map(TableOption::Comment)
            }
            _ if item.peek_at(1) == Some(&Lexeme::Eq) => {
                item.next();
                item.next();
                let value = item.next_clause().map(|c| render_lexemes(&c)).unwrap_or_default();
                Some(TableOption::Other(format!("{}={}", keyword, value)))
            }
            _ => {
                // unmodelled trailing clause (PARTITION BY ...): keep the rest verbatim
                options.push(TableOption::Trailing(render_trailing_clause(&lexemes[item.pos..])));
                break;
            }
        };

        if let Some(option) = option {
            options.push(option);
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> CreateTable {
        parse_create_table(sql, StatementOrigin::Reference).unwrap()
    }

    #[test]
    fn test_parse_columns_indexes_and_options() {
        let table = parse(
            "CREATE TABLE `glpi_items` (
              `id` int(11) unsigned NOT NULL AUTO_INCREMENT,
              `name` VARCHAR(255) CHARACTER SET utf8 COLLATE utf8_unicode_ci DEFAULT NULL COMMENT 'the name',
              PRIMARY KEY (`id`),
              UNIQUE INDEX `name` (`name`(191))
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8 COLLATE=utf8_unicode_ci AUTO_INCREMENT=15",
        );

        assert_eq!(table.name, "glpi_items");
        assert_eq!(table.columns.len(), 2);

        let id = &table.columns[0];
        assert_eq!(id.data_type, DataType::new("int").with_args(vec!["11".to_string()]));
        assert!(id.unsigned);
        assert!(id.is_not_null());
        assert!(id.auto_increment);

        let name = &table.columns[1];
        assert_eq!(name.charset.as_deref(), Some("utf8"));
        assert_eq!(name.collation.as_deref(), Some("utf8_unicode_ci"));
        assert_eq!(name.default, Some(DefaultValue::Null));
        assert_eq!(name.comment.as_deref(), Some("the name"));

        assert_eq!(table.primary_key_columns(), vec!["id"]);
        assert_eq!(table.indexes[1].kind, IndexKind::Unique);
        assert_eq!(table.indexes[1].columns[0].length.as_deref(), Some("191"));

        assert_eq!(
            table.options,
            vec![
                TableOption::Engine("InnoDB".to_string()),
                TableOption::Charset("utf8".to_string()),
                TableOption::Collate("utf8_unicode_ci".to_string()),
                TableOption::AutoIncrement("15".to_string()),
            ]
        );
    }

    #[test]
    fn test_dangling_comma_and_missing_index_name() {
        let table = parse("CREATE TABLE t (`a` text, FULLTEXT (`a`),)");
        assert_eq!(table.indexes.len(), 1);
        assert_eq!(table.indexes[0].name, None);
        assert_eq!(table.indexes[0].kind, IndexKind::Fulltext);
    }

    #[test]
    fn test_timestamp_defaults() {
        let table = parse(
            "CREATE TABLE t (`d` timestamp NOT NULL DEFAULT current_timestamp() ON UPDATE CURRENT_TIMESTAMP, `e` datetime(6) DEFAULT NOW(6))",
        );
        assert_eq!(table.columns[0].default, Some(DefaultValue::CurrentTimestamp(None)));
        assert_eq!(table.columns[0].on_update, Some(DefaultValue::CurrentTimestamp(None)));
        assert_eq!(table.columns[1].default, Some(DefaultValue::CurrentTimestamp(Some("6".to_string()))));
    }

    #[test]
    fn test_negative_and_quoted_defaults() {
        let table = parse("CREATE TABLE t (`a` float DEFAULT -0.7, `b` float DEFAULT '-0.7')");
        assert_eq!(table.columns[0].default, Some(DefaultValue::Number("-0.7".to_string())));
        assert_eq!(table.columns[1].default, Some(DefaultValue::Str("-0.7".to_string())));
    }

    #[test]
    fn test_unknown_column_clauses_are_preserved() {
        let table = parse("CREATE TABLE t (`a` int, `b` int GENERATED ALWAYS AS (`a` + 1) stored)");
        assert_eq!(table.columns[1].extra, vec!["GENERATED ALWAYS AS(`a` + 1) STORED".to_string()]);
    }

    #[test]
    fn test_inline_primary_key_is_lifted() {
        let table = parse("CREATE TABLE t (`id` int NOT NULL PRIMARY KEY, `code` varchar(10) UNIQUE)");
        assert_eq!(table.primary_key_columns(), vec!["id"]);
        assert_eq!(table.indexes[1].kind, IndexKind::Unique);
        assert_eq!(table.indexes[1].name.as_deref(), Some("code"));
    }

    #[test]
    fn test_foreign_key_constraint() {
        let table = parse(
            "CREATE TABLE t (`users_id` int, CONSTRAINT `fk_user` FOREIGN KEY (`users_id`) REFERENCES users (`id`) on delete cascade on update restrict)",
        );
        assert_eq!(
            table.constraints,
            vec!["CONSTRAINT `fk_user` FOREIGN KEY(`users_id`) REFERENCES `users`(`id`) ON DELETE CASCADE".to_string()]
        );
    }

    #[test]
    fn test_unknown_table_options_kept() {
        let table = parse("CREATE TABLE t (`a` int) ENGINE=InnoDB STATS_PERSISTENT=0 PARTITION BY HASH(`a`) PARTITIONS 4");
        assert_eq!(table.options[1], TableOption::Other("STATS_PERSISTENT=0".to_string()));
        assert_eq!(table.options[2], TableOption::Trailing("PARTITION BY HASH(`a`) PARTITIONS 4".to_string()));
    }

    #[test]
    fn test_trailing_clause_quotes_bare_identifiers() {
        let quoted = parse("CREATE TABLE t (`d` date) PARTITION BY RANGE (YEAR(`d`)) (PARTITION p0 VALUES LESS THAN (2020))");
        let bare = parse("CREATE TABLE t (`d` date) partition by range (year(d)) (partition `p0` values less than (2020))");
        assert_eq!(quoted.options, bare.options);
        assert_eq!(
            quoted.options[0],
            TableOption::Trailing("PARTITION BY RANGE(YEAR(`d`)) (PARTITION `p0` VALUES LESS THAN(2020))".to_string())
        );
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let err = parse_create_table("CREATE TABLE t", StatementOrigin::Live).unwrap_err();
        assert!(err.to_string().contains("live schema"));
    }

    #[test]
    fn test_column_without_type_is_an_error() {
        assert!(parse_create_table("CREATE TABLE t (`a`)", StatementOrigin::Reference).is_err());
    }
}

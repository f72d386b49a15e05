use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};
use crate::error::{Result, SchemaCheckError, SourceLocation};

/// Significant token of a DDL statement. Whitespace and comments are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Word(String),
    /// Backtick-quoted identifier, quotes removed.
    Ident(String),
    /// String literal, quotes removed and escapes resolved.
    Str(String),
    Number(String),
    LParen,
    RParen,
    Comma,
    Eq,
    Minus,
    Period,
    Other(String),
}

impl Lexeme {
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Lexeme::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// Identifier text of a quoted or bare word.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Lexeme::Word(w) | Lexeme::Ident(w) => Some(w),
            _ => None,
        }
    }

    /// Source-like rendering, used when a clause is preserved verbatim.
    pub fn render(&self) -> String {
        match self {
            Lexeme::Word(w) => w.clone(),
            Lexeme::Ident(w) => quote_ident(w),
            Lexeme::Str(s) => quote_string(s),
            Lexeme::Number(n) => n.clone(),
            Lexeme::LParen => "(".to_string(),
            Lexeme::RParen => ")".to_string(),
            Lexeme::Comma => ",".to_string(),
            Lexeme::Eq => "=".to_string(),
            Lexeme::Minus => "-".to_string(),
            Lexeme::Period => ".".to_string(),
            Lexeme::Other(o) => o.clone(),
        }
    }
}

pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Backtick-quotes an identifier, doubling any embedded backtick.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Body of a MySQL executable comment (`/*! ... */`, `/*!50100 ... */`),
/// given the text between `/*` and `*/`. The version number is dropped.
pub fn executable_comment_body(comment: &str) -> Option<&str> {
    let body = comment.strip_prefix('!')?;
    Some(body.trim_start_matches(|c: char| c.is_ascii_digit()))
}

/// Joins lexemes with single spaces, except around parentheses, commas and
/// periods.
pub fn render_lexemes(lexemes: &[Lexeme]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Lexeme> = None;

    for lexeme in lexemes {
        let glue = match (previous, lexeme) {
            (None, _) => false,
            (Some(Lexeme::LParen), _) | (Some(Lexeme::Period), _) => false,
            (_, Lexeme::RParen) | (_, Lexeme::Comma) | (_, Lexeme::Period) => false,
            (Some(Lexeme::Word(_)), Lexeme::LParen) => false,
            (Some(Lexeme::Ident(_)), Lexeme::LParen) => false,
            (Some(Lexeme::Comma), _) => false,
            _ => true,
        };
        if glue {
            out.push(' ');
        }
        out.push_str(&lexeme.render());
        previous = Some(lexeme);
    }

    out
}

pub fn tokenize(sql: &str, origin: &str) -> Result<Vec<Lexeme>> {
    let dialect = MySqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|e| SchemaCheckError::parse(origin, SourceLocation::start(), e.to_string()))?;

    let mut lexemes = Vec::with_capacity(tokens.len());
    for token in tokens {
        let lexeme = match token {
            Token::Whitespace(Whitespace::MultiLineComment(comment)) => {
                // executable comments are part of the statement
                if let Some(body) = executable_comment_body(&comment) {
                    lexemes.extend(tokenize(body, origin)?);
                }
                continue;
            }
            Token::Whitespace(_) | Token::EOF | Token::SemiColon => continue,
            Token::Word(w) if w.quote_style.is_some() => Lexeme::Ident(w.value),
            Token::Word(w) => Lexeme::Word(w.value),
            Token::Number(n, _) => Lexeme::Number(n),
            Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => Lexeme::Str(s),
            Token::LParen => Lexeme::LParen,
            Token::RParen => Lexeme::RParen,
            Token::Comma => Lexeme::Comma,
            Token::Eq => Lexeme::Eq,
            Token::Minus => Lexeme::Minus,
            Token::Period => Lexeme::Period,
            other => Lexeme::Other(other.to_string()),
        };
        lexemes.push(lexeme);
    }

    Ok(lexemes)
}

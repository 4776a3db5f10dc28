//! Expression text split into verbatim text and variable references
//!
//! Expressions are kept as authored. Only identifier tokens are lifted out as
//! references so that they can be resolved and later rewritten; operators,
//! numbers (including unit suffixes like `10px`) and quoted strings pass
//! through untouched. Text that does not lex, such as an unterminated quote or
//! a number with an unknown unit, is an error rather than verbatim text.

use std::fmt;
use std::ops::Range;

use logos::Logos;
use thiserror::Error;

/// Unit suffixes a number may carry, e.g. `10px` or `50%`
pub const UNITS: &[&str] = &[
    "px", "em", "rem", "pt", "pc", "cm", "mm", "in", "deg", "rad", "turn", "vw", "vh", "%",
];

/// Errors raised while tokenizing an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// Not a finite number, or a unit outside [`UNITS`]
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },
}

// Every pattern accepts each of its prefixes, except quoted strings where a
// missing closing quote is an error anyway.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token(".")]
    Dot,

    #[regex(r"[0-9][0-9A-Za-z_.%]*([eE][+-][0-9][0-9A-Za-z_.%]*)?", |lex| is_number(lex.slice()))]
    Number,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Quoted,

    #[regex(r"[-+*/%^(),?:<>=!&|]")]
    Operator,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// Split a trailing unit off `text`: `("10", "px")`, or `(text, "")` without one
pub(crate) fn split_unit(text: &str) -> (&str, &str) {
    UNITS
        .iter()
        .filter_map(|unit| Some((text.strip_suffix(unit)?, *unit)))
        .max_by_key(|(_, unit)| unit.len())
        .unwrap_or((text, ""))
}

/// Unsigned finite number with an optional known unit
fn is_number(text: &str) -> bool {
    let (number, _) = split_unit(text);
    number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && number.parse::<f64>().is_ok_and(f64::is_finite)
}

fn lex_error(source: &str, span: Range<usize>) -> ExprError {
    let offset = span.start;
    match source[offset..].chars().next() {
        Some('"' | '\'') => ExprError::UnterminatedString { offset },
        Some(c) if c.is_ascii_digit() => ExprError::InvalidNumber {
            text: source.get(span).unwrap_or_default().to_string(),
            offset,
        },
        found => ExprError::UnexpectedCharacter {
            found: found.unwrap_or_default(),
            offset,
        },
    }
}

/// One piece of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim text: operators, whitespace, numbers, quoted strings
    Text(String),
    /// A variable reference, either a short name (`width`) or a dotted path (`box.right`)
    Ref(String),
}

/// An expression over named quantities, e.g. `box.x + box.width`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expr {
    segments: Vec<Segment>,
}

impl Expr {
    /// Create an empty expression, to be filled with [`Expr::with_ref`] and [`Expr::with_text`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize authored expression text
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let mut tokens = Vec::new();
        let mut lexer = Token::lexer(source);
        while let Some(token) = lexer.next() {
            match token {
                Ok(token) => tokens.push((token, lexer.span())),
                Err(()) => return Err(lex_error(source, lexer.span())),
            }
        }

        let mut expr = Expr::new();
        let mut i = 0;
        while i < tokens.len() {
            let (token, span) = &tokens[i];
            if *token == Token::Ident {
                // `a.b.c` is one reference; a trailing dot is not part of it
                let mut end = span.end;
                while let [(Token::Dot, _), (Token::Ident, next), ..] = &tokens[i + 1..] {
                    end = next.end;
                    i += 2;
                }
                expr.push_ref(source[span.start..end].to_string());
            } else {
                expr.push_text(&source[span.clone()]);
            }
            i += 1;
        }

        Ok(expr)
    }

    /// Append a reference
    pub fn with_ref(mut self, name: impl Into<String>) -> Self {
        self.push_ref(name.into());
        self
    }

    /// Append verbatim text
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All references in order of appearance (duplicates included)
    pub fn refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Ref(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render the expression with every reference replaced by `rename(reference)`
    pub fn rewrite<F>(&self, mut rename: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        let renamed: Result<String, std::convert::Infallible> =
            self.try_rewrite(|name| Ok(rename(name)));
        match renamed {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }

    /// Like [`Expr::rewrite`], stopping at the first reference `rename` rejects
    pub fn try_rewrite<F, E>(&self, mut rename: F) -> Result<String, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Ref(name) => out.push_str(&rename(name)?),
            }
        }
        Ok(out)
    }

    fn push_ref(&mut self, name: String) {
        self.segments.push(Segment::Ref(name));
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Ref(text) => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

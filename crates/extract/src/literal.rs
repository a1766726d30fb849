//! Strict parser for the literal-expression subset generator responses use
//! for their "dictionaries": dicts, lists, tuples, sets, quoted strings,
//! numbers, `True`/`False`/`None`.
//!
//! Bare identifiers are rejected, so `{fish: [hg]}` is a parse failure and
//! is left to the fallback heuristics.

use crate::error::ExtractError;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    /// Numeric literal kept as written.
    Number(String),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    /// Key/value pairs in source order, duplicates included.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Parse `text` as a single literal. Surrounding whitespace is allowed,
/// anything else after the value is an error.
pub fn parse_literal(text: &str) -> Result<Literal, ExtractError> {
    let mut parser = Parser { src: text, pos: 0 };
    parser.skip_trivia();
    let value = parser.parse_value(0)?;
    parser.skip_trivia();
    if parser.pos < parser.src.len() {
        return Err(parser.error("unexpected trailing text"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ExtractError {
        ExtractError::LiteralParseFailure {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                // explicit line continuation
                Some('\\') if self.peek_nth(1) == Some('\n') => {
                    self.pos += 2;
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Literal, ExtractError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }

        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.parse_brace(depth),
            Some('[') => {
                self.bump();
                let items = self.parse_sequence(']', depth)?;
                Ok(Literal::List(items))
            }
            Some('(') => self.parse_paren(depth),
            Some('\'') | Some('"') => self.parse_strings(),
            Some(c) if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                if self.at_string_start() {
                    return self.parse_strings();
                }
                let start = self.pos;
                let ident = self.take_identifier();
                match ident {
                    "True" => Ok(Literal::Bool(true)),
                    "False" => Ok(Literal::Bool(false)),
                    "None" => Ok(Literal::None),
                    other => Err(ExtractError::LiteralParseFailure {
                        offset: start,
                        message: format!("unexpected name '{}'", other),
                    }),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    fn take_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    /// Items up to `close`, comma separated, trailing comma allowed.
    fn parse_sequence(&mut self, close: char, depth: usize) -> Result<Vec<Literal>, ExtractError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                _ => return Err(self.error(format!("expected ',' or '{}'", close))),
            }
        }
    }

    fn parse_brace(&mut self, depth: usize) -> Result<Literal, ExtractError> {
        self.bump();
        self.skip_trivia();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Literal::Dict(Vec::new()));
        }

        let first = self.parse_value(depth + 1)?;
        self.skip_trivia();
        if self.peek() != Some(':') {
            // set display
            let mut items = vec![first];
            match self.peek() {
                Some(',') => {
                    self.bump();
                    items.extend(self.parse_sequence('}', depth)?);
                }
                Some('}') => {
                    self.bump();
                }
                _ => return Err(self.error("expected ':', ',' or '}'")),
            }
            return Ok(Literal::Set(items));
        }

        let mut pairs = Vec::new();
        let mut key = first;
        loop {
            // at ':'
            self.bump();
            self.skip_trivia();
            let value = self.parse_value(depth + 1)?;
            pairs.push((key, value));

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    self.skip_trivia();
                    if self.peek() == Some('}') {
                        self.bump();
                        return Ok(Literal::Dict(pairs));
                    }
                }
                Some('}') => {
                    self.bump();
                    return Ok(Literal::Dict(pairs));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }

            key = self.parse_value(depth + 1)?;
            self.skip_trivia();
            if self.peek() != Some(':') {
                return Err(self.error("expected ':' after dict key"));
            }
        }
    }

    fn parse_paren(&mut self, depth: usize) -> Result<Literal, ExtractError> {
        self.bump();
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Literal::Tuple(Vec::new()));
        }

        let first = self.parse_value(depth + 1)?;
        self.skip_trivia();
        match self.peek() {
            // parenthesised expression, not a tuple
            Some(')') => {
                self.bump();
                Ok(first)
            }
            Some(',') => {
                self.bump();
                let mut items = vec![first];
                items.extend(self.parse_sequence(')', depth)?);
                Ok(Literal::Tuple(items))
            }
            _ => Err(self.error("expected ',' or ')'")),
        }
    }

    fn at_string_start(&self) -> bool {
        let rest = self.rest();
        let prefix_len = rest
            .chars()
            .take_while(|c| matches!(c, 'r' | 'R' | 'u' | 'U'))
            .count();
        if prefix_len > 1 {
            return false;
        }
        matches!(rest[prefix_len..].chars().next(), Some('\'') | Some('"'))
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> Result<Literal, ExtractError> {
        let mut out = self.parse_string()?;
        loop {
            let before = self.pos;
            self.skip_trivia();
            if self.at_string_start() {
                out.push_str(&self.parse_string()?);
            } else {
                self.pos = before;
                return Ok(Literal::Str(out));
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ExtractError> {
        let mut raw = false;
        while let Some(c) = self.peek() {
            match c {
                'r' | 'R' => {
                    raw = true;
                    self.bump();
                }
                'u' | 'U' => {
                    self.bump();
                }
                _ => break,
            }
        }

        let start = self.pos;
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected string")),
        };
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.pos += 2 * quote.len_utf8();
        }

        let mut out = String::new();
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => {
                    return Err(ExtractError::LiteralParseFailure {
                        offset: start,
                        message: "unterminated string".to_string(),
                    });
                }
            };

            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                    self.pos += 2 * quote.len_utf8();
                    return Ok(out);
                }
                out.push(c);
                continue;
            }

            if c == '\n' && !triple {
                return Err(self.error("newline in single-quoted string"));
            }

            if c != '\\' {
                out.push(c);
                continue;
            }

            let escaped = match self.bump() {
                Some(e) => e,
                None => return Err(self.error("unterminated escape")),
            };
            if raw {
                out.push('\\');
                out.push(escaped);
                continue;
            }
            match escaped {
                '\n' => {}
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0c}'),
                'v' => out.push('\u{0b}'),
                '0' => out.push('\0'),
                '\\' | '\'' | '"' => out.push(escaped),
                'x' => out.push(self.hex_escape(2)?),
                'u' => out.push(self.hex_escape(4)?),
                'U' => out.push(self.hex_escape(8)?),
                other => {
                    // unknown escapes are kept verbatim
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, ExtractError> {
        let rest = self.rest();
        let hex = rest.get(..digits).filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()));
        let Some(hex) = hex else {
            return Err(self.error("truncated escape sequence"));
        };
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("bad escape sequence"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("escape is not a valid character"))?;
        self.pos += digits;
        Ok(c)
    }

    fn parse_number(&mut self) -> Result<Literal, ExtractError> {
        let start = self.pos;
        let mut negative = false;
        while let Some(c @ ('-' | '+')) = self.peek() {
            if c == '-' {
                negative = !negative;
            }
            self.bump();
            self.skip_trivia();
        }

        let body_start = self.pos;
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-') && matches!(prev, 'e' | 'E');
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                prev = c;
                self.bump();
            } else {
                break;
            }
        }
        let body = &self.src[body_start..self.pos];

        if !is_numeric_body(body) {
            return Err(ExtractError::LiteralParseFailure {
                offset: start,
                message: format!("invalid number '{}'", &self.src[start..self.pos]),
            });
        }

        let text = if negative {
            format!("-{}", body)
        } else {
            body.to_string()
        };
        Ok(Literal::Number(text))
    }
}

fn is_numeric_body(body: &str) -> bool {
    let body = body.trim_end_matches(['j', 'J']);
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') {
        return false;
    }
    let cleaned: String = body.chars().filter(|c| *c != '_').collect();

    let lower = cleaned.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &lower[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    let starts_ok = cleaned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    starts_ok && cleaned != "." && cleaned.parse::<f64>().is_ok()
}

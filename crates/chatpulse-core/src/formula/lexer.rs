//! Lexer: tokenizes formula expressions
//!
//! Positions are 1-based character offsets into the expression.

use super::error::{FormulaError, FormulaResult};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw text of the token
    pub text: String,
    /// Character offset of the first character (1-based)
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }
}

/// Token types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Literals and names
    Number,
    Identifier,
    True,
    False,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    Gt,
    Gte,
    Lt,
    Lte,
    EqEq,
    NotEq,

    // Logical (`&&`/`and`, `||`/`or`)
    And,
    Or,

    OpenParen,
    CloseParen,

    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Identifier => write!(f, "identifier"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Classify a word as a keyword, if it is one
///
/// `and`/`or` are case-insensitive; `true`/`false` are lowercase only.
pub fn keyword(word: &str) -> Option<TokenKind> {
    match word {
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        w if w.eq_ignore_ascii_case("and") => Some(TokenKind::And),
        w if w.eq_ignore_ascii_case("or") => Some(TokenKind::Or),
        _ => None,
    }
}

/// An identifier occurrence: char range `[start, end)` (0-based) and its text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentSpan {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

/// Every non-keyword identifier in the expression, in textual order
///
/// Tolerant of characters the lexer would reject, so it also works on
/// malformed input. Digits that start a number never begin an identifier.
pub fn identifier_spans(input: &str) -> Vec<IdentSpan> {
    let chars: Vec<char> = input.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            if keyword(&name).is_none() {
                spans.push(IdentSpan {
                    start,
                    end: i,
                    name,
                });
            }
        } else if ch.is_ascii_digit() {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                i += 1;
            }
        } else {
            i += 1;
        }
    }

    spans
}

/// Lexer for formula expressions
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.pos + 1));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> FormulaResult<Token> {
        let ch = self.input[self.pos];
        let pos = self.pos + 1;

        let two = |kind: TokenKind, text: &str| (kind, text.to_string(), 2);
        let one = |kind: TokenKind| (kind, ch.to_string(), 1);

        let (kind, text, width) = match (ch, self.peek_at(1)) {
            ('>', Some('=')) => two(TokenKind::Gte, ">="),
            ('<', Some('=')) => two(TokenKind::Lte, "<="),
            ('=', Some('=')) => two(TokenKind::EqEq, "=="),
            ('!', Some('=')) => two(TokenKind::NotEq, "!="),
            ('&', Some('&')) => two(TokenKind::And, "&&"),
            ('|', Some('|')) => two(TokenKind::Or, "||"),
            ('>', _) => one(TokenKind::Gt),
            ('<', _) => one(TokenKind::Lt),
            ('+', _) => one(TokenKind::Plus),
            ('-', _) => one(TokenKind::Minus),
            ('*', _) => one(TokenKind::Star),
            ('/', _) => one(TokenKind::Slash),
            ('%', _) => one(TokenKind::Percent),
            ('(', _) => one(TokenKind::OpenParen),
            (')', _) => one(TokenKind::CloseParen),
            (c, _) if c.is_ascii_digit() || c == '.' => return self.read_number(),
            (c, _) if c.is_ascii_alphabetic() || c == '_' => return Ok(self.read_word()),
            _ => {
                return Err(FormulaError::Parse {
                    position: pos,
                    message: format!("Unexpected character: '{}'", ch),
                })
            }
        };

        self.pos += width;
        Ok(Token::new(kind, text, pos))
    }

    fn read_number(&mut self) -> FormulaResult<Token> {
        let pos = self.pos + 1;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_digit() || self.input[self.pos] == '.')
        {
            text.push(self.input[self.pos]);
            self.pos += 1;
        }

        if text.parse::<f64>().is_err() {
            return Err(FormulaError::Parse {
                position: pos,
                message: format!("Invalid number: '{}'", text),
            });
        }
        if matches!(self.input.get(self.pos), Some(c) if c.is_ascii_alphabetic() || *c == '_') {
            return Err(FormulaError::Parse {
                position: self.pos + 1,
                message: format!("Unexpected character after number '{}'", text),
            });
        }

        Ok(Token::new(TokenKind::Number, text, pos))
    }

    fn read_word(&mut self) -> Token {
        let pos = self.pos + 1;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_alphanumeric() || self.input[self.pos] == '_')
        {
            text.push(self.input[self.pos]);
            self.pos += 1;
        }

        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, pos)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}

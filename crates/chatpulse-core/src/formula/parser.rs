//! Parser: recursive descent parser for formula expressions
//!
//! Precedence, lowest first: `||`, `&&`, comparisons, `+ -`, `* / %`,
//! unary `-`. All binary operators are left-associative.

use super::error::{FormulaError, FormulaResult};
use super::eval::Value;
use super::lexer::{Lexer, Token, TokenKind};

/// Binary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinaryOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Sub,
            TokenKind::Star => Self::Mul,
            TokenKind::Slash => Self::Div,
            TokenKind::Percent => Self::Mod,
            TokenKind::Gt => Self::Gt,
            TokenKind::Gte => Self::Gte,
            TokenKind::Lt => Self::Lt,
            TokenKind::Lte => Self::Lte,
            TokenKind::EqEq => Self::Eq,
            TokenKind::NotEq => Self::NotEq,
            TokenKind::And => Self::And,
            TokenKind::Or => Self::Or,
            _ => return None,
        })
    }
}

/// Unary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// Expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Deepest allowed nesting of parentheses and unary minus
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parser for formula expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Parse expression text into an AST
    pub fn parse(input: &str) -> FormulaResult<Expr> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            depth: 0,
        };

        let expr = parser.parse_or()?;
        if !parser.check(TokenKind::Eof) {
            let tok = parser.peek();
            return Err(FormulaError::Parse {
                position: tok.pos,
                message: format!("Unexpected token '{}'", tok.text),
            });
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> FormulaResult<Expr> {
        self.parse_left_assoc(&[TokenKind::Or], Self::parse_and)
    }

    fn parse_and(&mut self) -> FormulaResult<Expr> {
        self.parse_left_assoc(&[TokenKind::And], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        self.parse_left_assoc(
            &[
                TokenKind::Gt,
                TokenKind::Gte,
                TokenKind::Lt,
                TokenKind::Lte,
                TokenKind::EqEq,
                TokenKind::NotEq,
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        self.parse_left_assoc(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        self.parse_left_assoc(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_unary,
        )
    }

    fn parse_left_assoc(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> FormulaResult<Expr>,
    ) -> FormulaResult<Expr> {
        let mut left = next(self)?;

        while operators.contains(&self.peek().kind) {
            let kind = self.advance().kind;
            let right = next(self)?;
            // operators only ever holds binary operator tokens
            let Some(op) = BinaryOp::from_token(kind) else {
                break;
            };
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if self.check(TokenKind::Minus) {
            let position = self.advance().pos;
            let operand = self.nested(position, Self::parse_unary)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        let tok = self.advance().clone();

        match tok.kind {
            TokenKind::Number => tok
                .text
                .parse::<f64>()
                .map(|n| Expr::Literal(Value::Number(n)))
                .map_err(|_| FormulaError::Parse {
                    position: tok.pos,
                    message: format!("Invalid number: '{}'", tok.text),
                }),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::Identifier => Ok(Expr::Identifier(tok.text)),
            TokenKind::OpenParen => {
                let inner = self.nested(tok.pos, Self::parse_or)?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Eof => Err(FormulaError::Parse {
                position: tok.pos,
                message: "Unexpected end of expression".into(),
            }),
            _ => Err(FormulaError::Parse {
                position: tok.pos,
                message: format!("Unexpected token '{}'", tok.text),
            }),
        }
    }

    /// Run `inner` one nesting level deeper, failing past `MAX_NESTING_DEPTH`
    fn nested(
        &mut self,
        position: usize,
        inner: fn(&mut Self) -> FormulaResult<Expr>,
    ) -> FormulaResult<Expr> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::Parse {
                position,
                message: "expression nested too deeply".into(),
            });
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    // Token navigation

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn expect(&mut self, kind: TokenKind) -> FormulaResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            let found = if tok.kind == TokenKind::Eof {
                "end of expression".to_string()
            } else {
                format!("'{}'", tok.text)
            };
            Err(FormulaError::Parse {
                position: tok.pos,
                message: format!("Expected '{}', found {}", kind, found),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Literal(Value::Number(n))
    }

    fn ident(name: &str) -> Expr {
        Expr::Identifier(name.to_string())
    }

    #[test]
    fn test_precedence() {
        let expr = Parser::parse("a + 2 * 3 > 10 && b").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::And,
                Expr::binary(
                    BinaryOp::Gt,
                    Expr::binary(
                        BinaryOp::Add,
                        ident("a"),
                        Expr::binary(BinaryOp::Mul, num(2.0), num(3.0)),
                    ),
                    num(10.0),
                ),
                ident("b"),
            )
        );
    }

    #[test]
    fn test_left_associative() {
        let expr = Parser::parse("10 - 4 - 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num(10.0), num(4.0)),
                num(3.0),
            )
        );
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let expr = Parser::parse("a or b and c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Or,
                ident("a"),
                Expr::binary(BinaryOp::And, ident("b"), ident("c")),
            )
        );
    }

    #[test]
    fn test_unary_and_parens() {
        let expr = Parser::parse("-(a - -1)").unwrap();
        assert_eq!(
            expr,
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(Expr::binary(
                    BinaryOp::Sub,
                    ident("a"),
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(num(1.0)),
                    },
                )),
            }
        );
    }

    #[test]
    fn test_errors_carry_position() {
        match Parser::parse("total_messages >") {
            Err(FormulaError::Parse { position, message }) => {
                assert_eq!(position, 17);
                assert!(message.contains("end of expression"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        match Parser::parse("(a + 1") {
            Err(FormulaError::Parse { message, .. }) => assert!(message.contains("')'")),
            other => panic!("expected parse error, got {:?}", other),
        }

        match Parser::parse("a 5") {
            Err(FormulaError::Parse { position, .. }) => assert_eq!(position, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}total_messages{}", "(".repeat(10_000), ")".repeat(10_000));
        match Parser::parse(&deep) {
            Err(FormulaError::Parse { position, message }) => {
                assert_eq!(position, MAX_NESTING_DEPTH + 1);
                assert!(message.contains("nested too deeply"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        let negations = format!("{}1", "-".repeat(10_000));
        assert!(matches!(
            Parser::parse(&negations),
            Err(FormulaError::Parse { .. })
        ));

        let ok = format!("{}a{}", "(".repeat(MAX_NESTING_DEPTH), ")".repeat(MAX_NESTING_DEPTH));
        assert_eq!(Parser::parse(&ok).unwrap(), ident("a"));

        // depth is released when a group closes
        let siblings = vec!["(a)"; 200].join(" + ");
        assert!(Parser::parse(&siblings).is_ok());
    }
}

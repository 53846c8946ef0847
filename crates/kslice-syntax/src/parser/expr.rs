use kslice_lexer::token::TokenKind;

use super::{unquote, Parser};
use crate::ast::{CompareOp, Expr};
use crate::ParserResult;

/// Decimal (optionally negative) or `0x`-prefixed hexadecimal literal.
pub fn is_numeric_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
    }
}

fn classify_word(text: &str) -> Expr {
    if matches!(text, "y" | "m" | "n") || is_numeric_literal(text) {
        Expr::constant(text)
    } else {
        Expr::symbol(text)
    }
}

fn compare_op_for(kind: TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::Equals => Some(CompareOp::Equal),
        TokenKind::NotEquals => Some(CompareOp::NotEqual),
        TokenKind::Less => Some(CompareOp::Less),
        TokenKind::LessEquals => Some(CompareOp::LessEqual),
        TokenKind::Greater => Some(CompareOp::Greater),
        TokenKind::GreaterEquals => Some(CompareOp::GreaterEqual),
        _ => None,
    }
}

// Precedence, loosest first: `||`, `&&`, `!`, comparisons, primaries.
impl<'text> Parser<'text> {
    pub(super) fn parse_expr(&mut self) -> ParserResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.allow(TokenKind::Or) {
            lhs = lhs.or(self.parse_and()?);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParserResult<Expr> {
        let mut lhs = self.parse_not()?;
        while self.allow(TokenKind::And) {
            lhs = lhs.and(self.parse_not()?);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> ParserResult<Expr> {
        if self.allow(TokenKind::Not) {
            return Ok(self.parse_not()?.negate());
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParserResult<Expr> {
        let lhs = self.parse_primary()?;
        match compare_op_for(self.peek()) {
            Some(op) => {
                self.bump();
                let rhs = self.parse_primary()?;
                Ok(Expr::Compare(op, Box::new(lhs), Box::new(rhs)))
            }
            None => Ok(lhs),
        }
    }

    pub(super) fn parse_primary(&mut self) -> ParserResult<Expr> {
        match self.peek() {
            TokenKind::OpenParenthesis => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::CloseParenthesis, "`)`")?;
                Ok(inner)
            }
            TokenKind::Word | TokenKind::Modules => Ok(classify_word(self.bump().text)),
            TokenKind::DoubleQuotedValue | TokenKind::SingleQuotedValue => {
                Ok(Expr::Const(unquote(self.bump().text)))
            }
            TokenKind::MacroReference => Ok(Expr::constant(self.bump().text)),
            _ => Err(self.error_here("expression")),
        }
    }
}

use luna_ir::BinOp;

use super::{ParseResult, Parser};
use crate::ast::*;
use crate::token::TokenKind;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Comparison,
    Additive,
    Multiplicative,
    Terminal,
}

impl Prec {
    fn tighter(self) -> Option<Prec> {
        match self {
            Prec::Comparison => Some(Prec::Additive),
            Prec::Additive => Some(Prec::Multiplicative),
            Prec::Multiplicative => Some(Prec::Terminal),
            Prec::Terminal => None,
        }
    }
}

fn binop_prec(op: BinOp) -> Prec {
    match op {
        BinOp::Lt | BinOp::Gt => Prec::Comparison,
        BinOp::Add | BinOp::Sub => Prec::Additive,
        BinOp::Mul | BinOp::Div => Prec::Multiplicative,
    }
}

fn binop_for(kind: TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::LessThan => BinOp::Lt,
        TokenKind::GreaterThan => BinOp::Gt,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Asterisk => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        _ => return None,
    };

    Some(op)
}

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_prec(Prec::Comparison)
    }

    /// Collects every operand and operator of one precedence level, then folds
    /// them from the left, so `a - b - c` is `(a - b) - c`.
    fn parse_prec(&mut self, prec: Prec) -> ParseResult<Expr> {
        let Some(tighter) = prec.tighter() else {
            return self.parse_terminal();
        };

        let first = self.parse_prec(tighter)?;

        let mut operators = vec![];
        let mut operands = vec![];
        while let Some(op) = self.peek_bin_op(prec)? {
            operators.push((op, self.tokens.advance()?));
            operands.push(self.parse_prec(tighter)?);
        }

        let mut expr = first;
        for ((op, op_token), rhs) in operators.into_iter().zip(operands) {
            expr = Expr::BinOp {
                op,
                op_token,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }

        Ok(expr)
    }

    fn peek_bin_op(&mut self, prec: Prec) -> ParseResult<Option<BinOp>> {
        let kind = self.tokens.peek_kind(0)?;
        Ok(binop_for(kind).filter(|&op| binop_prec(op) == prec))
    }

    fn parse_terminal(&mut self) -> ParseResult<Expr> {
        match self.tokens.peek_kind(0)? {
            TokenKind::Number | TokenKind::String => Ok(Expr::Literal(self.tokens.advance()?)),

            TokenKind::OpenParen => {
                self.tokens.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;

                Ok(Expr::Parenthesized(Box::new(inner)))
            }

            TokenKind::Identifier => Ok(Expr::Chain(self.parse_chain()?)),

            _ => Err(self.error_expected("an expression")?),
        }
    }

    pub(super) fn parse_chain(&mut self) -> ParseResult<VarOrCallChain> {
        let mut segments = vec![];

        loop {
            let name = self.expect(TokenKind::Identifier)?;

            let args = if self.eat(TokenKind::OpenParen)? {
                Some(self.parse_call_args()?)
            } else {
                None
            };

            segments.push(VarOrCall { name, args });

            if !self.eat(TokenKind::Dot)? {
                break;
            }
        }

        Ok(VarOrCallChain { segments })
    }

    /// Arguments after the opening parenthesis, up to and including the closing one.
    fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = vec![];

        if self.eat(TokenKind::CloseParen)? {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);

            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }

        self.expect(TokenKind::CloseParen)?;

        Ok(args)
    }
}

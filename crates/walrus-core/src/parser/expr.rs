//! Expression nud and led handlers.

use super::{BindingPower, PResult, Parser};
use crate::ast::*;
use crate::error::ParseError;
use crate::numeric;
use crate::span::Spanned;
use crate::token::TokenKind;

// ============================================================================
// Nud handlers
// ============================================================================

pub(super) fn parse_number(p: &mut Parser) -> PResult<Expr> {
    let token = p.advance();
    let literal = if token.text.contains('.') {
        let value: f64 = token.text.parse().map_err(|_| {
            ParseError::new("E108", format!("invalid number literal `{}`", token.text), token.span)
        })?;
        NumericLiteral {
            value: Number::Float(value),
            bits: numeric::float_bits(&token.text, value),
            span: token.span,
        }
    } else {
        let value: i128 = token.text.parse().map_err(|_| {
            ParseError::new(
                "E108",
                format!("integer literal `{}` does not fit in 128 bits", token.text),
                token.span,
            )
        })?;
        NumericLiteral {
            value: Number::Integer(value),
            bits: numeric::integer_bits(value),
            span: token.span,
        }
    };
    Ok(Expr::Number(literal))
}

pub(super) fn parse_string(p: &mut Parser) -> PResult<Expr> {
    let token = p.advance();
    Ok(Expr::String(StringLiteral {
        value: token.text,
        span: token.span,
    }))
}

pub(super) fn parse_char(p: &mut Parser) -> PResult<Expr> {
    let token = p.advance();
    let value = token.text.chars().next().unwrap_or_default();
    Ok(Expr::Character(CharLiteral {
        value,
        span: token.span,
    }))
}

pub(super) fn parse_boolean(p: &mut Parser) -> PResult<Expr> {
    let token = p.advance();
    Ok(Expr::Boolean(BooleanLiteral {
        value: token.kind == TokenKind::True,
        span: token.span,
    }))
}

pub(super) fn parse_null(p: &mut Parser) -> PResult<Expr> {
    let token = p.advance();
    Ok(Expr::Null(token.span))
}

/// An identifier, or a struct literal when followed by `{ name :`.
pub(super) fn parse_identifier(p: &mut Parser) -> PResult<Expr> {
    let starts_struct_literal = p.peek_kind(1) == TokenKind::LBrace
        && p.peek_kind(2) == TokenKind::Identifier
        && p.peek_kind(3) == TokenKind::Colon;

    let name = p.expect_identifier()?;
    if starts_struct_literal {
        parse_struct_literal(p, name)
    } else {
        Ok(Expr::Identifier(name))
    }
}

fn parse_struct_literal(p: &mut Parser, name: Identifier) -> PResult<Expr> {
    p.expect(TokenKind::LBrace)?;
    let mut fields: Vec<FieldInit> = Vec::new();

    while !p.check(TokenKind::RBrace) && !p.is_at_end() {
        let field = p.expect_identifier()?;
        if fields.iter().any(|f| f.name.name == field.name) {
            return Err(ParseError::new(
                "E112",
                format!("property `{}` specified more than once", field.name),
                field.span,
            ));
        }
        p.expect(TokenKind::Colon)?;
        let value = p.parse_expression(BindingPower::Comma)?;
        fields.push(FieldInit { name: field, value });

        if !p.check(TokenKind::RBrace) {
            p.expect(TokenKind::Comma)?;
        }
    }

    let end = p.expect(TokenKind::RBrace)?;
    Ok(Expr::StructLiteral {
        span: name.span.merge(&end.span),
        name,
        fields,
    })
}

pub(super) fn parse_grouping(p: &mut Parser) -> PResult<Expr> {
    p.expect(TokenKind::LParen)?;
    let expression = p.parse_expression(BindingPower::Default)?;
    p.expect(TokenKind::RParen)?;
    Ok(expression)
}

pub(super) fn parse_prefix(p: &mut Parser) -> PResult<Expr> {
    let token = p.advance();
    let operator = match token.kind {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Minus,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::PlusPlus => UnaryOp::Increment,
        _ => UnaryOp::Decrement,
    };
    let operand = p.parse_expression(BindingPower::Unary)?;
    Ok(Expr::Unary {
        span: token.span.merge(&operand.span()),
        operator: Spanned::new(operator, token.span),
        operand: Box::new(operand),
        postfix: false,
    })
}

pub(super) fn parse_array(p: &mut Parser) -> PResult<Expr> {
    let start = p.expect(TokenKind::LBracket)?;
    let elements = parse_list(p, TokenKind::RBracket)?;
    let end = p.expect(TokenKind::RBracket)?;
    Ok(Expr::Array {
        size: elements.len(),
        elements,
        span: start.span.merge(&end.span),
    })
}

/// Comma-separated expressions up to (not including) `closer`.
fn parse_list(p: &mut Parser, closer: TokenKind) -> PResult<Vec<Expr>> {
    let mut items = Vec::new();
    while !p.check(closer) && !p.is_at_end() {
        items.push(p.parse_expression(BindingPower::Comma)?);
        if !p.check(closer) {
            p.expect(TokenKind::Comma)?;
        }
    }
    Ok(items)
}

// ============================================================================
// Led handlers
// ============================================================================

pub(super) fn parse_binary(p: &mut Parser, left: Expr, bp: BindingPower) -> PResult<Expr> {
    let token = p.advance();
    let operator = match token.kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Modulo,
        TokenKind::Equals => BinaryOp::Equal,
        TokenKind::NotEquals => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEquals => BinaryOp::GreaterEqual,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        TokenKind::DotDot => BinaryOp::Range,
        other => {
            return Err(ParseError::new(
                "E103",
                format!("{} is not a binary operator", other),
                token.span,
            ))
        }
    };
    let right = p.parse_expression(bp)?;
    Ok(Expr::Binary {
        span: left.span().merge(&right.span()),
        operator: Spanned::new(operator, token.span),
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Right-associative: the value is parsed one level below assignment.
pub(super) fn parse_assignment(p: &mut Parser, left: Expr, bp: BindingPower) -> PResult<Expr> {
    if !matches!(left, Expr::Identifier(_) | Expr::PropertyAccess { .. }) {
        return Err(ParseError::new(
            "E104",
            format!("cannot assign to `{}`", left),
            left.span(),
        )
        .with_hint("only variables and struct properties can be assigned"));
    }

    let token = p.advance();
    let operator = match token.kind {
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Subtract,
        TokenKind::StarAssign => AssignOp::Multiply,
        TokenKind::SlashAssign => AssignOp::Divide,
        TokenKind::PercentAssign => AssignOp::Modulo,
        _ => AssignOp::Assign,
    };
    let value = p.parse_expression(bp.lower())?;
    Ok(Expr::Assignment {
        span: left.span().merge(&value.span()),
        target: Box::new(left),
        operator: Spanned::new(operator, token.span),
        value: Box::new(value),
    })
}

pub(super) fn parse_call(p: &mut Parser, left: Expr, _bp: BindingPower) -> PResult<Expr> {
    let callee = match left {
        Expr::Identifier(callee) => callee,
        other => {
            return Err(ParseError::new(
                "E105",
                format!("`{}` cannot be called", other),
                other.span(),
            )
            .with_hint("only functions referenced by name can be called"))
        }
    };

    p.expect(TokenKind::LParen)?;
    let arguments = parse_list(p, TokenKind::RParen)?;
    let end = p.expect(TokenKind::RParen)?;
    Ok(Expr::Call {
        span: callee.span.merge(&end.span),
        callee,
        arguments,
    })
}

pub(super) fn parse_postfix(p: &mut Parser, left: Expr, _bp: BindingPower) -> PResult<Expr> {
    let token = p.advance();
    if !matches!(left, Expr::Identifier(_)) {
        return Err(ParseError::new(
            "E106",
            format!("{} can only follow a variable name", token.kind),
            left.span().merge(&token.span),
        ));
    }

    let operator = if token.kind == TokenKind::PlusPlus {
        UnaryOp::Increment
    } else {
        UnaryOp::Decrement
    };
    Ok(Expr::Unary {
        span: left.span().merge(&token.span),
        operator: Spanned::new(operator, token.span),
        operand: Box::new(left),
        postfix: true,
    })
}

pub(super) fn parse_property_access(
    p: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> PResult<Expr> {
    p.expect(TokenKind::Dot)?;
    let property = p.expect_identifier()?;
    Ok(Expr::PropertyAccess {
        span: left.span().merge(&property.span),
        object: Box::new(left),
        property,
    })
}

pub(super) fn parse_index(p: &mut Parser, left: Expr, _bp: BindingPower) -> PResult<Expr> {
    let array = match left {
        Expr::Identifier(array) => array,
        other => {
            return Err(ParseError::new(
                "E107",
                format!("`{}` cannot be indexed", other),
                other.span(),
            )
            .with_hint("bind the value to a variable and index that"))
        }
    };

    p.expect(TokenKind::LBracket)?;
    let index = p.parse_expression(BindingPower::Default)?;
    let end = p.expect(TokenKind::RBracket)?;
    Ok(Expr::Index {
        span: array.span.merge(&end.span),
        array,
        index: Box::new(index),
    })
}

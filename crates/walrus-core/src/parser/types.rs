//! Type annotation handlers.

use super::{BindingPower, PResult, Parser};
use crate::ast::Type;
use crate::token::TokenKind;

/// A primitive type name. Anything else degrades to `null` with a warning.
pub(super) fn parse_named_type(p: &mut Parser) -> PResult<Type> {
    let name = p.expect_identifier()?;
    match Type::primitive(&name.name) {
        Some(ty) => Ok(ty),
        None => {
            tracing::warn!(name = %name.name, "unknown type name treated as null");
            p.warn(
                "W001",
                format!("unknown type `{}` is treated as `null`", name.name),
                name.span,
            );
            Ok(Type::Null)
        }
    }
}

pub(super) fn parse_null_type(p: &mut Parser) -> PResult<Type> {
    p.expect(TokenKind::Null)?;
    Ok(Type::Null)
}

/// `[]element`
pub(super) fn parse_array_type(p: &mut Parser) -> PResult<Type> {
    p.expect(TokenKind::LBracket)?;
    p.expect(TokenKind::RBracket)?;
    let element = p.parse_type(BindingPower::Default)?;
    Ok(Type::Array(Box::new(element)))
}

/// `element[]`
pub(super) fn parse_array_suffix(p: &mut Parser, left: Type, _bp: BindingPower) -> PResult<Type> {
    p.expect(TokenKind::LBracket)?;
    p.expect(TokenKind::RBracket)?;
    Ok(Type::Array(Box::new(left)))
}

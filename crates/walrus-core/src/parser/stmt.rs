//! Statement handlers.

use super::{BindingPower, PResult, Parser};
use crate::ast::*;
use crate::error::ParseError;
use crate::token::TokenKind;

/// `let|const name := value;` or `let|const name: type [= value];`
pub(super) fn parse_variable_decl(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.advance();
    let constant = keyword.kind == TokenKind::Const;
    let name = p.expect_identifier()?;

    let (ty, value) = if p.eat(TokenKind::Colon) {
        let ty = p.parse_type(BindingPower::Default)?;
        let value = if p.eat(TokenKind::Assign) {
            Some(p.parse_expression(BindingPower::Assignment)?)
        } else {
            None
        };
        (Some(ty), value)
    } else {
        p.expect(TokenKind::Walrus)?;
        if p.check(TokenKind::Semicolon) {
            return Err(p
                .error_at_current("E109", format!("`{}` needs a value after `:=`", name.name))
                .with_hint(format!("write `{} := <value>;` or `{}: <type>;`", name.name, name.name)));
        }
        (None, Some(p.parse_expression(BindingPower::Assignment)?))
    };

    if constant && value.is_none() {
        return Err(ParseError::new(
            "E115",
            format!("constant `{}` must be initialized", name.name),
            name.span,
        ));
    }

    let end = p.expect(TokenKind::Semicolon)?;
    Ok(Stmt::VariableDecl(VariableDecl {
        span: keyword.span.merge(&end.span),
        name,
        constant,
        ty,
        value,
    }))
}

pub(super) fn parse_block(p: &mut Parser) -> PResult<Block> {
    let start = p.expect(TokenKind::LBrace)?;
    p.block_depth += 1;

    let mut statements = Vec::new();
    while !p.check(TokenKind::RBrace) && !p.is_at_end() {
        statements.push(p.parse_statement()?);
    }

    p.block_depth -= 1;
    let end = p.expect(TokenKind::RBrace)?;
    Ok(Block {
        statements,
        span: start.span.merge(&end.span),
    })
}

pub(super) fn parse_block_stmt(p: &mut Parser) -> PResult<Stmt> {
    Ok(Stmt::Block(parse_block(p)?))
}

pub(super) fn parse_if(p: &mut Parser) -> PResult<Stmt> {
    Ok(Stmt::If(parse_if_chain(p)?))
}

/// Parses from an `if` or `elf` keyword through the end of the chain.
fn parse_if_chain(p: &mut Parser) -> PResult<IfStmt> {
    let keyword = p.advance();
    let condition = p.parse_expression(BindingPower::Assignment)?;
    let consequent = parse_block(p)?;

    let alternate = match p.current_kind() {
        TokenKind::Els => {
            p.advance();
            Alternate::Else(parse_block(p)?)
        }
        TokenKind::Elf => Alternate::ElseIf(Box::new(parse_if_chain(p)?)),
        _ => Alternate::None,
    };

    let end = match &alternate {
        Alternate::None => consequent.span,
        Alternate::Else(block) => block.span,
        Alternate::ElseIf(chain) => chain.span,
    };

    Ok(IfStmt {
        span: keyword.span.merge(&end),
        condition,
        consequent,
        alternate,
    })
}

/// `( name: type, ... )`, names unique.
fn parse_parameters(p: &mut Parser) -> PResult<Vec<Parameter>> {
    p.expect(TokenKind::LParen)?;
    let mut params: Vec<Parameter> = Vec::new();

    while !p.check(TokenKind::RParen) && !p.is_at_end() {
        let name = p.expect_identifier()?;
        if params.iter().any(|param| param.name.name == name.name) {
            return Err(ParseError::new(
                "E113",
                format!("parameter `{}` is declared more than once", name.name),
                name.span,
            ));
        }
        p.expect(TokenKind::Colon)?;
        let ty = p.parse_type(BindingPower::Default)?;
        params.push(Parameter { name, ty });

        if !p.check(TokenKind::RParen) {
            p.expect(TokenKind::Comma)?;
        }
    }

    p.expect(TokenKind::RParen)?;
    Ok(params)
}

/// `-> type`, defaulting to void.
fn parse_return_type(p: &mut Parser) -> PResult<Type> {
    if p.eat(TokenKind::Arrow) {
        p.parse_type(BindingPower::Default)
    } else {
        Ok(Type::Void)
    }
}

pub(super) fn parse_function_decl(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::Fn)?;
    let name = p.expect_identifier()?;
    let params = parse_parameters(p)?;
    let return_type = parse_return_type(p)?;
    let body = parse_block(p)?;

    Ok(Stmt::FunctionDecl(FunctionDecl {
        span: keyword.span.merge(&body.span),
        name,
        params,
        return_type,
        body,
    }))
}

pub(super) fn parse_return(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::Ret)?;
    let value = if p.check(TokenKind::Semicolon) {
        None
    } else {
        Some(p.parse_expression(BindingPower::Default)?)
    };
    let end = p.expect(TokenKind::Semicolon)?;
    Ok(Stmt::Return {
        value,
        span: keyword.span.merge(&end.span),
    })
}

pub(super) fn parse_struct_decl(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::Struct)?;
    let name = p.expect_identifier()?;
    p.expect(TokenKind::LBrace)?;

    let mut properties: Vec<PropertyDecl> = Vec::new();
    let mut methods: Vec<MethodDecl> = Vec::new();

    while !p.check(TokenKind::RBrace) && !p.is_at_end() {
        if !p.check(TokenKind::AccessModifier) {
            let found = p.current_kind();
            return Err(p
                .error_at_current("E110", format!("expected access modifier, found {}", found))
                .with_hint("start every member with `pub` or `priv`")
                .with_hint("e.g. `pub readonly name: str;`"));
        }
        let modifier = p.advance();
        let visibility = if modifier.text == "pub" {
            Visibility::Public
        } else {
            Visibility::Private
        };
        let is_static = p.eat(TokenKind::Static);
        let readonly = p.eat(TokenKind::Readonly);
        let member = p.expect_identifier()?;

        let taken = properties.iter().any(|prop| prop.name.name == member.name)
            || methods.iter().any(|method| method.name.name == member.name);
        if taken {
            return Err(ParseError::new(
                "E111",
                format!("member `{}` is already declared in `{}`", member.name, name.name),
                member.span,
            ));
        }

        if p.check(TokenKind::LParen) {
            let params = parse_parameters(p)?;
            let return_type = parse_return_type(p)?;
            p.expect(TokenKind::Semicolon)?;
            methods.push(MethodDecl {
                name: member,
                visibility,
                is_static,
                params,
                return_type,
            });
        } else {
            p.expect(TokenKind::Colon)?;
            let ty = p.parse_type(BindingPower::Default)?;
            p.expect(TokenKind::Semicolon)?;
            properties.push(PropertyDecl {
                name: member,
                visibility,
                is_static,
                readonly,
                ty,
            });
        }
    }

    let end = p.expect(TokenKind::RBrace)?;
    Ok(Stmt::StructDecl(StructDecl {
        span: keyword.span.merge(&end.span),
        name,
        properties,
        methods,
    }))
}

pub(super) fn parse_while(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::While)?;
    let condition = p.parse_expression(BindingPower::Assignment)?;
    let body = parse_block(p)?;
    Ok(Stmt::While {
        span: keyword.span.merge(&body.span),
        condition,
        body,
    })
}

/// `for i := init; condition; post { ... }`
pub(super) fn parse_for(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::For)?;
    let variable = p.expect_identifier()?;
    p.expect(TokenKind::Walrus)?;
    let init = p.parse_expression(BindingPower::Assignment)?;
    p.expect(TokenKind::Semicolon)?;
    let condition = p.parse_expression(BindingPower::Default)?;
    p.expect(TokenKind::Semicolon)?;
    let post = p.parse_expression(BindingPower::Default)?;
    let body = parse_block(p)?;

    Ok(Stmt::For(ForStmt {
        span: keyword.span.merge(&body.span),
        variable,
        init,
        condition,
        post,
        body,
    }))
}

/// `foreach value[, index] in iterable { ... }`
pub(super) fn parse_foreach(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::Foreach)?;
    let value = p.expect_identifier()?;
    let index = if p.eat(TokenKind::Comma) {
        Some(p.expect_identifier()?)
    } else {
        None
    };
    p.expect(TokenKind::In)?;
    let iterable = p.parse_expression(BindingPower::Assignment)?;
    let body = parse_block(p)?;

    Ok(Stmt::Foreach(ForeachStmt {
        span: keyword.span.merge(&body.span),
        value,
        index,
        iterable,
        body,
    }))
}

/// `import "path";` or `import { a, b } from "path";`
pub(super) fn parse_import(p: &mut Parser) -> PResult<Stmt> {
    let keyword = p.expect(TokenKind::Import)?;
    if p.block_depth > 0 {
        return Err(ParseError::new(
            "E114",
            "imports are only allowed at the top level",
            keyword.span,
        ));
    }

    let mut names = Vec::new();
    if p.eat(TokenKind::LBrace) {
        while !p.check(TokenKind::RBrace) && !p.is_at_end() {
            names.push(p.expect_identifier()?);
            if !p.check(TokenKind::RBrace) {
                p.expect(TokenKind::Comma)?;
            }
        }
        p.expect(TokenKind::RBrace)?;
        p.expect(TokenKind::From)?;
    }

    let path = p.expect(TokenKind::String)?;
    let end = p.expect(TokenKind::Semicolon)?;
    Ok(Stmt::Import(ImportStmt {
        path: StringLiteral {
            value: path.text,
            span: path.span,
        },
        names,
        span: keyword.span.merge(&end.span),
    }))
}

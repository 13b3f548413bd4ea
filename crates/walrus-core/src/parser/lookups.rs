//! Dispatch tables for the Pratt parser.
//!
//! Each [`Parser`] builds its own [`Lookups`] and [`TypeLookups`] when it is
//! constructed, so nothing here is global.

use std::collections::HashMap;

use super::{expr, stmt, types, PResult, Parser};
use crate::ast::{Expr, Stmt, Type};
use crate::token::TokenKind;

/// Operator binding power (higher = binds tighter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingPower {
    Default = 0,
    Comma,
    Assignment,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
    Primary,
}

impl BindingPower {
    /// The next weaker level.
    pub fn lower(self) -> Self {
        match self {
            BindingPower::Default | BindingPower::Comma => BindingPower::Default,
            BindingPower::Assignment => BindingPower::Comma,
            BindingPower::Logical => BindingPower::Assignment,
            BindingPower::Relational => BindingPower::Logical,
            BindingPower::Additive => BindingPower::Relational,
            BindingPower::Multiplicative => BindingPower::Additive,
            BindingPower::Unary => BindingPower::Multiplicative,
            BindingPower::Call => BindingPower::Unary,
            BindingPower::Member => BindingPower::Call,
            BindingPower::Primary => BindingPower::Member,
        }
    }
}

pub type NudHandler = fn(&mut Parser) -> PResult<Expr>;
pub type LedHandler = fn(&mut Parser, Expr, BindingPower) -> PResult<Expr>;
pub type StmtHandler = fn(&mut Parser) -> PResult<Stmt>;

pub type TypeNudHandler = fn(&mut Parser) -> PResult<Type>;
pub type TypeLedHandler = fn(&mut Parser, Type, BindingPower) -> PResult<Type>;

/// Expression and statement tables.
pub struct Lookups {
    nud: HashMap<TokenKind, NudHandler>,
    led: HashMap<TokenKind, LedHandler>,
    bp: HashMap<TokenKind, BindingPower>,
    stmt: HashMap<TokenKind, StmtHandler>,
}

impl Lookups {
    pub fn new() -> Self {
        let mut lookups = Self {
            nud: HashMap::new(),
            led: HashMap::new(),
            bp: HashMap::new(),
            stmt: HashMap::new(),
        };

        // Assignment
        for kind in [
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
        ] {
            lookups.led(kind, BindingPower::Assignment, expr::parse_assignment);
        }

        // Logical
        lookups.led(TokenKind::And, BindingPower::Logical, expr::parse_binary);
        lookups.led(TokenKind::Or, BindingPower::Logical, expr::parse_binary);
        lookups.led(TokenKind::DotDot, BindingPower::Logical, expr::parse_binary);

        // Relational
        for kind in [
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Equals,
            TokenKind::NotEquals,
        ] {
            lookups.led(kind, BindingPower::Relational, expr::parse_binary);
        }

        // Additive and multiplicative
        lookups.led(TokenKind::Plus, BindingPower::Additive, expr::parse_binary);
        lookups.led(TokenKind::Minus, BindingPower::Additive, expr::parse_binary);
        lookups.led(TokenKind::Star, BindingPower::Multiplicative, expr::parse_binary);
        lookups.led(TokenKind::Slash, BindingPower::Multiplicative, expr::parse_binary);
        lookups.led(TokenKind::Percent, BindingPower::Multiplicative, expr::parse_binary);

        // Call and postfix
        lookups.led(TokenKind::LParen, BindingPower::Call, expr::parse_call);
        lookups.led(TokenKind::PlusPlus, BindingPower::Call, expr::parse_postfix);
        lookups.led(TokenKind::MinusMinus, BindingPower::Call, expr::parse_postfix);

        // Member
        lookups.led(TokenKind::Dot, BindingPower::Member, expr::parse_property_access);
        lookups.led(TokenKind::LBracket, BindingPower::Member, expr::parse_index);

        // Literals and symbols
        lookups.nud(TokenKind::Number, expr::parse_number);
        lookups.nud(TokenKind::String, expr::parse_string);
        lookups.nud(TokenKind::Char, expr::parse_char);
        lookups.nud(TokenKind::Identifier, expr::parse_identifier);
        lookups.nud(TokenKind::True, expr::parse_boolean);
        lookups.nud(TokenKind::False, expr::parse_boolean);
        lookups.nud(TokenKind::Null, expr::parse_null);
        lookups.nud(TokenKind::LParen, expr::parse_grouping);
        lookups.nud(TokenKind::LBracket, expr::parse_array);

        // Prefix
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Not,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
        ] {
            lookups.nud(kind, expr::parse_prefix);
        }

        // Statements
        lookups.stmt(TokenKind::Let, stmt::parse_variable_decl);
        lookups.stmt(TokenKind::Const, stmt::parse_variable_decl);
        lookups.stmt(TokenKind::LBrace, stmt::parse_block_stmt);
        lookups.stmt(TokenKind::If, stmt::parse_if);
        lookups.stmt(TokenKind::Fn, stmt::parse_function_decl);
        lookups.stmt(TokenKind::Ret, stmt::parse_return);
        lookups.stmt(TokenKind::Struct, stmt::parse_struct_decl);
        lookups.stmt(TokenKind::While, stmt::parse_while);
        lookups.stmt(TokenKind::For, stmt::parse_for);
        lookups.stmt(TokenKind::Foreach, stmt::parse_foreach);
        lookups.stmt(TokenKind::Import, stmt::parse_import);

        lookups
    }

    fn led(&mut self, kind: TokenKind, bp: BindingPower, handler: LedHandler) {
        self.bp.insert(kind, bp);
        self.led.insert(kind, handler);
    }

    fn nud(&mut self, kind: TokenKind, handler: NudHandler) {
        self.nud.insert(kind, handler);
    }

    fn stmt(&mut self, kind: TokenKind, handler: StmtHandler) {
        self.stmt.insert(kind, handler);
    }

    pub fn nud_handler(&self, kind: TokenKind) -> Option<NudHandler> {
        self.nud.get(&kind).copied()
    }

    pub fn led_handler(&self, kind: TokenKind) -> Option<LedHandler> {
        self.led.get(&kind).copied()
    }

    pub fn stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt.get(&kind).copied()
    }

    /// Tokens without a led bind at [`BindingPower::Default`].
    pub fn binding_power(&self, kind: TokenKind) -> BindingPower {
        self.bp.get(&kind).copied().unwrap_or(BindingPower::Default)
    }
}

impl Default for Lookups {
    fn default() -> Self {
        Self::new()
    }
}

/// Tables for type annotations, separate from the expression tables.
pub struct TypeLookups {
    nud: HashMap<TokenKind, TypeNudHandler>,
    led: HashMap<TokenKind, TypeLedHandler>,
    bp: HashMap<TokenKind, BindingPower>,
}

impl TypeLookups {
    pub fn new() -> Self {
        let mut nud: HashMap<TokenKind, TypeNudHandler> = HashMap::new();
        nud.insert(TokenKind::Identifier, types::parse_named_type);
        nud.insert(TokenKind::Null, types::parse_null_type);
        nud.insert(TokenKind::LBracket, types::parse_array_type);

        let mut led: HashMap<TokenKind, TypeLedHandler> = HashMap::new();
        let mut bp = HashMap::new();
        led.insert(TokenKind::LBracket, types::parse_array_suffix);
        bp.insert(TokenKind::LBracket, BindingPower::Call);

        Self { nud, led, bp }
    }

    pub fn nud_handler(&self, kind: TokenKind) -> Option<TypeNudHandler> {
        self.nud.get(&kind).copied()
    }

    pub fn led_handler(&self, kind: TokenKind) -> Option<TypeLedHandler> {
        self.led.get(&kind).copied()
    }

    pub fn binding_power(&self, kind: TokenKind) -> BindingPower {
        self.bp.get(&kind).copied().unwrap_or(BindingPower::Default)
    }
}

impl Default for TypeLookups {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_power_order() {
        assert!(BindingPower::Assignment < BindingPower::Logical);
        assert!(BindingPower::Relational < BindingPower::Additive);
        assert!(BindingPower::Multiplicative < BindingPower::Unary);
        assert!(BindingPower::Call < BindingPower::Member);
        assert_eq!(BindingPower::Assignment.lower(), BindingPower::Comma);
    }

    #[test]
    fn test_tables() {
        let lookups = Lookups::new();
        assert_eq!(lookups.binding_power(TokenKind::Star), BindingPower::Multiplicative);
        assert_eq!(lookups.binding_power(TokenKind::DotDot), BindingPower::Logical);
        assert_eq!(lookups.binding_power(TokenKind::Semicolon), BindingPower::Default);
        assert!(lookups.nud_handler(TokenKind::Minus).is_some());
        assert!(lookups.led_handler(TokenKind::Minus).is_some());
        assert!(lookups.nud_handler(TokenKind::Star).is_none());
        assert!(lookups.stmt_handler(TokenKind::Elf).is_none());
    }
}

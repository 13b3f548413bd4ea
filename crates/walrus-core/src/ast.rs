//! Abstract Syntax Tree for walrus.

use std::fmt;

use crate::span::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// A complete walrus program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Module name, taken from the file stem
    pub module_name: String,
    /// Top-level import statements
    pub imports: Vec<ImportStmt>,
    /// Every other top-level statement, in order
    pub contents: Vec<Stmt>,
    /// Source span
    pub span: Span,
}

impl Program {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Types
// ============================================================================

/// A type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Integer { bits: u8, signed: bool },
    Float { bits: u8 },
    Boolean,
    String,
    Character,
    /// Also the type of any unknown name; imposes no constraint.
    Null,
    Array(Box<Type>),
    Void,
}

impl Type {
    /// Resolve a primitive type name.
    pub fn primitive(name: &str) -> Option<Type> {
        let ty = match name {
            "i8" => Type::Integer { bits: 8, signed: true },
            "i16" => Type::Integer { bits: 16, signed: true },
            "i32" => Type::Integer { bits: 32, signed: true },
            "i64" => Type::Integer { bits: 64, signed: true },
            "i128" => Type::Integer { bits: 128, signed: true },
            "u8" => Type::Integer { bits: 8, signed: false },
            "u16" => Type::Integer { bits: 16, signed: false },
            "u32" => Type::Integer { bits: 32, signed: false },
            "u64" => Type::Integer { bits: 64, signed: false },
            "u128" => Type::Integer { bits: 128, signed: false },
            "f32" => Type::Float { bits: 32 },
            "f64" => Type::Float { bits: 64 },
            "bool" => Type::Boolean,
            "char" => Type::Character,
            "str" => Type::String,
            "void" => Type::Void,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer { bits, signed } => {
                write!(f, "{}{}", if *signed { 'i' } else { 'u' }, bits)
            }
            Type::Float { bits } => write!(f, "f{}", bits),
            Type::Boolean => write!(f, "bool"),
            Type::String => write!(f, "str"),
            Type::Character => write!(f, "char"),
            Type::Null => write!(f, "null"),
            Type::Array(element) => write!(f, "[]{}", element),
            Type::Void => write!(f, "void"),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// An identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Value of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Integer(i128),
    Float(f64),
}

/// A numeric literal with the bit size inferred at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericLiteral {
    pub value: Number,
    pub bits: u8,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharLiteral {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Increment,
    Decrement,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::Increment => "++",
            UnaryOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    Range,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Range => "..",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Modulo
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if any.
    pub fn binary(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Subtract => Some(BinaryOp::Subtract),
            AssignOp::Multiply => Some(BinaryOp::Multiply),
            AssignOp::Divide => Some(BinaryOp::Divide),
            AssignOp::Modulo => Some(BinaryOp::Modulo),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
            AssignOp::Modulo => "%=",
        }
    }
}

/// One `name: value` entry of a struct literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: Identifier,
    pub value: Expr,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Identifier(Identifier),
    Number(NumericLiteral),
    String(StringLiteral),
    Character(CharLiteral),
    Boolean(BooleanLiteral),
    Null(Span),
    /// Prefix operator, or postfix `++`/`--` when `postfix` is set
    Unary {
        operator: Spanned<UnaryOp>,
        operand: Box<Expr>,
        postfix: bool,
        span: Span,
    },
    Binary {
        operator: Spanned<BinaryOp>,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// Target is an identifier or a property access
    Assignment {
        target: Box<Expr>,
        operator: Spanned<AssignOp>,
        value: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Identifier,
        arguments: Vec<Expr>,
        span: Span,
    },
    /// `Name { field: value, ... }`, field names unique
    StructLiteral {
        name: Identifier,
        fields: Vec<FieldInit>,
        span: Span,
    },
    PropertyAccess {
        object: Box<Expr>,
        property: Identifier,
        span: Span,
    },
    Array {
        elements: Vec<Expr>,
        size: usize,
        span: Span,
    },
    Index {
        array: Identifier,
        index: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(id) => id.span,
            Expr::Number(n) => n.span,
            Expr::String(s) => s.span,
            Expr::Character(c) => c.span,
            Expr::Boolean(b) => b.span,
            Expr::Null(span) => *span,
            Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assignment { span, .. }
            | Expr::Call { span, .. }
            | Expr::StructLiteral { span, .. }
            | Expr::PropertyAccess { span, .. }
            | Expr::Array { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }
}

/// Fully parenthesized rendering, one pair per operator.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(id) => write!(f, "{}", id.name),
            Expr::Number(n) => match n.value {
                Number::Integer(v) => write!(f, "{}", v),
                Number::Float(v) => write!(f, "{:?}", v),
            },
            Expr::String(s) => write!(f, "\"{}\"", s.value),
            Expr::Character(c) => write!(f, "'{}'", c.value),
            Expr::Boolean(b) => write!(f, "{}", b.value),
            Expr::Null(_) => write!(f, "null"),
            Expr::Unary {
                operator,
                operand,
                postfix,
                ..
            } => {
                if *postfix {
                    write!(f, "({}{})", operand, operator.value.symbol())
                } else {
                    write!(f, "({}{})", operator.value.symbol(), operand)
                }
            }
            Expr::Binary {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.value.symbol(), right),
            Expr::Assignment {
                target,
                operator,
                value,
                ..
            } => write!(f, "({} {} {})", target, operator.value.symbol(), value),
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", callee.name)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expr::StructLiteral { name, fields, .. } => {
                write!(f, "{} {{", name.name)?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{}: {}", sep, field.name.name, field.value)?;
                }
                write!(f, " }}")
            }
            Expr::PropertyAccess {
                object, property, ..
            } => write!(f, "{}.{}", object, property.name),
            Expr::Array { elements, .. } => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expr::Index { array, index, .. } => write!(f, "{}[{}]", array.name, index),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

// ============================================================================
// Statements
// ============================================================================

/// A braced sequence of statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// `let`/`const` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: Identifier,
    pub constant: bool,
    /// Explicit type from `name: type`
    pub ty: Option<Type>,
    pub value: Option<Expr>,
    pub span: Span,
}

/// A `name: type` pair in a parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Identifier,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Identifier,
    /// Unique by name
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub consequent: Block,
    pub alternate: Alternate,
    pub span: Span,
}

/// What follows the consequent block of an `if`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alternate {
    None,
    /// `elf cond { ... }`
    ElseIf(Box<IfStmt>),
    /// `els { ... }`
    Else(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: Identifier,
    pub visibility: Visibility,
    pub is_static: bool,
    pub readonly: bool,
    pub ty: Type,
}

/// Method signature inside a struct declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Identifier,
    pub visibility: Visibility,
    pub is_static: bool,
    pub params: Vec<Parameter>,
    pub return_type: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: Identifier,
    /// Unique by name
    pub properties: Vec<PropertyDecl>,
    /// Unique by name
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

impl StructDecl {
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties.iter().find(|p| p.name.name == name)
    }
}

/// `for i := init; cond; post { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub variable: Identifier,
    pub init: Expr,
    pub condition: Expr,
    pub post: Expr,
    pub body: Block,
    pub span: Span,
}

/// `foreach value[, index] in iterable { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeachStmt {
    pub value: Identifier,
    pub index: Option<Identifier>,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

/// `import "path";` or `import { a, b } from "path";`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStmt {
    pub path: StringLiteral,
    pub names: Vec<Identifier>,
    pub span: Span,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expression { expression: Expr, span: Span },
    Block(Block),
    VariableDecl(VariableDecl),
    FunctionDecl(FunctionDecl),
    Return { value: Option<Expr>, span: Span },
    If(IfStmt),
    StructDecl(StructDecl),
    While { condition: Expr, body: Block, span: Span },
    For(ForStmt),
    Foreach(ForeachStmt),
    Import(ImportStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expression { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::While { span, .. } => *span,
            Stmt::Block(block) => block.span,
            Stmt::VariableDecl(decl) => decl.span,
            Stmt::FunctionDecl(decl) => decl.span,
            Stmt::If(stmt) => stmt.span,
            Stmt::StructDecl(decl) => decl.span,
            Stmt::For(stmt) => stmt.span,
            Stmt::Foreach(stmt) => stmt.span,
            Stmt::Import(stmt) => stmt.span,
        }
    }
}

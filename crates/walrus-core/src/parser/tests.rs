use super::*;
use crate::ast::*;
use crate::lexer::tokenize;

fn parse(source: &str) -> PResult<ParseOutput> {
    let tokens = tokenize(source).unwrap().tokens;
    Parser::new(tokens, "test.wal").parse()
}

fn program(source: &str) -> Program {
    parse(source).unwrap().program
}

fn parse_err(source: &str) -> ParseError {
    parse(source).unwrap_err()
}

/// Render the single expression statement in `source`.
fn expr(source: &str) -> String {
    let program = program(&format!("{};", source));
    match &program.contents[..] {
        [Stmt::Expression { expression, .. }] => expression.to_string(),
        other => panic!("expected one expression statement, got {other:?}"),
    }
}

#[test]
fn test_precedence_multiplicative_over_additive() {
    insta::assert_snapshot!(expr("a + b * c"), @"(a + (b * c))");
}

#[test]
fn test_assignment_is_right_associative() {
    insta::assert_snapshot!(expr("a = b = c"), @"(a = (b = c))");
}

#[test]
fn test_relational_groups_left() {
    insta::assert_snapshot!(expr("a < b == c"), @"((a < b) == c)");
}

#[test]
fn test_additive_groups_left() {
    insta::assert_snapshot!(expr("a - b - c"), @"((a - b) - c)");
}

#[test]
fn test_unary_and_grouping() {
    insta::assert_snapshot!(expr("-(a + b) * !c"), @"((-(a + b)) * (!c))");
}

#[test]
fn test_logical_below_relational() {
    insta::assert_snapshot!(expr("a < b && c >= d || e"), @"(((a < b) && (c >= d)) || e)");
}

#[test]
fn test_compound_assignment() {
    insta::assert_snapshot!(expr("total += x * 2"), @"(total += (x * 2))");
}

#[test]
fn test_call_and_member() {
    insta::assert_snapshot!(expr("f(a, b + 1, g(c)).len"), @"f(a, (b + 1), g(c)).len");
}

#[test]
fn test_postfix_binds_tighter_than_binary() {
    insta::assert_snapshot!(expr("i++ + 1"), @"((i++) + 1)");
}

#[test]
fn test_index_and_range() {
    insta::assert_snapshot!(expr("xs[i + 1] .. 10"), @"(xs[(i + 1)] .. 10)");
}

#[test]
fn test_property_assignment() {
    insta::assert_snapshot!(expr("p.x = p.x + 1"), @"(p.x = (p.x + 1))");
}

#[test]
fn test_struct_literal() {
    insta::assert_snapshot!(expr("Point { x: 1, y: a + b }"), @"Point { x: 1, y: (a + b) }");
}

#[test]
fn test_array_literal_size() {
    let program = program("[1, 2, 3,];");
    match &program.contents[0] {
        Stmt::Expression {
            expression: Expr::Array { size, .. },
            ..
        } => assert_eq!(*size, 3),
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_integer_literal_bit_sizes() {
    let program = program("127; 128; 40000; 9223372036854775808; 1.5;");
    let bits: Vec<u8> = program
        .contents
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression {
                expression: Expr::Number(n),
                ..
            } => n.bits,
            other => panic!("unexpected statement: {other:?}"),
        })
        .collect();
    assert_eq!(bits, vec![8, 16, 32, 128, 32]);
}

#[test]
fn test_integer_literal_too_large() {
    let err = parse_err("999999999999999999999999999999999999999999;");
    assert_eq!(err.code, "E108");
}

#[test]
fn test_walrus_declaration() {
    let program = program("let x := 5;");
    match &program.contents[0] {
        Stmt::VariableDecl(decl) => {
            assert_eq!(decl.name.name, "x");
            assert!(!decl.constant);
            assert!(decl.ty.is_none());
            assert!(matches!(decl.value, Some(Expr::Number(_))));
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_typed_declaration_without_value() {
    let program = program("let names: []str;");
    match &program.contents[0] {
        Stmt::VariableDecl(decl) => {
            assert_eq!(decl.ty, Some(Type::Array(Box::new(Type::String))));
            assert!(decl.value.is_none());
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_array_type_suffix() {
    let program = program("let grid: i32[][];");
    match &program.contents[0] {
        Stmt::VariableDecl(decl) => {
            let ty = decl.ty.as_ref().unwrap();
            assert_eq!(ty.to_string(), "[][]i32");
        }
        other => panic!("unexpected statement: {other:?}"),
    }
}

#[test]
fn test_walrus_without_value_is_rejected() {
    let err = parse_err("let x := ;");
    assert_eq!(err.code, "E109");
    assert_eq!(err.span.start.column, 10);
}

#[test]
fn test_uninitialized_constant_is_rejected() {
    assert_eq!(parse_err("const x: i32;").code, "E115");
}

#[test]
fn test_unknown_type_degrades_to_null_with_warning() {
    let output = parse("let p: Point;").unwrap();
    match &output.program.contents[0] {
        Stmt::VariableDecl(decl) => assert_eq!(decl.ty, Some(Type::Null)),
        other => panic!("unexpected statement: {other:?}"),
    }
    let warning = output.warnings.iter().next().unwrap();
    assert_eq!(warning.code, "W001");
    assert_eq!(warning.file, "test.wal");
}

#[test]
fn test_if_elf_els_chain() {
    let program = program("if a { 1; } elf b { 2; } els { 3; }");
    let Stmt::If(stmt) = &program.contents[0] else {
        panic!("expected if statement");
    };
    let Alternate::ElseIf(elf) = &stmt.alternate else {
        panic!("expected elf branch");
    };
    assert_eq!(elf.condition.to_string(), "b");
    assert!(matches!(elf.alternate, Alternate::Else(_)));
}

#[test]
fn test_function_declaration() {
    let program = program("fn add(a: i32, b: i32) -> i64 { ret a + b; }");
    let Stmt::FunctionDecl(decl) = &program.contents[0] else {
        panic!("expected function declaration");
    };
    assert_eq!(decl.params.len(), 2);
    assert_eq!(decl.return_type, Type::Integer { bits: 64, signed: true });
    assert!(matches!(decl.body.statements[0], Stmt::Return { value: Some(_), .. }));
}

#[test]
fn test_function_defaults_to_void() {
    let program = program("fn noop() { ret; }");
    let Stmt::FunctionDecl(decl) = &program.contents[0] else {
        panic!("expected function declaration");
    };
    assert_eq!(decl.return_type, Type::Void);
}

#[test]
fn test_duplicate_parameter() {
    assert_eq!(parse_err("fn f(a: i32, a: i32) {}").code, "E113");
}

#[test]
fn test_struct_declaration() {
    let program = program(
        "struct Point { pub x: i32; priv static readonly origin: i32; pub length() -> f64; }",
    );
    let Stmt::StructDecl(decl) = &program.contents[0] else {
        panic!("expected struct declaration");
    };
    assert_eq!(decl.properties.len(), 2);
    assert_eq!(decl.methods.len(), 1);
    let origin = decl.property("origin").unwrap();
    assert_eq!(origin.visibility, Visibility::Private);
    assert!(origin.is_static);
    assert!(origin.readonly);
    assert_eq!(decl.methods[0].return_type, Type::Float { bits: 64 });
}

#[test]
fn test_duplicate_struct_property() {
    let err = parse_err("struct S { pub x: i32; pub x: i32; }");
    assert_eq!(err.code, "E111");
    insta::assert_snapshot!(err.message, @"member `x` is already declared in `S`");
}

#[test]
fn test_struct_member_requires_access_modifier() {
    let err = parse_err("struct S { x: i32; }");
    assert_eq!(err.code, "E110");
    assert_eq!(err.hints.len(), 2);
}

#[test]
fn test_duplicate_struct_literal_field() {
    assert_eq!(parse_err("P { x: 1, x: 2 };").code, "E112");
}

#[test]
fn test_invalid_assignment_target() {
    let err = parse_err("a + b = c;");
    assert_eq!(err.code, "E104");
}

#[test]
fn test_invalid_call_target() {
    assert_eq!(parse_err("(a)(1)(2);").code, "E105");
}

#[test]
fn test_postfix_requires_identifier() {
    assert_eq!(parse_err("5++;").code, "E106");
}

#[test]
fn test_missing_expression() {
    let err = parse_err("let x := *;");
    assert_eq!(err.code, "E102");
    insta::assert_snapshot!(err.message, @"expected an expression, found `*`");
}

#[test]
fn test_missing_semicolon() {
    let err = parse_err("let x := 1");
    insta::assert_snapshot!(err.message, @"expected `;`, found end of file");
}

#[test]
fn test_loops() {
    let program = program(
        "while i < 3 { i++; } for j := 0; j < 3; j++ { } foreach v, i in [1, 2] { }",
    );
    assert!(matches!(program.contents[0], Stmt::While { .. }));
    assert!(matches!(program.contents[1], Stmt::For(_)));
    let Stmt::Foreach(stmt) = &program.contents[2] else {
        panic!("expected foreach");
    };
    assert_eq!(stmt.index.as_ref().map(|i| i.name.as_str()), Some("i"));
}

#[test]
fn test_imports_are_collected() {
    let program = program("import \"math\"; import { sqrt, pow } from \"math\"; let x := 1;");
    assert_eq!(program.imports.len(), 2);
    assert_eq!(program.imports[1].names.len(), 2);
    assert_eq!(program.contents.len(), 1);
    assert_eq!(program.module_name, "test");
}

#[test]
fn test_module_declaration_names_program() {
    let program = program("module geometry; let x := 1;");
    assert_eq!(program.module_name, "geometry");
    assert_eq!(program.contents.len(), 1);
}

#[test]
fn test_module_is_still_an_identifier() {
    let program = program("let module := 2; module;");
    assert_eq!(program.module_name, "test");
    assert_eq!(program.contents.len(), 2);
}

#[test]
fn test_duplicate_module_declaration() {
    let err = parse_err("module a; module b;");
    assert_eq!(err.code, "E117");
    insta::assert_snapshot!(err.message, @"module name is already declared as `a`");
}

#[test]
fn test_nested_import_is_rejected() {
    assert_eq!(parse_err("fn f() { import \"math\"; }").code, "E114");
}

#[test]
fn test_spans_cover_node() {
    let program = program("let total := 1 + 2;");
    let span = program.contents[0].span();
    assert_eq!(span.start.offset, 0);
    assert_eq!(span.end.offset, 19);
}

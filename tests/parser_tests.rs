use sksl::modifiers::{ModifierFlags, Primitive};
use sksl::parser::ast::{BinaryOp, Declaration, ExprKind, Program, StmtKind};

fn parse(source: &str) -> Program {
    let (program, diagnostics) = sksl::parser::parse(sksl::lexer::tokenize(source));
    assert!(diagnostics.is_empty(), "unexpected errors:\n{}", diagnostics);
    program
}

fn parse_errors(source: &str) -> String {
    let (_, diagnostics) = sksl::parser::parse(sksl::lexer::tokenize(source));
    diagnostics.to_string()
}

#[test]
fn parses_global_declarations() {
    let program = parse("uniform float4 color; in half2 a, b[3];");
    assert_eq!(program.declarations.len(), 2);
    match &program.declarations[0] {
        Declaration::Variables(decl) => {
            assert!(decl.modifiers.flags.contains(ModifierFlags::UNIFORM));
            assert_eq!(decl.type_name, "float4");
            assert_eq!(decl.vars[0].name, "color");
        }
        other => panic!("expected variables, got {:?}", other),
    }
    match &program.declarations[1] {
        Declaration::Variables(decl) => {
            assert_eq!(decl.vars.len(), 2);
            assert_eq!(decl.vars[1].name, "b");
            assert_eq!(decl.vars[1].sizes.len(), 1);
        }
        other => panic!("expected variables, got {:?}", other),
    }
}

#[test]
fn parses_layout_only_declarations() {
    let program = parse("layout(points) in; layout(line_strip, max_vertices = 4) out;");
    let layouts: Vec<_> = program
        .declarations
        .iter()
        .map(|decl| match decl {
            Declaration::Modifiers { modifiers, .. } => modifiers.layout.clone(),
            other => panic!("expected modifiers, got {:?}", other),
        })
        .collect();
    assert_eq!(layouts[0].primitive, Some(Primitive::Points));
    assert_eq!(layouts[1].primitive, Some(Primitive::LineStrip));
    assert_eq!(layouts[1].max_vertices, Some(4));
}

#[test]
fn parses_function_with_prototype() {
    let program = parse("float f(inout float x); float f(inout float x) { return x; }");
    let functions: Vec<_> = program
        .declarations
        .iter()
        .filter_map(|decl| match decl {
            Declaration::Function(function) => Some(function),
            _ => None,
        })
        .collect();
    assert_eq!(functions.len(), 2);
    assert!(functions[0].body.is_none());
    assert!(functions[1].body.is_some());
    let flags = functions[1].params[0].modifiers.flags;
    assert!(flags.contains(ModifierFlags::IN | ModifierFlags::OUT));
}

#[test]
fn binary_precedence_binds_multiplication_tighter() {
    let program = parse("void main() { x = 1 + 2 * 3; }");
    let Declaration::Function(main) = &program.declarations[0] else {
        panic!("expected a function");
    };
    let Some(body) = &main.body else {
        panic!("expected a body");
    };
    let StmtKind::Block(stmts) = &body.kind else {
        panic!("expected a block");
    };
    let StmtKind::Expression(expr) = &stmts[0].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Binary { op, right, .. } = &expr.kind else {
        panic!("expected an assignment");
    };
    assert_eq!(*op, BinaryOp::Assign);
    let ExprKind::Binary { op, right, .. } = &right.kind else {
        panic!("expected an addition");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Multiply, .. }));
}

#[test]
fn parses_every_statement_form() {
    let program = parse(
        "void main() {
            int i = 0;
            if (i < 1) i++; else { --i; }
            for (int j = 0; j < 2; j++) continue;
            while (false) break;
            do { i += 2; } while (i < 10);
            switch (i) { case 1: break; default: discard; }
            @if (true) {}
            @switch (1) { case 1: break; }
            ;
            return;
        }",
    );
    let Declaration::Function(main) = &program.declarations[0] else {
        panic!("expected a function");
    };
    let Some(body) = &main.body else {
        panic!("expected a body");
    };
    let StmtKind::Block(stmts) = &body.kind else {
        panic!("expected a block");
    };
    assert!(matches!(stmts[0].kind, StmtKind::VarDeclarations(_)));
    assert!(matches!(stmts[1].kind, StmtKind::If { is_static: false, .. }));
    assert!(matches!(stmts[2].kind, StmtKind::For { .. }));
    assert!(matches!(stmts[3].kind, StmtKind::While { .. }));
    assert!(matches!(stmts[4].kind, StmtKind::Do { .. }));
    assert!(matches!(stmts[5].kind, StmtKind::Switch { is_static: false, .. }));
    assert!(matches!(stmts[6].kind, StmtKind::If { is_static: true, .. }));
    assert!(matches!(stmts[7].kind, StmtKind::Switch { is_static: true, .. }));
    assert!(matches!(stmts[8].kind, StmtKind::Empty));
    assert!(matches!(stmts[9].kind, StmtKind::Return(None)));
}

#[test]
fn parses_structs_and_interface_blocks() {
    let program = parse(
        "struct Light { float3 dir; half intensity; } sun;
         uniform Block { float4 a; float b[]; } blocks[2];",
    );
    assert!(program
        .declarations
        .iter()
        .any(|decl| matches!(
            decl,
            Declaration::Struct(s) if s.name == "Light" && s.fields.len() == 2
        )));
    let block = program
        .declarations
        .iter()
        .find_map(|decl| match decl {
            Declaration::InterfaceBlock(block) => Some(block),
            _ => None,
        })
        .expect("interface block");
    assert_eq!(block.type_name, "Block");
    assert_eq!(block.instance.as_deref(), Some("blocks"));
    assert_eq!(block.sizes.len(), 1);
}

#[test]
fn parses_enums() {
    let program = parse("enum class Mode { kA, kB = 3 };");
    let Declaration::Enum(decl) = &program.declarations[0] else {
        panic!("expected an enum");
    };
    assert!(decl.is_class);
    assert_eq!(decl.values.len(), 2);
    assert!(decl.values[1].value.is_some());
}

#[test]
fn recovers_after_a_syntax_error() {
    let errors = parse_errors("void main() { x = ; }\nvoid f() { y = ; }");
    assert_eq!(
        errors,
        "error: 1: expected expression, but found ';'\n\
         error: 2: expected expression, but found ';'\n\
         2 errors\n"
    );
}

#[test]
fn reports_missing_semicolon() {
    assert_eq!(
        parse_errors("void main() { float x; x = 1.5 2.5; }"),
        "error: 1: expected ';', but found '2.5'\n1 error\n"
    );
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let source = format!(
        "void main() {{ float x = {}1{}; }}",
        "(".repeat(200),
        ")".repeat(200)
    );
    assert_eq!(
        parse_errors(&source),
        "error: 1: exceeded max parse depth\n1 error\n"
    );

    let blocks = format!("void main() {{ {}{} }}", "{".repeat(300), "}".repeat(300));
    assert_eq!(
        parse_errors(&blocks),
        "error: 1: exceeded max parse depth\n1 error\n"
    );

    let sum = format!("void main() {{ int x = 1{}; }}", " + 1".repeat(1000));
    assert_eq!(
        parse_errors(&sum),
        "error: 1: exceeded max parse depth\n1 error\n"
    );

    let fields = format!("void main() {{ v{} = 1; }}", ".x".repeat(500));
    assert_eq!(
        parse_errors(&fields),
        "error: 1: exceeded max parse depth\n1 error\n"
    );

    let negations = format!("void main() {{ int x = {}1; }}", "-".repeat(500));
    assert_eq!(
        parse_errors(&negations),
        "error: 1: exceeded max parse depth\n1 error\n"
    );
}

#[test]
fn moderate_nesting_parses() {
    let source = format!(
        "void main() {{ float x = {}1{}; }}",
        "(".repeat(20),
        ")".repeat(20)
    );
    parse(&source);
}

#[test]
fn parsing_continues_after_the_depth_limit() {
    let source = format!(
        "void main() {{ float x = {}1{}; y = ; }}",
        "(".repeat(100),
        ")".repeat(100)
    );
    assert_eq!(
        parse_errors(&source),
        "error: 1: exceeded max parse depth\n\
         error: 1: expected expression, but found ';'\n\
         2 errors\n"
    );
}

#[test]
fn type_led_statements_are_declarations() {
    assert_eq!(
        parse_errors("void main() {\n int x = ;\n int y = ;\n}\nvoid f() { float = 1; }"),
        "error: 2: expected expression, but found ';'\n\
         error: 3: expected expression, but found ';'\n\
         error: 5: expected an identifier, but found '='\n\
         3 errors\n"
    );
    assert_eq!(
        parse_errors("void main() { float; }"),
        "error: 1: expected an identifier, but found ';'\n1 error\n"
    );
    parse("void main() { float4(1); }");
}

use std::sync::Arc;
use std::thread;

use sksl::caps::ShaderCapsFactory;
use sksl::ir::{
    BinaryOp, Builtin, ConstValue, Element, Expr, ExprKind, Program, RefKind, Stmt, StmtKind,
    Storage,
};
use sksl::types::{ScalarKind, Type};
use sksl::ProgramKind;

fn compile(source: &str, kind: ProgramKind) -> Program {
    sksl::compile_to_ir(source, kind, &ShaderCapsFactory::default_caps())
        .unwrap_or_else(|errors| panic!("unexpected errors:\n{}", errors))
}

fn variable<'a>(program: &'a Program, name: &str) -> &'a sksl::ir::Variable {
    program
        .variables
        .iter()
        .map(|(_, var)| var)
        .find(|var| var.name == name)
        .unwrap_or_else(|| panic!("no variable named {}", name))
}

#[test]
fn const_initializers_are_folded() {
    let program = compile(
        "void main() { const int x = 2 + 3 * 4; const bool b = x > 10; }",
        ProgramKind::Fragment,
    );
    assert_eq!(variable(&program, "x").constant, Some(ConstValue::Int(14)));
    assert_eq!(variable(&program, "b").constant, Some(ConstValue::Bool(true)));
}

#[test]
fn locals_and_parameters_record_their_storage() {
    let program = compile(
        "float f(float a) { float b = a; return b; } void main() { f(1); }",
        ProgramKind::Fragment,
    );
    assert_eq!(variable(&program, "a").storage, Storage::Parameter);
    assert_eq!(variable(&program, "b").storage, Storage::Local);
}

#[test]
fn builtins_depend_on_program_kind() {
    let fragment = compile("void main() { sk_FragColor = half4(1); }", ProgramKind::Fragment);
    assert_eq!(
        variable(&fragment, "sk_FragColor").builtin,
        Some(Builtin::FragColor)
    );

    let vertex = compile("void main() { sk_Position = float4(1); }", ProgramKind::Vertex);
    assert_eq!(variable(&vertex, "sk_Position").builtin, Some(Builtin::Position));

    let errors = sksl::compile_to_ir(
        "void main() { sk_Position = float4(1); }",
        ProgramKind::Fragment,
        &ShaderCapsFactory::default_caps(),
    )
    .expect_err("sk_Position is not visible to fragment programs");
    assert_eq!(errors.messages(), vec!["unknown identifier 'sk_Position'"]);
}

#[test]
fn struct_types_keep_their_fields() {
    let program = compile(
        "struct Light { float3 dir; half intensity; }; uniform Light light;
         void main() { sk_FragColor = half4(light.intensity); }",
        ProgramKind::Fragment,
    );
    let Type::Struct(light) = &variable(&program, "light").ty else {
        panic!("expected a struct type");
    };
    assert_eq!(light.name, "Light");
    let fields: Vec<_> = light.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(fields, ["dir", "intensity"]);
    assert_eq!(light.fields[1].ty, Type::Scalar(ScalarKind::Half));
}

#[test]
fn overloads_are_resolved_by_argument_types() {
    let program = compile(
        "float pick(float x) { return x; }
         float pick(float2 x) { return x.y; }
         void main() { float a = pick(1.0) + pick(float2(1, 2)); }",
        ProgramKind::Fragment,
    );
    let overloads = program
        .functions
        .iter()
        .filter(|(_, decl)| decl.name == "pick")
        .count();
    assert_eq!(overloads, 2);
    let described: Vec<String> = program
        .functions
        .iter()
        .filter(|(_, decl)| decl.name == "pick")
        .map(|(id, _)| program.describe_function(id))
        .collect();
    assert_eq!(described, ["float pick(float x)", "float pick(float2 x)"]);
}

#[test]
fn global_order_is_preserved() {
    let program = compile(
        "uniform float a; in float b; void helper() {} void main() { helper(); }",
        ProgramKind::Vertex,
    );
    let kinds: Vec<&str> = program
        .elements
        .iter()
        .map(|element| match element {
            Element::GlobalVar(_) => "global",
            Element::Function(_) => "function",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["global", "global", "function", "function"]);
}

fn main_body(program: &Program) -> Stmt {
    program.main().expect("main is defined").body.clone()
}

/// Rewrites `x op= y` statements into `x = x op y`.
fn expand_compound(stmt: &mut Stmt) {
    let StmtKind::Block { stmts, .. } = &mut stmt.kind else {
        return;
    };
    for stmt in stmts {
        let StmtKind::Expr(expr) = &mut stmt.kind else {
            continue;
        };
        let ExprKind::Binary { left, op, right } = &expr.kind else {
            continue;
        };
        let op = match op {
            BinaryOp::AddAssign => BinaryOp::Add,
            BinaryOp::MultiplyAssign => BinaryOp::Multiply,
            _ => continue,
        };
        let with_access = |access| {
            let mut target = (**left).clone();
            if let ExprKind::Variable { access: current, .. } = &mut target.kind {
                *current = access;
            }
            target
        };
        let ty = expr.ty.clone();
        let value = Expr::binary(with_access(RefKind::Read), op, (**right).clone(), ty.clone());
        *expr = Expr::binary(with_access(RefKind::Write), BinaryOp::Assign, value, ty);
    }
}

#[test]
fn compound_assignment_matches_its_expansion() {
    let expanded = compile(
        "void main() { int x = 0; x = x + 1; half h = 2; h = h * 3; }",
        ProgramKind::Fragment,
    );
    let compound = compile(
        "void main() { int x = 0; x += 1; half h = 2; h *= 3; }",
        ProgramKind::Fragment,
    );
    let mut body = main_body(&compound);
    assert_ne!(body, main_body(&expanded));
    expand_compound(&mut body);
    assert_eq!(body, main_body(&expanded));
}

#[test]
fn front_end_runs_concurrently() {
    let caps = Arc::new(ShaderCapsFactory::default_caps());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let caps = Arc::clone(&caps);
            thread::spawn(move || {
                let source = format!(
                    "void main() {{ const int n = {}; sk_FragColor = half4(n); }}",
                    i
                );
                let program = sksl::compile_to_ir(&source, ProgramKind::Fragment, &caps)
                    .expect("valid program");
                variable(&program, "n").constant
            })
        })
        .collect();
    let values: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread finished"))
        .collect();
    assert_eq!(
        values,
        (0..4).map(|i| Some(ConstValue::Int(i))).collect::<Vec<_>>()
    );
}

use std::sync::Arc;

use crate::caps::DerivativeSupport;
use crate::ir::{Builtin, FunctionDecl, ProgramKind, Storage, Variable};
use crate::modifiers::{ModifierFlags, Modifiers};
use crate::symbols::Symbol;
use crate::types::{Field, ScalarKind, StructType, Type, BOOL, FLOAT, INT};

use super::Analyzer;

/// Parameter shapes of an intrinsic, instantiated once per family member.
#[derive(Clone, Copy)]
enum Shape {
    /// The generic type itself (`genType`).
    Gen,
    /// The scalar of the family (`float` for `genType`).
    Scalar,
    /// The bool vector matching the generic width.
    BoolGen,
    Bool,
}

const FLOAT_FAMILIES: [ScalarKind; 2] = [ScalarKind::Float, ScalarKind::Half];
const NUMBER_FAMILIES: [ScalarKind; 3] = [ScalarKind::Float, ScalarKind::Half, ScalarKind::Int];

impl Analyzer<'_> {
    pub(super) fn declare_builtins(&mut self) {
        let float4 = vector(ScalarKind::Float, 4);
        match self.kind {
            ProgramKind::Fragment => {
                let half4 = vector(ScalarKind::Half, 4);
                self.builtin_var("sk_FragColor", out_flags(), half4, Builtin::FragColor);
                self.builtin_var("sk_FragCoord", in_flags(), float4, Builtin::FragCoord);
                self.builtin_var("sk_Clockwise", in_flags(), BOOL, Builtin::Clockwise);
            }
            ProgramKind::Vertex => {
                self.builtin_var("sk_Position", out_flags(), float4, Builtin::Position);
                self.builtin_var("sk_PointSize", out_flags(), FLOAT, Builtin::PointSize);
                self.builtin_var("sk_VertexID", in_flags(), INT, Builtin::VertexId);
                self.builtin_var("sk_InstanceID", in_flags(), INT, Builtin::InstanceId);
            }
            ProgramKind::Geometry => {
                let per_vertex = StructType {
                    name: "sk_PerVertex".to_string(),
                    fields: vec![
                        Field {
                            modifiers: Modifiers::default(),
                            name: "sk_Position".to_string(),
                            ty: float4.clone(),
                        },
                        Field {
                            modifiers: Modifiers::default(),
                            name: "sk_PointSize".to_string(),
                            ty: FLOAT,
                        },
                    ],
                    is_interface_block: true,
                };
                let sk_in = Type::Array(Box::new(Type::Struct(Arc::new(per_vertex))), None);
                self.builtin_var("sk_in", in_flags(), sk_in, Builtin::PerVertexIn);
                self.builtin_var("sk_Position", out_flags(), float4, Builtin::Position);
                self.builtin_var("sk_PointSize", out_flags(), FLOAT, Builtin::PointSize);
                self.builtin_var("sk_InvocationID", in_flags(), INT, Builtin::InvocationId);
                for name in ["EmitVertex", "EndPrimitive"] {
                    self.intrinsic_fn(name, Type::Void, Vec::new());
                }
            }
        }

        self.declare_intrinsics();
    }

    fn builtin_var(&mut self, name: &str, flags: ModifierFlags, ty: Type, builtin: Builtin) {
        let mut var = Variable::new(name, ty, Modifiers::with_flags(flags), Storage::Global, 0);
        var.builtin = Some(builtin);
        let id = self.program.variables.alloc(var);
        // The root scope is empty when builtins are declared.
        let _ = self.symbols.declare(name, Symbol::Variable(id));
    }

    fn declare_intrinsics(&mut self) {
        use Shape::{Bool, BoolGen, Gen, Scalar};

        const UNARY: [&str; 19] = [
            "radians", "degrees", "sin", "cos", "tan", "asin", "acos", "atan", "exp", "log",
            "exp2", "log2", "sqrt", "inversesqrt", "floor", "ceil", "fract", "normalize",
            "saturate",
        ];
        for family in FLOAT_FAMILIES {
            for name in UNARY {
                self.generic(name, family, Gen, &[Gen]);
            }
            for name in ["atan", "pow", "reflect", "step"] {
                self.generic(name, family, Gen, &[Gen, Gen]);
            }
            for name in ["mix", "smoothstep", "faceforward"] {
                self.generic(name, family, Gen, &[Gen, Gen, Gen]);
            }
            self.generic("mod", family, Gen, &[Gen, Gen]);
            self.generic_vectors("mod", family, Gen, &[Gen, Scalar]);
            self.generic_vectors("mix", family, Gen, &[Gen, Gen, Scalar]);
            self.generic_vectors("step", family, Gen, &[Scalar, Gen]);
            self.generic_vectors("smoothstep", family, Gen, &[Scalar, Scalar, Gen]);
            self.generic("refract", family, Gen, &[Gen, Gen, Scalar]);
            self.generic("length", family, Scalar, &[Gen]);
            self.generic("distance", family, Scalar, &[Gen, Gen]);
            self.generic("dot", family, Scalar, &[Gen, Gen]);
            let v3 = vector(family, 3);
            self.intrinsic_fn("cross", v3.clone(), vec![v3.clone(), v3]);

            for n in 2..=4u8 {
                let square = Type::Matrix(family, n, n);
                self.intrinsic_fn("inverse", square.clone(), vec![square.clone()]);
                self.intrinsic_fn("determinant", Type::Scalar(family), vec![square]);
                for rows in 2..=4u8 {
                    self.intrinsic_fn(
                        "transpose",
                        Type::Matrix(family, rows, n),
                        vec![Type::Matrix(family, n, rows)],
                    );
                }
            }

            if self.kind == ProgramKind::Fragment
                && self.caps.derivatives != DerivativeSupport::Unsupported
            {
                for name in ["dFdx", "dFdy", "fwidth"] {
                    self.generic(name, family, Gen, &[Gen]);
                }
            }
        }

        for family in NUMBER_FAMILIES {
            self.generic("abs", family, Gen, &[Gen]);
            self.generic("sign", family, Gen, &[Gen]);
            for name in ["min", "max"] {
                self.generic(name, family, Gen, &[Gen, Gen]);
                self.generic_vectors(name, family, Gen, &[Gen, Scalar]);
            }
            self.generic("clamp", family, Gen, &[Gen, Gen, Gen]);
            self.generic_vectors("clamp", family, Gen, &[Gen, Scalar, Scalar]);
            for name in ["lessThan", "lessThanEqual", "greaterThan", "greaterThanEqual"] {
                self.generic_vectors(name, family, BoolGen, &[Gen, Gen]);
            }
        }
        for family in [ScalarKind::Float, ScalarKind::Half, ScalarKind::Int, ScalarKind::Bool] {
            for name in ["equal", "notEqual"] {
                self.generic_vectors(name, family, BoolGen, &[Gen, Gen]);
            }
        }
        for name in ["any", "all"] {
            self.generic_vectors(name, ScalarKind::Bool, Bool, &[Gen]);
        }
        self.generic_vectors("not", ScalarKind::Bool, Gen, &[Gen]);

        self.intrinsic_fn(
            "sample",
            vector(ScalarKind::Half, 4),
            vec![Type::Sampler2D, vector(ScalarKind::Float, 2)],
        );
    }

    /// Declares `name` for every width 1-4 of `family`.
    fn generic(&mut self, name: &str, family: ScalarKind, ret: Shape, params: &[Shape]) {
        for width in 1..=4 {
            self.instantiate(name, family, width, ret, params);
        }
    }

    /// Declares `name` for widths 2-4 only, for overloads whose scalar
    /// instance would duplicate a [`Self::generic`] one.
    fn generic_vectors(&mut self, name: &str, family: ScalarKind, ret: Shape, params: &[Shape]) {
        for width in 2..=4 {
            self.instantiate(name, family, width, ret, params);
        }
    }

    fn instantiate(
        &mut self,
        name: &str,
        family: ScalarKind,
        width: u8,
        ret: Shape,
        params: &[Shape],
    ) {
        let resolve = |shape: Shape| match shape {
            Shape::Gen => Type::compound(family, width, 1),
            Shape::Scalar => Type::Scalar(family),
            Shape::BoolGen => Type::compound(ScalarKind::Bool, width, 1),
            Shape::Bool => BOOL,
        };
        let params = params.iter().map(|shape| resolve(*shape)).collect();
        self.intrinsic_fn(name, resolve(ret), params);
    }

    fn intrinsic_fn(&mut self, name: &str, return_type: Type, params: Vec<Type>) {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(i, ty)| {
                self.program.variables.alloc(Variable::new(
                    format!("p{}", i),
                    ty,
                    Modifiers::default(),
                    Storage::Parameter,
                    0,
                ))
            })
            .collect();
        let mut decl = FunctionDecl::new(name, return_type, 0);
        decl.params = params;
        decl.builtin = true;
        if matches!(name, "EmitVertex" | "EndPrimitive") {
            decl.modifiers.flags |= ModifierFlags::HAS_SIDE_EFFECTS;
        }
        let id = self.program.functions.alloc(decl);
        let _ = self.symbols.declare_function(name, id);
    }
}

fn vector(scalar: ScalarKind, n: u8) -> Type {
    Type::Vector(scalar, n)
}

fn in_flags() -> ModifierFlags {
    ModifierFlags::IN
}

fn out_flags() -> ModifierFlags {
    ModifierFlags::OUT
}

//! End-to-end GLSL generation tests.

use sksl::caps::{ShaderCaps, ShaderCapsFactory};
use sksl::ProgramKind;
use sksl_glsl::{Compiler, GlslProgram};

fn compile(caps: ShaderCaps, kind: ProgramKind, source: &str) -> GlslProgram {
    match Compiler::new(caps).compile(kind, source) {
        Ok(program) => program,
        Err(err) => panic!("compiling {:?} failed:\n{}", source, err),
    }
}

fn fragment(caps: ShaderCaps, source: &str) -> String {
    compile(caps, ProgramKind::Fragment, source).source
}

const GEOMETRY: &str = "layout(points) in;\
    layout(invocations = 2) in;\
    layout(line_strip, max_vertices = 2) out;\
    void main() {\
    sk_Position = sk_in[0].sk_Position + float4(-0.5, 0, 0, sk_InvocationID);\
    EmitVertex();\
    sk_Position = sk_in[0].sk_Position + float4(0.5, 0, 0, sk_InvocationID);\
    EmitVertex();\
    EndPrimitive();\
    }";

#[test]
fn derivatives_are_native_by_default() {
    assert_eq!(
        fragment(
            ShaderCapsFactory::default_caps(),
            "void main() { sk_FragColor.r = half(dFdx(1)); }"
        ),
        "#version 400\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         sk_FragColor.x = dFdx(1.0);\n\
         }\n"
    );
}

#[test]
fn derivative_extension_is_only_required_when_used() {
    assert_eq!(
        fragment(
            ShaderCapsFactory::shader_derivative_extension_string(),
            "void main() { sk_FragColor.r = 1; }"
        ),
        "#version 400\n\
         precision mediump float;\n\
         precision mediump sampler2D;\n\
         out mediump vec4 sk_FragColor;\n\
         void main() {\n    \
         sk_FragColor.x = 1.0;\n\
         }\n"
    );
    assert_eq!(
        fragment(
            ShaderCapsFactory::shader_derivative_extension_string(),
            "void main() { sk_FragColor.r = half(dFdx(1)); }"
        ),
        "#version 400\n\
         #extension GL_OES_standard_derivatives : require\n\
         precision mediump float;\n\
         precision mediump sampler2D;\n\
         out mediump vec4 sk_FragColor;\n\
         void main() {\n    \
         sk_FragColor.x = dFdx(1.0);\n\
         }\n"
    );
}

#[test]
fn flipped_targets_negate_dfdy() {
    let source =
        "void main() { sk_FragColor.r = half(dFdx(1)), sk_FragColor.g = half(dFdy(1)); }";
    assert_eq!(
        fragment(ShaderCapsFactory::default_caps(), source),
        "#version 400\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         (sk_FragColor.x = dFdx(1.0) , sk_FragColor.y = dFdy(1.0));\n\
         }\n"
    );
    assert_eq!(
        fragment(ShaderCapsFactory::default_caps().with_flip_y(true), source),
        "#version 400\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         (sk_FragColor.x = dFdx(1.0) , sk_FragColor.y = -dFdy(1.0));\n\
         }\n"
    );
}

const FRAG_COORD: &str = "void main() { sk_FragColor.xy = half2(sk_FragCoord.xy); }";

#[test]
fn frag_coord_with_legacy_origin_extension() {
    let program = compile(
        ShaderCapsFactory::frag_coords_old().with_flip_y(true),
        ProgramKind::Fragment,
        FRAG_COORD,
    );
    assert_eq!(
        program.source,
        "#version 110\n\
         #extension GL_ARB_fragment_coord_conventions : require\n\
         layout(origin_upper_left) in vec4 gl_FragCoord;\n\
         void main() {\n    \
         gl_FragColor.xy = gl_FragCoord.xy;\n\
         }\n"
    );
    assert!(!program.inputs.rt_height);
}

#[test]
fn frag_coord_with_native_origin_layout() {
    let program = compile(
        ShaderCapsFactory::frag_coords_new().with_flip_y(true),
        ProgramKind::Fragment,
        FRAG_COORD,
    );
    assert_eq!(
        program.source,
        "#version 400\n\
         layout(origin_upper_left) in vec4 gl_FragCoord;\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         sk_FragColor.xy = gl_FragCoord.xy;\n\
         }\n"
    );
    assert!(!program.inputs.rt_height);
}

#[test]
fn frag_coord_flipped_through_height_uniform() {
    let program = compile(
        ShaderCapsFactory::default_caps().with_flip_y(true),
        ProgramKind::Fragment,
        FRAG_COORD,
    );
    assert_eq!(
        program.source,
        "#version 400\n\
         uniform float u_skRTHeight;\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         vec4 sk_FragCoord = vec4(gl_FragCoord.x, u_skRTHeight - gl_FragCoord.y, gl_FragCoord.z, gl_FragCoord.w);\n    \
         sk_FragColor.xy = sk_FragCoord.xy;\n\
         }\n"
    );
    assert!(program.inputs.rt_height);

    let program = compile(ShaderCapsFactory::default_caps(), ProgramKind::Fragment, FRAG_COORD);
    assert_eq!(
        program.source,
        "#version 400\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         sk_FragColor.xy = gl_FragCoord.xy;\n\
         }\n"
    );
    assert!(!program.inputs.rt_height);
}

#[test]
fn vertex_stage_forwards_position_when_frag_coord_is_unusable() {
    assert_eq!(
        compile(
            ShaderCapsFactory::cannot_use_frag_coord(),
            ProgramKind::Vertex,
            "in float4 pos; void main() { sk_Position = pos; }"
        )
        .source,
        "#version 400\n\
         out vec4 sk_FragCoord_Workaround;\n\
         in vec4 pos;\n\
         void main() {\n    \
         sk_FragCoord_Workaround = (gl_Position = pos);\n\
         }\n"
    );
    assert_eq!(
        compile(
            ShaderCapsFactory::cannot_use_frag_coord(),
            ProgramKind::Vertex,
            "uniform float4 sk_RTAdjust; in float4 pos; void main() { sk_Position = pos; }"
        )
        .source,
        "#version 400\n\
         out vec4 sk_FragCoord_Workaround;\n\
         uniform vec4 sk_RTAdjust;\n\
         in vec4 pos;\n\
         void main() {\n    \
         sk_FragCoord_Workaround = (gl_Position = pos);\n    \
         gl_Position = vec4(gl_Position.xy * sk_RTAdjust.xz + gl_Position.ww * sk_RTAdjust.yw, 0.0, gl_Position.w);\n\
         }\n"
    );
}

#[test]
fn fragment_stage_resolves_forwarded_position() {
    assert_eq!(
        fragment(ShaderCapsFactory::cannot_use_frag_coord(), FRAG_COORD),
        "#version 400\n\
         in vec4 sk_FragCoord_Workaround;\n\
         out vec4 sk_FragColor;\n\
         void main() {\n    \
         float sk_FragCoord_InvW = 1. / sk_FragCoord_Workaround.w;\n    \
         vec4 sk_FragCoord_Resolved = vec4(sk_FragCoord_Workaround.xyz * sk_FragCoord_InvW, sk_FragCoord_InvW);\n    \
         sk_FragCoord_Resolved.xy = floor(sk_FragCoord_Resolved.xy) + vec2(.5);\n    \
         sk_FragColor.xy = sk_FragCoord_Resolved.xy;\n\
         }\n"
    );
}

#[test]
fn geometry_shader_with_native_invocations() {
    assert_eq!(
        compile(
            ShaderCapsFactory::geometry_shader_support(),
            ProgramKind::Geometry,
            GEOMETRY
        )
        .source,
        "#version 400\n\
         layout (points) in ;\n\
         layout (invocations = 2) in ;\n\
         layout (line_strip, max_vertices = 2) out ;\n\
         void main() {\n    \
         gl_Position = gl_in[0].gl_Position + vec4(-0.5, 0.0, 0.0, float(gl_InvocationID));\n    \
         EmitVertex();\n    \
         gl_Position = gl_in[0].gl_Position + vec4(0.5, 0.0, 0.0, float(gl_InvocationID));\n    \
         EmitVertex();\n    \
         EndPrimitive();\n\
         }\n"
    );
}

#[test]
fn emulated_invocations_loop_over_the_shader_body() {
    let source = "layout(points) in;\
        layout(invocations = 2) in;\
        layout(line_strip, max_vertices = 2) out;\
        void test() {\
        sk_Position = sk_in[0].sk_Position + float4(0.5, 0, 0, sk_InvocationID);\
        EmitVertex();\
        }\
        void main() {\
        test();\
        sk_Position = sk_in[0].sk_Position + float4(-0.5, 0, 0, sk_InvocationID);\
        EmitVertex();\
        }";
    assert_eq!(
        compile(
            ShaderCapsFactory::no_gs_invocations_support(),
            ProgramKind::Geometry,
            source
        )
        .source,
        "#version 400\n\
         int sk_InvocationID;\n\
         layout (points) in ;\n\
         layout (line_strip, max_vertices = 4) out ;\n\
         void test() {\n    \
         gl_Position = gl_in[0].gl_Position + vec4(0.5, 0.0, 0.0, float(sk_InvocationID));\n    \
         EmitVertex();\n\
         }\n\
         void _invoke() {\n    \
         test();\n    \
         gl_Position = gl_in[0].gl_Position + vec4(-0.5, 0.0, 0.0, float(sk_InvocationID));\n    \
         EmitVertex();\n\
         }\n\
         void main() {\n    \
         for (sk_InvocationID = 0;sk_InvocationID < 2; sk_InvocationID++) {\n        \
         _invoke();\n        \
         EndPrimitive();\n    \
         }\n\
         }\n"
    );
}

const MULTI_INVOCATIONS: &str = "layout(points, invocations = 2) in;\
    layout(invocations = 3) in;\
    layout(line_strip, max_vertices = 2) out;\
    void main() {\
    sk_Position = sk_in[0].sk_Position + float4(-0.5, 0, 0, sk_InvocationID);\
    EmitVertex();\
    EndPrimitive();\
    }";

const MULTI_INVOCATIONS_BODY: &str = "layout (points, invocations = 2) in ;\n\
    layout (invocations = 3) in ;\n\
    layout (line_strip, max_vertices = 2) out ;\n\
    void main() {\n    \
    gl_Position = gl_in[0].gl_Position + vec4(-0.5, 0.0, 0.0, float(gl_InvocationID));\n    \
    EmitVertex();\n    \
    EndPrimitive();\n\
    }\n";

#[test]
fn invocation_extension_follows_the_version() {
    assert_eq!(
        compile(
            ShaderCapsFactory::gs_invocations_extension_string(),
            ProgramKind::Geometry,
            MULTI_INVOCATIONS
        )
        .source,
        format!(
            "#version 400\n#extension GL_ARB_gpu_shader5 : require\n{}",
            MULTI_INVOCATIONS_BODY
        )
    );
}

#[test]
fn geometry_extension_follows_the_version() {
    assert_eq!(
        compile(
            ShaderCapsFactory::geometry_shader_extension_string(),
            ProgramKind::Geometry,
            MULTI_INVOCATIONS
        )
        .source,
        format!(
            "#version 310es\n#extension GL_EXT_geometry_shader : require\n{}",
            MULTI_INVOCATIONS_BODY
        )
    );
}

#[test]
fn vertex_positions_are_normalized_at_the_end_of_main() {
    let program = compile(
        ShaderCapsFactory::default_caps(),
        ProgramKind::Vertex,
        "uniform float4 sk_RTAdjust; void main() { sk_Position = half4(1); }",
    );
    assert_eq!(
        program.source,
        "#version 400\n\
         uniform vec4 sk_RTAdjust;\n\
         void main() {\n    \
         gl_Position = vec4(1.0);\n    \
         gl_Position = vec4(gl_Position.xy * sk_RTAdjust.xz + gl_Position.ww * sk_RTAdjust.yw, 0.0, gl_Position.w);\n\
         }\n"
    );
    assert_eq!(program.inputs.uniforms.len(), 1);
    assert_eq!(program.inputs.uniforms[0].name, "sk_RTAdjust");
    assert_eq!(program.inputs.uniforms[0].ty, "vec4");
}

#[test]
fn geometry_positions_are_normalized_before_each_vertex() {
    let source = format!("uniform float4 sk_RTAdjust;{}", GEOMETRY);
    assert_eq!(
        compile(
            ShaderCapsFactory::geometry_shader_support(),
            ProgramKind::Geometry,
            &source
        )
        .source,
        "#version 400\n\
         uniform vec4 sk_RTAdjust;\n\
         layout (points) in ;\n\
         layout (invocations = 2) in ;\n\
         layout (line_strip, max_vertices = 2) out ;\n\
         void main() {\n    \
         gl_Position = gl_in[0].gl_Position + vec4(-0.5, 0.0, 0.0, float(gl_InvocationID));\n    \
         {\n        \
         gl_Position = vec4(gl_Position.xy * sk_RTAdjust.xz + gl_Position.ww * sk_RTAdjust.yw, 0.0, gl_Position.w);\n        \
         EmitVertex();\n    \
         }\n    \
         gl_Position = gl_in[0].gl_Position + vec4(0.5, 0.0, 0.0, float(gl_InvocationID));\n    \
         {\n        \
         gl_Position = vec4(gl_Position.xy * sk_RTAdjust.xz + gl_Position.ww * sk_RTAdjust.yw, 0.0, gl_Position.w);\n        \
         EmitVertex();\n    \
         }\n    \
         EndPrimitive();\n\
         }\n"
    );
}

const SHORT_PRECISION: &str = "uniform sampler2D tex;\
    in float2 texcoord;\
    in short2 offset;\
    void main() {\
        short scalar = offset.y;\
        sk_FragColor = sample(tex, texcoord + float2(offset * scalar));\
    }";

#[test]
fn precision_qualifiers_follow_the_declared_type() {
    assert_eq!(
        fragment(ShaderCapsFactory::uses_precision_modifiers(), SHORT_PRECISION),
        "#version 400\n\
         precision mediump float;\n\
         precision mediump sampler2D;\n\
         out mediump vec4 sk_FragColor;\n\
         uniform sampler2D tex;\n\
         in highp vec2 texcoord;\n\
         in mediump ivec2 offset;\n\
         void main() {\n    \
         mediump int scalar = offset.y;\n    \
         sk_FragColor = texture(tex, texcoord + vec2(offset * scalar));\n\
         }\n"
    );
}

#[test]
fn incomplete_short_precision_promotes_shorts_to_highp() {
    assert_eq!(
        fragment(ShaderCapsFactory::incomplete_short_int_precision(), SHORT_PRECISION),
        "#version 310es\n\
         precision mediump float;\n\
         precision mediump sampler2D;\n\
         out mediump vec4 sk_FragColor;\n\
         uniform sampler2D tex;\n\
         in highp vec2 texcoord;\n\
         in highp ivec2 offset;\n\
         void main() {\n    \
         highp int scalar = offset.y;\n    \
         sk_FragColor = texture(tex, texcoord + vec2(offset * scalar));\n\
         }\n"
    );
}

#[test]
fn do_while_loops_are_rewritten_when_requested() {
    let source = "void main() {\
        int i = 0;\
        do {\
          ++i;\
          do {\
            i++;\
          } while (true);\
        } while (i < 10);\
        sk_FragColor = half4(i);\
    }";
    let expected = r#"#version 400
out vec4 sk_FragColor;
void main() {
    int i = 0;
    bool _tmpLoopSeenOnce0 = false;
    while (true) {
        if (_tmpLoopSeenOnce0) {
            if (!(i < 10)) {
                break;
            }
        }
        _tmpLoopSeenOnce0 = true;
        {
            ++i;
            bool _tmpLoopSeenOnce1 = false;
            while (true) {
                if (_tmpLoopSeenOnce1) {
                    if (!true) {
                        break;
                    }
                }
                _tmpLoopSeenOnce1 = true;
                {
                    i++;
                }
            }
        }
    }
    sk_FragColor = vec4(float(i));
}
"#;
    assert_eq!(
        fragment(ShaderCapsFactory::rewrite_do_while_loops(), source),
        expected
    );

    let untouched = fragment(ShaderCapsFactory::default_caps(), source);
    assert!(untouched.contains("    do {\n        ++i;\n"));
    assert!(untouched.contains("} while (i < 10);\n"));
}

#[test]
fn legacy_targets_use_attribute_and_varying() {
    let vertex = compile(
        ShaderCapsFactory::version_110(),
        ProgramKind::Vertex,
        "in float4 pos; out half4 color; void main() { color = half4(pos); sk_Position = pos; }",
    );
    assert_eq!(
        vertex.source,
        "#version 110\n\
         attribute vec4 pos;\n\
         varying vec4 color;\n\
         void main() {\n    \
         color = pos;\n    \
         gl_Position = pos;\n\
         }\n"
    );
}

#[test]
fn saturate_lowers_to_clamp() {
    let source = fragment(
        ShaderCapsFactory::default_caps(),
        "in half x; void main() { sk_FragColor = half4(saturate(x)); }",
    );
    assert!(source.contains("sk_FragColor = vec4(clamp(x, 0.0, 1.0));\n"));
}

#[test]
fn clockwise_is_inverted_on_flipped_targets() {
    let source = "void main() { sk_FragColor = sk_Clockwise ? half4(1) : half4(0); }";
    assert!(fragment(ShaderCapsFactory::default_caps(), source)
        .contains("sk_FragColor = gl_FrontFacing ? vec4(1.0) : vec4(0.0);"));
    assert!(fragment(ShaderCapsFactory::default_caps().with_flip_y(true), source)
        .contains("sk_FragColor = (!gl_FrontFacing) ? vec4(1.0) : vec4(0.0);"));
}

#[test]
fn compilations_can_share_one_compiler() {
    let compiler = std::sync::Arc::new(Compiler::new(ShaderCapsFactory::default_caps()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiler = std::sync::Arc::clone(&compiler);
            std::thread::spawn(move || {
                let source = format!("void main() {{ sk_FragColor = half4({}); }}", i);
                compiler
                    .compile(ProgramKind::Fragment, &source)
                    .map(|program| program.source)
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let source = handle
            .join()
            .expect("thread finished")
            .expect("program compiles");
        assert!(source.contains(&format!("sk_FragColor = vec4({}.0);", i)));
    }
}

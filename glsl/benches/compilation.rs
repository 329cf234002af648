use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sksl::caps::ShaderCapsFactory;
use sksl::ProgramKind;
use sksl_glsl::Compiler;

const FRAGMENT: &str = "
uniform half4 color;
uniform sampler2D tex;
in float2 coords;

half4 blend(half4 src, half4 dst) {
    return src + (1 - src.a) * dst;
}

void main() {
    half4 base = sample(tex, coords);
    for (int i = 0; i < 4; i++) {
        base = blend(color, base);
    }
    if (sk_FragCoord.x > 10) {
        base.rgb = saturate(base.rgb * 2);
    }
    sk_FragColor = base;
}
";

const GEOMETRY: &str = "
layout(points) in;
layout(invocations = 2) in;
layout(line_strip, max_vertices = 2) out;

void main() {
    sk_Position = sk_in[0].sk_Position + float4(-0.5, 0, 0, sk_InvocationID);
    EmitVertex();
    sk_Position = sk_in[0].sk_Position + float4(0.5, 0, 0, sk_InvocationID);
    EmitVertex();
    EndPrimitive();
}
";

fn fragment_benchmark(c: &mut Criterion) {
    let compiler = Compiler::new(ShaderCapsFactory::frag_coords_old());
    c.bench_function("compile fragment", |b| {
        b.iter(|| compiler.compile(ProgramKind::Fragment, black_box(FRAGMENT)))
    });
}

fn geometry_benchmark(c: &mut Criterion) {
    let compiler = Compiler::new(ShaderCapsFactory::no_gs_invocations_support());
    c.bench_function("compile emulated geometry", |b| {
        b.iter(|| compiler.compile(ProgramKind::Geometry, black_box(GEOMETRY)))
    });
}

criterion_group!(benches, fragment_benchmark, geometry_benchmark);
criterion_main!(benches);

//! WGSL shader sources for the scene renderer

/// Fullscreen radial-gradient background pass
pub const BACKGROUND_SHADER: &str = r#"
struct BackgroundUniform {
    center_color: vec4<f32>,
    edge_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> background: BackgroundUniform;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    // One oversized triangle covering the viewport.
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var out: VertexOutput;
    let corner = corners[index];
    out.position = vec4<f32>(corner, 1.0, 1.0);
    out.uv = corner * 0.5 + vec2<f32>(0.5, 0.5);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Normalize so the farthest viewport corner reaches the edge color.
    let distance_to_center = distance(in.uv, vec2<f32>(0.5, 0.5)) / 0.70710678;
    let t = clamp(distance_to_center, 0.0, 1.0);
    return mix(background.center_color, background.edge_color, t);
}
"#;

/// Scene geometry: lit fill pass plus a flat entry point for edge lines
pub const MESH_SHADER: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.normal = in.normal;
    out.color = in.color;
    return out;
}

@fragment
fn fs_lit(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 0.4, 1.0));
    let shade = max(dot(normalize(in.normal), light_dir), 0.0) * 0.75 + 0.25;
    return vec4<f32>(in.color * shade, 1.0);
}

@fragment
fn fs_flat(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

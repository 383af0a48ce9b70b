/// WGSL shader for instanced lit boxes (targets and the view-model gun),
/// with linear distance fog toward the background color.
pub const BOX_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
    @location(2) color: vec4<f32>,
};

const BACKGROUND: vec3<f32> = vec3<f32>(0.066, 0.094, 0.153);
const FOG_END: f32 = 100.0;

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.world_pos = world_pos.xyz;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.4, 0.8, 0.6));
    let ambient = 0.45;
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    let lit = in.color.rgb * (ambient + diffuse * 0.8);

    let dist = distance(in.world_pos, uniforms.camera_pos.xyz);
    let fog = clamp(dist / FOG_END, 0.0, 1.0);
    return vec4<f32>(mix(lit, BACKGROUND, fog), in.color.a);
}
"#;

/// WGSL shader for the grid floor lines.
pub const GRID_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct GridVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) world_pos: vec3<f32>,
};

const BACKGROUND: vec3<f32> = vec3<f32>(0.066, 0.094, 0.153);
const FOG_END: f32 = 100.0;

@vertex
fn vs_grid(vertex: GridVertex) -> GridOutput {
    var out: GridOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    out.world_pos = vertex.position;
    return out;
}

@fragment
fn fs_grid(in: GridOutput) -> @location(0) vec4<f32> {
    let dist = distance(in.world_pos, uniforms.camera_pos.xyz);
    let fog = clamp(dist / FOG_END, 0.0, 1.0);
    return vec4<f32>(mix(in.color.rgb, BACKGROUND, fog), in.color.a);
}
"#;

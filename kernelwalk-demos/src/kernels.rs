//! Demo kernel sources (WGSL)
//!
//! Workgroup tokens (`{{WORKGROUP_X}}` etc.) are substituted by
//! `KernelSource::expand` before compilation. Every 1-D kernel recovers its
//! linear id across a folded 2-D dispatch.

// --- Hello World ---
pub const HELLO_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read_write> message: array<u32>;

@compute @workgroup_size({{WORKGROUP_X}})
fn hello(@builtin(global_invocation_id) gid: vec3<u32>) {
    // "Hello, World!"
    var text = array<u32, 13>(
        72u, 101u, 108u, 108u, 111u, 44u, 32u,
        87u, 111u, 114u, 108u, 100u, 33u
    );
    let i = gid.x;
    if (i >= arrayLength(&message) || i >= 13u) { return; }
    message[i] = text[i];
}
"#;

// --- Array Processing ---
pub const ARRAY_ADD_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read> a: array<f32>;
@group(0) @binding(1) var<storage, read> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> output: array<f32>;

@compute @workgroup_size({{WORKGROUP_X}})
fn array_add(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let i = gid.x + gid.y * groups.x * {{WORKGROUP_X}}u;
    if (i >= arrayLength(&output)) { return; }
    output[i] = a[i] + b[i];
}
"#;

// --- Multi-Dimensional Processing ---
pub const MULTIDIM_WGSL: &str = r#"
struct Dims {
    width: u32,
    height: u32,
    depth: u32,
    _pad: u32,
};

@group(0) @binding(0) var<storage, read> input: array<f32>;
@group(0) @binding(1) var<storage, read_write> output: array<f32>;
@group(0) @binding(2) var<uniform> dims: Dims;

@compute @workgroup_size({{WORKGROUP_X}}, {{WORKGROUP_Y}}, {{WORKGROUP_Z}})
fn multidim(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= dims.width || gid.y >= dims.height || gid.z >= dims.depth) { return; }
    let idx = gid.x + dims.width * (gid.y + dims.height * gid.z);
    output[idx] = input[idx] * 2.0 + f32(gid.x) + 10.0 * f32(gid.y) + 100.0 * f32(gid.z);
}
"#;

// --- Reduction ---
// Tree reduction in workgroup memory, one partial sum per workgroup.
pub const REDUCE_SUM_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read> input: array<f32>;
@group(0) @binding(1) var<storage, read_write> partials: array<f32>;

var<workgroup> scratch: array<f32, {{WORKGROUP_SIZE}}>;

@compute @workgroup_size({{WORKGROUP_X}})
fn reduce_sum(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(workgroup_id) wid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let i = gid.x + gid.y * groups.x * {{WORKGROUP_X}}u;
    var value = 0.0;
    if (i < arrayLength(&input)) {
        value = input[i];
    }
    scratch[lid.x] = value;
    workgroupBarrier();

    for (var stride = {{WORKGROUP_X}}u / 2u; stride > 0u; stride = stride / 2u) {
        if (lid.x < stride) {
            scratch[lid.x] = scratch[lid.x] + scratch[lid.x + stride];
        }
        workgroupBarrier();
    }

    if (lid.x == 0u) {
        partials[wid.x + wid.y * groups.x] = scratch[0];
    }
}
"#;

// --- Large Loops ---
pub const LARGE_LOOPS_WGSL: &str = r#"
struct Params {
    len: u32,
    iterations: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0) var<storage, read_write> output: array<u32>;
@group(0) @binding(1) var<uniform> params: Params;

@compute @workgroup_size({{WORKGROUP_X}})
fn large_loops(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let i = gid.x + gid.y * groups.x * {{WORKGROUP_X}}u;
    if (i >= params.len) { return; }
    var acc = 0u;
    for (var k = 0u; k < params.iterations; k = k + 1u) {
        acc = acc + (i + k) % 7u;
    }
    output[i] = acc;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use kernelwalk_backend::KernelSource;

    #[test]
    fn every_token_is_substituted() {
        for (label, src) in [
            ("hello", HELLO_WGSL),
            ("arrays", ARRAY_ADD_WGSL),
            ("multidim", MULTIDIM_WGSL),
            ("reduction", REDUCE_SUM_WGSL),
            ("large_loops", LARGE_LOOPS_WGSL),
        ] {
            let expanded = KernelSource::new(label, src, &[])
                .with_workgroup_size([64, 1, 1])
                .expand();
            assert!(!expanded.contains("{{"), "{label} still has tokens");
        }
    }

    #[test]
    fn reduction_scratch_matches_workgroup() {
        let expanded = KernelSource::new("reduction", REDUCE_SUM_WGSL, &[])
            .with_workgroup_size([128, 1, 1])
            .expand();
        assert!(expanded.contains("array<f32, 128>"));
        assert!(expanded.contains("@workgroup_size(128)"));
    }
}

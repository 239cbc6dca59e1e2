use kernelwalk_backend::{
    round_trip, DeviceBuffer, DeviceSelector, Dispatch, GpuContext, IndexSpace, KernelSource,
    Program,
};

const SHADER: &str = r#"
@group(0) @binding(0) var<storage, read> a: array<f32>;
@group(0) @binding(1) var<storage, read> b: array<f32>;
@group(0) @binding(2) var<storage, read> c: array<f32>;
@group(0) @binding(3) var<storage, read_write> output: array<f32>;

@compute @workgroup_size({{WORKGROUP_X}})
fn fused(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= arrayLength(&output)) { return; }
    output[i] = (a[i] + b[i]) * c[i];
}
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    pollster::block_on(async {
        let ctx = GpuContext::new(&DeviceSelector::default()).await?;
        let source = KernelSource::new("fused", SHADER, &["fused"]).with_workgroup_size([64, 1, 1]);
        let program = Program::build(&ctx, &source).await?;
        let kernel = program.kernel("fused").await?;

        let a = DeviceBuffer::from_slice(&ctx, "a", &[1.0f32, 2.0, 3.0, 4.0])?;
        let b = DeviceBuffer::from_slice(&ctx, "b", &[5.0f32, 6.0, 7.0, 8.0])?;
        let c = DeviceBuffer::from_slice(&ctx, "c", &[2.0f32; 4])?;
        let out = DeviceBuffer::<f32>::zeroed(&ctx, "out", 4)?;

        println!("Executing (A + B) * C...");
        let dispatch = Dispatch::new(&kernel)
            .arg(0, &a)
            .arg(1, &b)
            .arg(2, &c)
            .arg(3, &out);
        let result = round_trip(&ctx, &dispatch, IndexSpace::linear(4), &out).await?;
        println!("Result: {:?}", result.data);

        // Verification: (1+5)*2=12, (2+6)*2=16, (3+7)*2=20, (4+8)*2=24
        assert_eq!(result.data, vec![12.0, 16.0, 20.0, 24.0]);
        println!("Verification Successful!");
        Ok(())
    })
}

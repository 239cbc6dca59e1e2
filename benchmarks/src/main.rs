//! Round-trip timing sweep
//!
//! Splits one host/device round-trip into upload, dispatch and read-back.
//! Run with: cargo run -p kernelwalk-benchmarks --release

use kernelwalk_backend::{
    wgpu, DeviceBuffer, DeviceSelector, Dispatch, GpuContext, IndexSpace, Kernel, KernelSource,
    Program,
};
use kernelwalk_demos::kernels::ARRAY_ADD_WGSL;
use kernelwalk_demos::report::print_device_info;
use std::time::{Duration, Instant};

const WARMUP_ITERS: usize = 5;
const BENCH_ITERS: usize = 50;

fn main() {
    env_logger::init();
    println!("======================================================================");
    println!("             KERNELWALK - ROUND-TRIP BENCHMARKS                       ");
    println!("======================================================================");
    println!();

    let ctx = match GpuContext::new_blocking(&DeviceSelector::default()) {
        Ok(ctx) => ctx,
        Err(e) => {
            println!("[ERROR] {}", e);
            return;
        }
    };
    print_device_info(&ctx);

    let source = KernelSource::new("arrays", ARRAY_ADD_WGSL, &["array_add"])
        .with_workgroup_size([64, 1, 1]);
    let kernel = pollster::block_on(async {
        let program = Program::build(&ctx, &source).await?;
        program.kernel("array_add").await
    });
    let kernel = match kernel {
        Ok(kernel) => kernel,
        Err(e) => {
            println!("[ERROR] {}", e);
            return;
        }
    };

    println!();
    println!("----------------------------------------------------------------------");
    for (size, label) in [(1 << 10, "1K"), (1 << 16, "64K"), (1 << 20, "1M"), (1 << 24, "16M")] {
        if let Err(e) = bench_round_trip(&ctx, &kernel, size, label) {
            println!("  [{:>4}] skipped: {}", label, e);
        }
    }
    println!("----------------------------------------------------------------------");
    println!();
}

/// Wait for every submitted command.
fn sync_gpu(ctx: &GpuContext) {
    ctx.queue.submit([]);
    ctx.device.poll(wgpu::Maintain::Wait);
}

fn avg_ms(total: Duration) -> f64 {
    total.as_secs_f64() * 1000.0 / BENCH_ITERS as f64
}

fn bench_round_trip(
    ctx: &GpuContext,
    kernel: &Kernel,
    size: u32,
    label: &str,
) -> kernelwalk_backend::BackendResult<()> {
    let data: Vec<f32> = (0..size).map(|i| i as f32).collect();
    let a = DeviceBuffer::from_slice(ctx, "a", &data)?;
    let b = DeviceBuffer::from_slice(ctx, "b", &data)?;
    let out = DeviceBuffer::<f32>::zeroed(ctx, "out", size as usize)?;
    let dispatch = Dispatch::new(kernel).arg(0, &a).arg(1, &b).arg(2, &out);
    let space = IndexSpace::linear(size);

    for _ in 0..WARMUP_ITERS {
        pollster::block_on(dispatch.run(ctx, space))?;
        sync_gpu(ctx);
    }

    let (mut upload, mut compute, mut read) = (Duration::ZERO, Duration::ZERO, Duration::ZERO);
    for _ in 0..BENCH_ITERS {
        let start = Instant::now();
        a.write(ctx, &data)?;
        sync_gpu(ctx);
        upload += start.elapsed();

        let start = Instant::now();
        pollster::block_on(dispatch.run(ctx, space))?;
        sync_gpu(ctx);
        compute += start.elapsed();

        let start = Instant::now();
        out.read_blocking(ctx)?;
        read += start.elapsed();
    }

    // 2 reads + 1 write
    let bytes = (a.size_in_bytes() + b.size_in_bytes() + out.size_in_bytes()) as f64;
    let gb_s = bytes / (avg_ms(compute) / 1000.0) / 1e9;
    println!(
        "  Add [{:>4}]: upload {:>8.3} ms | dispatch {:>8.3} ms ({:>7.2} GB/s) | read {:>8.3} ms",
        label,
        avg_ms(upload),
        avg_ms(compute),
        gb_s,
        avg_ms(read)
    );
    Ok(())
}

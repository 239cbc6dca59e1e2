use kernelwalk_backend::{enumerate_platforms, wgpu::Backends, DeviceSelector, GpuContext};

fn main() {
    env_logger::init();

    let platforms = enumerate_platforms(Backends::all());
    assert!(!platforms.is_empty(), "no compute platform found");

    for platform in &platforms {
        println!("Platform: {}", platform.name);
        for device in &platform.devices {
            println!("  [{}] {} ({})", device.index, device.name, device.kind);
            println!("      vendor:  {}", device.vendor);
            println!("      version: {}", device.version());
        }
    }

    match GpuContext::new_blocking(&DeviceSelector::default()) {
        Ok(ctx) => println!("Selected: {}", ctx.adapter_info()),
        Err(e) => println!("No GPU selected: {}", e),
    }
}

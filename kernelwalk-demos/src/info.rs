//! Device info: list every platform and its devices, then pick the GPU the
//! other demos would use and report its vendor and version.

use kernelwalk_backend::device::group_platforms;
use kernelwalk_backend::{enumerate_devices, BackendResult, DeviceInfo, Platform};
use serde::Serialize;

use crate::{DemoConfig, DemoResult};

#[derive(Debug, Clone, Serialize)]
pub struct DeviceListing {
    pub platforms: Vec<Platform>,
    /// The device the other demos would run on.
    pub selected: Option<DeviceInfo>,
}

fn select(config: &DemoConfig, devices: &[DeviceInfo]) -> BackendResult<DeviceInfo> {
    let pos = config.device.choose(devices)?;
    Ok(devices[pos].clone())
}

/// Enumerate without requiring a usable device.
pub fn list(config: &DemoConfig) -> DeviceListing {
    let devices = enumerate_devices(config.device.backends());
    let selected = match select(config, &devices) {
        Ok(info) => Some(info),
        Err(e) => {
            log::warn!("No device selected: {}", e);
            None
        }
    };
    DeviceListing {
        platforms: group_platforms(&devices),
        selected,
    }
}

/// Enumerate and fail unless there is a platform with a usable GPU.
pub fn run(config: &DemoConfig) -> DemoResult<DeviceListing> {
    let devices = enumerate_devices(config.device.backends());
    let selected = select(config, &devices)?;
    Ok(DeviceListing {
        platforms: group_platforms(&devices),
        selected: Some(selected),
    })
}

pub fn print_listing(listing: &DeviceListing) {
    println!("[INFO] {} platform(s)", listing.platforms.len());
    let selected = listing.selected.as_ref().map(|d| d.index);
    for platform in &listing.platforms {
        println!("  Platform: {}", platform.name);
        for device in &platform.devices {
            let marker = if Some(device.index) == selected { "*" } else { " " };
            println!("  {} [{}] {} ({})", marker, device.index, device.name, device.kind);
            println!("        Vendor:  {}", device.vendor);
            println!("        Version: {}", device.version());
        }
    }
    match &listing.selected {
        Some(device) => println!("[GPU] Selected {}", device),
        None => println!("[WARN] No usable GPU"),
    }
    println!();
}

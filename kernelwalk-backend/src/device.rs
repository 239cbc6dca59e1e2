//! Platform and device discovery.
//!
//! A wgpu backend plays the role of a compute platform and each adapter it
//! exposes is a device on that platform. Selection follows the classic
//! pattern: take the first platform that has a usable device and then the
//! first GPU on it.

use serde::{Deserialize, Serialize};
use wgpu::{Adapter, Backends, Instance};

use crate::error::{BackendError, BackendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    DiscreteGpu,
    IntegratedGpu,
    VirtualGpu,
    Cpu,
    Other,
}

impl DeviceKind {
    pub fn is_gpu(&self) -> bool {
        matches!(
            self,
            DeviceKind::DiscreteGpu | DeviceKind::IntegratedGpu | DeviceKind::VirtualGpu
        )
    }
}

impl From<wgpu::DeviceType> for DeviceKind {
    fn from(ty: wgpu::DeviceType) -> Self {
        match ty {
            wgpu::DeviceType::DiscreteGpu => DeviceKind::DiscreteGpu,
            wgpu::DeviceType::IntegratedGpu => DeviceKind::IntegratedGpu,
            wgpu::DeviceType::VirtualGpu => DeviceKind::VirtualGpu,
            wgpu::DeviceType::Cpu => DeviceKind::Cpu,
            wgpu::DeviceType::Other => DeviceKind::Other,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceKind::DiscreteGpu => "discrete GPU",
            DeviceKind::IntegratedGpu => "integrated GPU",
            DeviceKind::VirtualGpu => "virtual GPU",
            DeviceKind::Cpu => "CPU",
            DeviceKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Everything the demos report about a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Position in the flat enumeration order.
    pub index: usize,
    pub name: String,
    pub vendor_id: u32,
    pub vendor: String,
    pub device_id: u32,
    pub kind: DeviceKind,
    /// Platform name, e.g. `Vulkan`.
    pub backend: String,
    pub driver: String,
    pub driver_info: String,
}

impl DeviceInfo {
    pub fn from_adapter(index: usize, adapter: &Adapter) -> Self {
        Self::from_wgpu(index, &adapter.get_info())
    }

    pub fn from_wgpu(index: usize, info: &wgpu::AdapterInfo) -> Self {
        Self {
            index,
            name: info.name.clone(),
            vendor_id: info.vendor,
            vendor: canonical_vendor_name(info.vendor, &info.name),
            device_id: info.device,
            kind: info.device_type.into(),
            backend: format!("{:?}", info.backend),
            driver: info.driver.clone(),
            driver_info: info.driver_info.clone(),
        }
    }

    /// Driver version string, the closest thing wgpu has to a device version.
    pub fn version(&self) -> String {
        let parts: Vec<&str> = [self.driver.trim(), self.driver_info.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            "unknown".to_string()
        } else {
            parts.join(" ")
        }
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.backend, self.kind)
    }
}

/// Map a PCI vendor id to a readable name.
pub fn canonical_vendor_name(vendor_id: u32, name: &str) -> String {
    match vendor_id {
        0x10DE => "NVIDIA".to_string(),
        0x1002 | 0x1022 => "AMD".to_string(),
        0x8086 => "Intel".to_string(),
        0x106B => "Apple".to_string(),
        0x13B5 => "ARM".to_string(),
        0x5143 => "Qualcomm".to_string(),
        0x1414 => "Microsoft".to_string(),
        0x1AE0 => "Google".to_string(),
        0x10005 => "Mesa".to_string(),
        0 => name.split_whitespace().next().unwrap_or("unknown").to_string(),
        other => {
            let prefix = name.split_whitespace().next().unwrap_or("vendor");
            format!("{prefix} (0x{other:04x})")
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub name: String,
    pub devices: Vec<DeviceInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    #[default]
    HighPerformance,
    LowPower,
    None,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(p: PowerPreference) -> Self {
        match p {
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::None => wgpu::PowerPreference::None,
        }
    }
}

/// Which device a demo should run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSelector {
    /// Comma separated backend list (`vulkan,metal,dx12,gl`). Falls back to
    /// `WGPU_BACKEND`, then to every backend.
    pub backends: Option<String>,
    /// Refuse CPU and software adapters.
    pub require_gpu: bool,
    pub power_preference: PowerPreference,
    /// Exact adapter from the flat enumeration order.
    pub adapter_index: Option<usize>,
    /// Case-insensitive substring of the adapter name.
    pub name_filter: Option<String>,
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self {
            backends: None,
            require_gpu: true,
            power_preference: PowerPreference::default(),
            adapter_index: None,
            name_filter: None,
        }
    }
}

impl DeviceSelector {
    pub fn backends(&self) -> Backends {
        match &self.backends {
            Some(list) => wgpu::util::parse_backends_from_comma_list(list),
            None => wgpu::util::backend_bits_from_env().unwrap_or_else(Backends::all),
        }
    }

    fn accepts(&self, info: &DeviceInfo) -> bool {
        if self.require_gpu && !info.kind.is_gpu() {
            return false;
        }
        match &self.name_filter {
            Some(filter) => info.name.to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    fn rank(&self, kind: DeviceKind) -> u8 {
        match (self.power_preference, kind) {
            (PowerPreference::None, _) => 0,
            (PowerPreference::HighPerformance, DeviceKind::DiscreteGpu) => 0,
            (PowerPreference::HighPerformance, DeviceKind::IntegratedGpu) => 1,
            (PowerPreference::LowPower, DeviceKind::IntegratedGpu) => 0,
            (PowerPreference::LowPower, DeviceKind::DiscreteGpu) => 1,
            (_, DeviceKind::VirtualGpu) => 2,
            (_, DeviceKind::Other) => 3,
            (_, DeviceKind::Cpu) => 4,
        }
    }

    /// Pick an index into `devices`, which must be in enumeration order.
    pub fn choose(&self, devices: &[DeviceInfo]) -> BackendResult<usize> {
        let platforms = group_platforms(devices);
        if platforms.is_empty() {
            return Err(BackendError::NoPlatform(format!("{:?}", self.backends())));
        }

        if let Some(index) = self.adapter_index {
            let pos = devices.iter().position(|d| d.index == index).ok_or(
                BackendError::AdapterIndexOutOfRange {
                    index,
                    count: devices.len(),
                },
            )?;
            if !devices[pos].kind.is_gpu() {
                if self.require_gpu {
                    log::warn!("Adapter {} is a {}, not a GPU", index, devices[pos].kind);
                    return Err(BackendError::NoDevice {
                        platform: devices[pos].backend.clone(),
                    });
                }
                log::info!("Using adapter {} ({})", index, devices[pos].kind);
            }
            return Ok(pos);
        }

        for platform in &platforms {
            let best = platform
                .devices
                .iter()
                .filter(|d| self.accepts(d))
                .min_by_key(|d| self.rank(d.kind));
            match best {
                Some(device) => {
                    return devices
                        .iter()
                        .position(|d| d.index == device.index)
                        .ok_or(BackendError::NoDevice {
                            platform: platform.name.clone(),
                        });
                }
                None => log::warn!("Platform {} has no usable device", platform.name),
            }
        }

        let names: Vec<&str> = platforms.iter().map(|p| p.name.as_str()).collect();
        Err(BackendError::NoDevice {
            platform: names.join(", "),
        })
    }
}

pub fn create_instance(backends: Backends) -> Instance {
    Instance::new(wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    })
}

/// Group devices by backend, keeping the order in which each backend first appears.
pub fn group_platforms(devices: &[DeviceInfo]) -> Vec<Platform> {
    let mut platforms: Vec<Platform> = Vec::new();
    for device in devices {
        match platforms.iter_mut().find(|p| p.name == device.backend) {
            Some(platform) => platform.devices.push(device.clone()),
            None => platforms.push(Platform {
                name: device.backend.clone(),
                devices: vec![device.clone()],
            }),
        }
    }
    platforms
}

pub fn enumerate_devices(backends: Backends) -> Vec<DeviceInfo> {
    let instance = create_instance(backends);
    instance
        .enumerate_adapters(backends)
        .iter()
        .enumerate()
        .map(|(i, adapter)| DeviceInfo::from_adapter(i, adapter))
        .collect()
}

pub fn enumerate_platforms(backends: Backends) -> Vec<Platform> {
    group_platforms(&enumerate_devices(backends))
}

/// Enumerate adapters on `instance` and take the one `selector` picks.
pub fn select_adapter(
    instance: &Instance,
    selector: &DeviceSelector,
) -> BackendResult<(Adapter, DeviceInfo)> {
    let mut adapters = instance.enumerate_adapters(selector.backends());
    let infos: Vec<DeviceInfo> = adapters
        .iter()
        .enumerate()
        .map(|(i, adapter)| DeviceInfo::from_adapter(i, adapter))
        .collect();
    for info in &infos {
        log::debug!("Found adapter {}: {}", info.index, info);
    }

    let pos = selector.choose(&infos)?;
    let adapter = adapters.swap_remove(pos);
    Ok((adapter, infos[pos].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(index: usize, backend: &str, kind: DeviceKind, name: &str) -> DeviceInfo {
        DeviceInfo {
            index,
            name: name.to_string(),
            vendor_id: 0,
            vendor: String::new(),
            device_id: 0,
            kind,
            backend: backend.to_string(),
            driver: String::new(),
            driver_info: String::new(),
        }
    }

    #[test]
    fn vendor_names() {
        assert_eq!(canonical_vendor_name(0x10DE, "GeForce RTX 3080"), "NVIDIA");
        assert_eq!(canonical_vendor_name(0x1022, "Radeon"), "AMD");
        assert_eq!(canonical_vendor_name(0, "Apple M2 Max"), "Apple");
        assert_eq!(canonical_vendor_name(0, ""), "unknown");
        assert_eq!(canonical_vendor_name(0xABCD, "Foo GPU"), "Foo (0xabcd)");
    }

    #[test]
    fn version_joins_driver_fields() {
        let mut d = device(0, "Vulkan", DeviceKind::DiscreteGpu, "gpu");
        assert_eq!(d.version(), "unknown");
        d.driver = "NVIDIA".into();
        d.driver_info = "535.129.03".into();
        assert_eq!(d.version(), "NVIDIA 535.129.03");
        d.driver.clear();
        assert_eq!(d.version(), "535.129.03");
    }

    #[test]
    fn empty_enumeration_is_no_platform() {
        let selector = DeviceSelector::default();
        assert!(matches!(
            selector.choose(&[]),
            Err(BackendError::NoPlatform(_))
        ));
    }

    #[test]
    fn cpu_only_platform_is_rejected_by_default() {
        let devices = vec![device(0, "Vulkan", DeviceKind::Cpu, "llvmpipe")];
        let selector = DeviceSelector::default();
        assert!(matches!(
            selector.choose(&devices),
            Err(BackendError::NoDevice { .. })
        ));

        let selector = DeviceSelector {
            require_gpu: false,
            ..Default::default()
        };
        assert_eq!(selector.choose(&devices).unwrap(), 0);
    }

    #[test]
    fn first_platform_with_a_gpu_wins() {
        let devices = vec![
            device(0, "Vulkan", DeviceKind::Cpu, "llvmpipe"),
            device(1, "Gl", DeviceKind::IntegratedGpu, "Intel UHD"),
            device(2, "Gl", DeviceKind::DiscreteGpu, "Radeon"),
            device(3, "Vulkan", DeviceKind::IntegratedGpu, "Intel UHD"),
        ];
        let selector = DeviceSelector::default();
        // Vulkan appears first and has a GPU at index 3.
        assert_eq!(selector.choose(&devices).unwrap(), 3);
    }

    #[test]
    fn power_preference_orders_candidates() {
        let devices = vec![
            device(0, "Metal", DeviceKind::IntegratedGpu, "Apple M1"),
            device(1, "Metal", DeviceKind::DiscreteGpu, "Radeon Pro"),
        ];
        let high = DeviceSelector::default();
        assert_eq!(high.choose(&devices).unwrap(), 1);

        let low = DeviceSelector {
            power_preference: PowerPreference::LowPower,
            ..Default::default()
        };
        assert_eq!(low.choose(&devices).unwrap(), 0);

        let none = DeviceSelector {
            power_preference: PowerPreference::None,
            ..Default::default()
        };
        assert_eq!(none.choose(&devices).unwrap(), 0);
    }

    #[test]
    fn adapter_index_still_requires_a_gpu() {
        let devices = vec![device(0, "Vulkan", DeviceKind::Cpu, "llvmpipe")];
        let strict = DeviceSelector {
            adapter_index: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            strict.choose(&devices),
            Err(BackendError::NoDevice { platform }) if platform == "Vulkan"
        ));

        let relaxed = DeviceSelector {
            require_gpu: false,
            ..strict
        };
        assert_eq!(relaxed.choose(&devices).unwrap(), 0);
    }

    #[test]
    fn adapter_index_and_name_filter() {
        let devices = vec![
            device(0, "Vulkan", DeviceKind::DiscreteGpu, "GeForce RTX"),
            device(1, "Vulkan", DeviceKind::Cpu, "llvmpipe"),
        ];
        let by_index = DeviceSelector {
            adapter_index: Some(1),
            require_gpu: false,
            ..Default::default()
        };
        assert_eq!(by_index.choose(&devices).unwrap(), 1);

        let gpu_index = DeviceSelector {
            adapter_index: Some(0),
            ..Default::default()
        };
        assert_eq!(gpu_index.choose(&devices).unwrap(), 0);

        let out_of_range = DeviceSelector {
            adapter_index: Some(7),
            ..Default::default()
        };
        assert!(matches!(
            out_of_range.choose(&devices),
            Err(BackendError::AdapterIndexOutOfRange { index: 7, count: 2 })
        ));

        let filtered = DeviceSelector {
            name_filter: Some("radeon".into()),
            ..Default::default()
        };
        assert!(filtered.choose(&devices).is_err());
    }

    #[test]
    fn platforms_keep_first_appearance_order() {
        let devices = vec![
            device(0, "Vulkan", DeviceKind::DiscreteGpu, "a"),
            device(1, "Gl", DeviceKind::DiscreteGpu, "b"),
            device(2, "Vulkan", DeviceKind::Cpu, "c"),
        ];
        let platforms = group_platforms(&devices);
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].name, "Vulkan");
        assert_eq!(platforms[0].devices.len(), 2);
        assert_eq!(platforms[1].name, "Gl");
    }

    #[test]
    fn selector_from_json() {
        let selector: DeviceSelector =
            serde_json::from_str(r#"{"require_gpu": false, "power_preference": "low-power"}"#)
                .unwrap();
        assert!(!selector.require_gpu);
        assert_eq!(selector.power_preference, PowerPreference::LowPower);
        assert_eq!(selector.adapter_index, None);
    }
}

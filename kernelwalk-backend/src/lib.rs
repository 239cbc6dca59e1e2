//! # kernelwalk-backend
//!
//! The host/device round-trip every kernelwalk demo is built from:
//!
//! 1. enumerate platforms and devices, pick a GPU ([`device`])
//! 2. compile a kernel source string ([`Program`])
//! 3. allocate and upload device buffers ([`DeviceBuffer`])
//! 4. dispatch over an index space ([`Dispatch`], [`IndexSpace`])
//! 5. read the output back with one blocking read ([`round_trip`])
//!
//! ```rust,no_run
//! use kernelwalk_backend::*;
//!
//! # fn main() -> BackendResult<()> {
//! pollster::block_on(async {
//!     let ctx = GpuContext::new(&DeviceSelector::default()).await?;
//!     let source = KernelSource::new("double", DOUBLE_WGSL, &["main"])
//!         .with_workgroup_size([64, 1, 1]);
//!     let program = Program::build(&ctx, &source).await?;
//!     let kernel = program.kernel("main").await?;
//!
//!     let input = DeviceBuffer::from_slice(&ctx, "input", &[1.0f32, 2.0, 3.0])?;
//!     let output = DeviceBuffer::<f32>::zeroed(&ctx, "output", 3)?;
//!     let dispatch = Dispatch::new(&kernel).arg(0, &input).arg(1, &output);
//!     let result = round_trip(&ctx, &dispatch, IndexSpace::linear(3), &output).await?;
//!     assert_eq!(result.data, vec![2.0, 4.0, 6.0]);
//!     Ok(())
//! })
//! # }
//! # const DOUBLE_WGSL: &str = "";
//! ```

pub use wgpu; // Re-export wgpu for downstream crates
pub use pollster;

pub mod buffer;
pub mod context;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod program;

pub use buffer::{DeviceBuffer, KernelArg, UniformBuffer};
pub use context::GpuContext;
pub use device::{
    canonical_vendor_name, enumerate_devices, enumerate_platforms, DeviceInfo, DeviceKind,
    DeviceSelector, Platform, PowerPreference,
};
pub use dispatch::{round_trip, Dispatch, IndexSpace, RoundTrip};
pub use error::{BackendError, BackendResult};
pub use program::{Kernel, KernelSource, Program};

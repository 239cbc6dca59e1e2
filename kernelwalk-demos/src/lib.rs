//! # kernelwalk-demos
//!
//! Small GPU compute demos, each a complete host/device round-trip:
//!
//! - [`info`]: enumerate platforms and devices
//! - [`hello`]: hello-world kernel
//! - [`arrays`]: element-wise array processing
//! - [`multidim`]: 2-D/3-D index spaces
//! - [`reduction`]: workgroup tree reduction plus host finish
//! - [`large_loops`]: large array with a long per-item loop
//!
//! Every demo builds its own [`GpuContext`](kernelwalk_backend::GpuContext)
//! and program; nothing is shared between runs.

pub mod arrays;
pub mod config;
pub mod error;
pub mod hello;
pub mod info;
pub mod kernels;
pub mod large_loops;
pub mod multidim;
pub mod reduction;
pub mod report;

pub use config::DemoConfig;
pub use error::{DemoError, DemoResult};
pub use report::{Check, DemoReport};

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Hello,
    Arrays,
    MultiDim,
    Reduction,
    LargeLoops,
}

impl Demo {
    /// In the order they were written.
    pub const ALL: [Demo; 5] = [
        Demo::Hello,
        Demo::Arrays,
        Demo::MultiDim,
        Demo::Reduction,
        Demo::LargeLoops,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Demo::Hello => "hello",
            Demo::Arrays => "arrays",
            Demo::MultiDim => "multidim",
            Demo::Reduction => "reduction",
            Demo::LargeLoops => "large_loops",
        }
    }

    pub async fn run(&self, config: &DemoConfig) -> DemoResult<DemoReport> {
        config.validate()?;
        match self {
            Demo::Hello => hello::run(config).await,
            Demo::Arrays => arrays::run(config).await,
            Demo::MultiDim => multidim::run(config).await,
            Demo::Reduction => reduction::run(config).await,
            Demo::LargeLoops => large_loops::run(config).await,
        }
    }
}

impl FromStr for Demo {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "hello" => Ok(Demo::Hello),
            "arrays" | "array" => Ok(Demo::Arrays),
            "multidim" => Ok(Demo::MultiDim),
            "reduction" | "reduce" => Ok(Demo::Reduction),
            "large_loops" | "loops" => Ok(Demo::LargeLoops),
            other => Err(DemoError::UnknownDemo(other.to_string())),
        }
    }
}

impl std::fmt::Display for Demo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Run every demo in order. A failing demo does not stop the rest.
pub async fn run_all(config: &DemoConfig) -> Vec<(Demo, DemoResult<DemoReport>)> {
    let mut results = Vec::with_capacity(Demo::ALL.len());
    for demo in Demo::ALL {
        log::info!("Running {}", demo);
        results.push((demo, demo.run(config).await));
    }
    results
}

//! Demo results and their console output.

use kernelwalk_backend::{DeviceInfo, GpuContext};
use std::fmt::Display;
use std::time::Duration;

use crate::DemoConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Passed,
    Failed {
        index: usize,
        expected: String,
        actual: String,
    },
}

impl Check {
    pub fn passed(&self) -> bool {
        matches!(self, Check::Passed)
    }

    fn failed(index: usize, expected: impl Display, actual: impl Display) -> Self {
        Check::Failed {
            index,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Compare every `stride`-th element exactly. A length mismatch fails at
    /// the first missing index.
    pub fn exact<T: PartialEq + Display>(expected: &[T], actual: &[T], stride: usize) -> Self {
        if expected.len() != actual.len() {
            let index = expected.len().min(actual.len());
            return Check::failed(
                index,
                format!("{} elements", expected.len()),
                format!("{} elements", actual.len()),
            );
        }
        for i in (0..expected.len()).step_by(stride.max(1)) {
            if expected[i] != actual[i] {
                return Check::failed(i, &expected[i], &actual[i]);
            }
        }
        Check::Passed
    }

    /// Compare with tolerance `rel * max(1, |expected|)`.
    pub fn approx(expected: &[f32], actual: &[f32], rel: f32, stride: usize) -> Self {
        if expected.len() != actual.len() {
            let index = expected.len().min(actual.len());
            return Check::failed(
                index,
                format!("{} elements", expected.len()),
                format!("{} elements", actual.len()),
            );
        }
        for i in (0..expected.len()).step_by(stride.max(1)) {
            let (e, a) = (expected[i], actual[i]);
            if !((e - a).abs() <= rel * e.abs().max(1.0)) {
                return Check::failed(i, e, a);
            }
        }
        Check::Passed
    }
}

#[derive(Debug, Clone)]
pub struct DemoReport {
    pub demo: &'static str,
    pub device: DeviceInfo,
    /// Work items dispatched
    pub elements: u64,
    /// Workgroup counts of the main dispatch
    pub dispatch: [u32; 3],
    pub elapsed: Duration,
    pub check: Check,
    /// Demo specific one-line summary, e.g. the decoded message
    pub summary: String,
}

impl DemoReport {
    pub fn passed(&self) -> bool {
        self.check.passed()
    }
}

pub fn print_banner() {
    println!();
    println!("======================================================================");
    println!("   KERNELWALK - GPU compute walkthrough                               ");
    println!("======================================================================");
    println!();
}

pub fn print_device_info(ctx: &GpuContext) {
    let info = ctx.info();
    println!("[GPU] Information:");
    println!("      Name:    {}", info.name);
    println!("      Vendor:  {}", info.vendor);
    println!("      Version: {}", info.version());
    println!("      Backend: {}", info.backend);
    println!("      Type:    {}", info.kind);
    println!();
}

pub fn print_config(config: &DemoConfig) {
    println!("[CONFIG] Demo Configuration:");
    println!("         Workgroup:  {}", config.workgroup_size);
    println!("         Array:      {}", config.array_len);
    println!("         Volume:     {:?}", config.volume);
    println!("         Reduce:     {}", config.reduce_len);
    println!(
        "         Loops:      {} x {} iterations",
        config.loop_len, config.loop_iterations
    );
    println!();
}

pub fn print_report(report: &DemoReport) {
    println!("[RUN] {} on {}", report.demo, report.device.name);
    println!(
        "      {} items as {:?} workgroups in {:.2?}",
        report.elements, report.dispatch, report.elapsed
    );
    if !report.summary.is_empty() {
        println!("      {}", report.summary);
    }
    match &report.check {
        Check::Passed => println!("[OK]  {} verified", report.demo),
        Check::Failed {
            index,
            expected,
            actual,
        } => println!(
            "[FAIL] {} mismatch at {}: expected {}, got {}",
            report.demo, index, expected, actual
        ),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_reports_first_mismatch() {
        assert!(Check::exact(&[1u32, 2, 3], &[1, 2, 3], 1).passed());
        assert_eq!(
            Check::exact(&[1u32, 2, 3], &[1, 5, 3], 1),
            Check::Failed {
                index: 1,
                expected: "2".into(),
                actual: "5".into()
            }
        );
    }

    #[test]
    fn stride_skips_elements() {
        // Index 1 differs but is not sampled with stride 2.
        assert!(Check::exact(&[1u32, 2, 3], &[1, 9, 3], 2).passed());
    }

    #[test]
    fn length_mismatch_fails() {
        match Check::exact(&[1u32, 2], &[1], 1) {
            Check::Failed { index, .. } => assert_eq!(index, 1),
            Check::Passed => panic!("length mismatch passed"),
        }
    }

    #[test]
    fn approx_tolerance_scales() {
        assert!(Check::approx(&[1000.0], &[1000.05], 1e-4, 1).passed());
        assert!(!Check::approx(&[1000.0], &[1001.0], 1e-4, 1).passed());
        assert!(Check::approx(&[0.0], &[0.00005], 1e-4, 1).passed());
        assert!(!Check::approx(&[1.0], &[f32::NAN], 1e-4, 1).passed());
    }
}

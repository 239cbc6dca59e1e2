//! kernelwalk CLI - run the GPU compute demos
//!
//! ```text
//! kernelwalk info
//! kernelwalk hello
//! kernelwalk all --config demos.json --workgroup-size 128
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use kernelwalk_backend::{pollster, GpuContext};
use kernelwalk_demos::report::{print_banner, print_config, print_device_info, print_report};
use kernelwalk_demos::{info, run_all, Demo, DemoConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kernelwalk", version, about = "GPU compute walkthrough demos")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma separated backends (vulkan, metal, dx12, gl)
    #[arg(long, global = true)]
    backends: Option<String>,

    /// Accept CPU and software adapters
    #[arg(long, global = true)]
    allow_cpu: bool,

    /// Adapter index as printed by `info`
    #[arg(long, global = true)]
    adapter: Option<usize>,

    /// Invocations per workgroup
    #[arg(long, global = true)]
    workgroup_size: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// List platforms and devices
    Info {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Hello-world kernel
    Hello,
    /// Element-wise array processing
    Arrays,
    /// Multi-dimensional array processing
    Multidim,
    /// Workgroup reduction
    Reduce,
    /// Large array with a long per-item loop
    Loops,
    /// Every demo in order
    All,
}

fn load_config(args: &GlobalArgs) -> Result<DemoConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            DemoConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => DemoConfig::default(),
    };
    if let Some(backends) = &args.backends {
        config.device.backends = Some(backends.clone());
    }
    if args.allow_cpu {
        log::warn!("CPU and software adapters allowed");
        config.device.require_gpu = false;
    }
    if let Some(index) = args.adapter {
        config.device.adapter_index = Some(index);
    }
    if let Some(wg) = args.workgroup_size {
        config.workgroup_size = wg;
    }
    config.validate()?;
    log::debug!("Effective config: {:?}", config);
    Ok(config)
}

fn run_one(demo: Demo, config: &DemoConfig) -> Result<bool> {
    log::info!("Running {}", demo);
    let report =
        pollster::block_on(demo.run(config)).with_context(|| format!("running {demo}"))?;
    print_report(&report);
    Ok(report.passed())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli.global)?;

    let passed = match cli.command {
        Command::Info { json } => {
            let listing = info::list(&config);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                info::print_listing(&listing);
            }
            listing.selected.is_some()
        }
        Command::Hello => run_one(Demo::Hello, &config)?,
        Command::Arrays => run_one(Demo::Arrays, &config)?,
        Command::Multidim => run_one(Demo::MultiDim, &config)?,
        Command::Reduce => run_one(Demo::Reduction, &config)?,
        Command::Loops => run_one(Demo::LargeLoops, &config)?,
        Command::All => {
            print_banner();
            let ctx = GpuContext::new_blocking(&config.device).context("selecting a device")?;
            print_device_info(&ctx);
            drop(ctx);
            print_config(&config);

            let mut all_passed = true;
            for (demo, result) in pollster::block_on(run_all(&config)) {
                match result {
                    Ok(report) => {
                        print_report(&report);
                        all_passed &= report.passed();
                    }
                    Err(e) => {
                        log::error!("{} failed: {}", demo, e);
                        println!("[ERROR] {}: {}", demo, e);
                        all_passed = false;
                    }
                }
            }
            all_passed
        }
    };

    if !passed {
        bail!("one or more checks failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "kernelwalk",
            "hello",
            "--allow-cpu",
            "--adapter",
            "2",
            "--workgroup-size",
            "128",
            "--backends",
            "vulkan",
        ]);
        let config = load_config(&cli.global).unwrap();
        assert!(!config.device.require_gpu);
        assert_eq!(config.device.adapter_index, Some(2));
        assert_eq!(config.workgroup_size, 128);
        assert_eq!(config.device.backends.as_deref(), Some("vulkan"));
    }

    #[test]
    fn invalid_workgroup_size_is_rejected() {
        let cli = Cli::parse_from(["kernelwalk", "all", "--workgroup-size", "100"]);
        assert!(load_config(&cli.global).is_err());
    }
}

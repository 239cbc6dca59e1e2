//! End-to-end demo runs. Any adapter will do, software ones included; each
//! test returns early when there is none.

use kernelwalk_backend::{BackendError, DeviceSelector, GpuContext};
use kernelwalk_demos::{info, run_all, Check, Demo, DemoConfig, DemoError, DemoReport};

fn setup() -> Option<DemoConfig> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = DemoConfig {
        device: DeviceSelector {
            require_gpu: false,
            ..Default::default()
        },
        array_len: 1000,
        volume: [9, 5, 3],
        reduce_len: 100_000,
        loop_len: 4097,
        loop_iterations: 33,
        ..Default::default()
    };
    match GpuContext::new_blocking(&config.device) {
        Ok(_) => Some(config),
        Err(e) => {
            eprintln!("skipping: {}", e);
            None
        }
    }
}

fn run(demo: Demo, config: &DemoConfig) -> DemoReport {
    let report = pollster::block_on(demo.run(config)).unwrap();
    assert_eq!(report.check, Check::Passed, "{} failed", demo);
    report
}

#[test]
fn hello_spells_the_message() {
    let Some(config) = setup() else { return };
    let report = run(Demo::Hello, &config);
    assert_eq!(report.elements, 13);
    assert!(report.summary.contains("Hello, World!"));
}

#[test]
fn arrays_cover_a_partial_workgroup() {
    let Some(config) = setup() else { return };
    let report = run(Demo::Arrays, &config);
    assert_eq!(report.elements, 1000);
    assert_eq!(report.dispatch, [16, 1, 1]);
}

#[test]
fn multidim_volume_and_grid() {
    let Some(mut config) = setup() else { return };
    let report = run(Demo::MultiDim, &config);
    assert_eq!(report.elements, 9 * 5 * 3);
    // 64 invocations split as 4x4x4.
    assert_eq!(report.dispatch, [3, 2, 1]);

    config.volume = [33, 7, 1];
    let report = run(Demo::MultiDim, &config);
    assert_eq!(report.elements, 33 * 7);
    assert_eq!(report.dispatch, [5, 1, 1]);
}

#[test]
fn reduction_with_other_workgroup_sizes() {
    let Some(mut config) = setup() else { return };
    for wg in [32, 64, 256] {
        config.workgroup_size = wg;
        let report = run(Demo::Reduction, &config);
        assert_eq!(report.dispatch[0], 100_000u32.div_ceil(wg));
    }
}

#[test]
fn large_loops_small_run() {
    let Some(config) = setup() else { return };
    let report = run(Demo::LargeLoops, &config);
    assert_eq!(report.elements, 4097);
}

#[test]
fn large_loops_folds_the_dispatch() {
    let Some(mut config) = setup() else { return };
    // 65536 workgroups of 64 is one more than the default per-dimension limit.
    config.loop_len = 65536 * 64;
    config.loop_iterations = 8;
    config.verify_stride = 997;
    let report = run(Demo::LargeLoops, &config);
    assert!(report.dispatch[1] >= 1);
    assert!(report.dispatch[0] as u64 * report.dispatch[1] as u64 * 64 >= report.elements);
}

#[test]
fn run_all_in_order() {
    let Some(config) = setup() else { return };
    let results = pollster::block_on(run_all(&config));
    let order: Vec<Demo> = results.iter().map(|(d, _)| *d).collect();
    assert_eq!(order, Demo::ALL.to_vec());
    for (demo, result) in results {
        assert!(result.unwrap().passed(), "{demo}");
    }
}

#[test]
fn info_lists_the_selected_device() {
    let Some(config) = setup() else { return };
    let listing = info::run(&config).unwrap();
    let selected = listing.selected.unwrap();
    assert!(listing
        .platforms
        .iter()
        .any(|p| p.devices.iter().any(|d| d.index == selected.index)));

    // The default selector only ever reports a GPU.
    let strict = DemoConfig {
        device: DeviceSelector::default(),
        ..config
    };
    match info::run(&strict) {
        Ok(listing) => assert!(listing.selected.unwrap().kind.is_gpu()),
        Err(e) => assert!(
            matches!(e, DemoError::Backend(BackendError::NoDevice { .. })),
            "unexpected error: {e}"
        ),
    }
}

use linetrace_core::error::BuildError;
use linetrace_core::mocks::ScriptedChannel;
use linetrace_core::{DriverCfg, EstimatorCfg, LineSensor, build_line_sensor};
use rstest::rstest;

fn estimator(detect: u16, noise: u16) -> EstimatorCfg {
    EstimatorCfg {
        detect_threshold: detect,
        noise_threshold: noise,
    }
}

#[rstest]
#[case::no_sensors(DriverCfg { sensor_count: 0, ..DriverCfg::default() }, "sensor_count")]
#[case::too_many_sensors(DriverCfg { sensor_count: 17, ..DriverCfg::default() }, "sensor_count")]
#[case::zero_max_raw(DriverCfg { max_raw: 0, ..DriverCfg::default() }, "max_raw")]
#[case::detect_off_scale(DriverCfg { estimator: estimator(1001, 50), ..DriverCfg::default() }, "<= 1000")]
#[case::equal_thresholds(DriverCfg { estimator: estimator(100, 100), ..DriverCfg::default() }, "detect_threshold")]
#[case::inverted_thresholds(DriverCfg { estimator: estimator(50, 200), ..DriverCfg::default() }, "detect_threshold")]
fn invalid_config_yields_typed_build_error(#[case] cfg: DriverCfg, #[case] needle: &str) {
    let err = build_line_sensor(ScriptedChannel::constant(&[0; 16]), cfg)
        .expect_err("config should be rejected");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}");
        }
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[rstest]
fn builder_setters_reach_the_driver() {
    let sensor = LineSensor::builder()
        .with_channel(ScriptedChannel::constant(&[0; 5]))
        .with_sensor_count(5)
        .with_max_raw(4095)
        .with_samples_per_sensor(12)
        .with_calibration_enabled(false)
        .with_estimator(estimator(300, 100))
        .build()
        .unwrap();
    assert_eq!(sensor.sensor_count(), 5);
    assert_eq!(sensor.max_raw(), 4095);
    assert_eq!(sensor.sampling().samples_per_sensor(), 12);
    assert_eq!(sensor.sampling().shift_amount(), 0);
    assert!(!sensor.calibration_enabled());
    assert_eq!(sensor.envelope().minimum(), &[4095; 5]);
}

#[rstest]
fn oversized_sample_count_is_clamped_not_rejected() {
    let sensor = LineSensor::builder()
        .with_channel(ScriptedChannel::constant(&[0]))
        .with_config(DriverCfg {
            sensor_count: 1,
            samples_per_sensor: 10_000,
            ..DriverCfg::default()
        })
        .build()
        .unwrap();
    assert_eq!(sensor.sampling().samples_per_sensor(), 64);
}

#[rstest]
fn config_file_maps_into_driver_cfg() {
    let cfg = linetrace_config::load_toml(
        r"
[array]
sensor_count = 6
max_raw = 4095

[sampling]
samples_per_sensor = 8

[calibration]
enabled = false

[estimator]
detect_threshold = 400
noise_threshold = 20
",
    )
    .unwrap();
    let driver = DriverCfg::from(&cfg);
    assert_eq!(driver.sensor_count, 6);
    assert_eq!(driver.max_raw, 4095);
    assert_eq!(driver.samples_per_sensor, 8);
    assert!(!driver.calibration_enabled);
    assert_eq!(driver.estimator, estimator(400, 20));
}

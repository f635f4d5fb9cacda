use linetrace_core::mocks::{FailingChannel, ScriptedChannel};
use linetrace_core::{LinePosition, LineSensor, LostSide, SensorError};
use linetrace_hardware::SimulatedChannel;
use rstest::rstest;

fn scripted(values: &[u16]) -> LineSensor<ScriptedChannel> {
    LineSensor::builder()
        .with_channel(ScriptedChannel::constant(values))
        .with_sensor_count(values.len() as u8)
        .build()
        .unwrap()
}

/// 8 sensors over a simulated surface, calibrated by sweeping the line from
/// well off the left edge to well off the right edge.
fn calibrated_sim() -> LineSensor<SimulatedChannel> {
    let sim = SimulatedChannel::new(8);
    let line = sim.line_handle();
    let mut sensor = LineSensor::builder()
        .with_channel(sim)
        .with_sensor_count(8)
        .build()
        .unwrap();
    for k in 0..25 {
        line.set(Some(-2000 + k * 500));
        sensor.calibrate_pass().unwrap();
    }
    sensor
}

#[test]
fn read_calibrated_before_calibration_touches_no_hardware() {
    let mut sensor = scripted(&[500, 500, 500]);
    let err = sensor.read_calibrated().unwrap_err();
    assert_eq!(
        err.downcast_ref::<SensorError>(),
        Some(&SensorError::NotCalibrated)
    );
    assert!(sensor.read_line_position().is_err());
    assert!(sensor.estimate_line().is_err());
    assert!(sensor.read_frame().is_err());
    assert_eq!(sensor.channel().calls(), 0);
    assert_eq!(sensor.last_position(), 0);
    assert!(!sensor.is_calibrated());
}

#[test]
fn raw_read_works_without_calibration() {
    let mut sensor = scripted(&[10, 20, 30]);
    assert_eq!(sensor.read().unwrap().as_slice(), &[10, 20, 30]);
    // 4 samples per sensor by default: one select and one sample each time.
    assert_eq!(sensor.channel().samples, 12);
    assert_eq!(sensor.channel().selects[..3], [0, 1, 2]);
}

#[test]
fn calibration_pass_is_ten_reads() {
    let mut sensor = scripted(&[100, 200]);
    sensor.configure_samples(2);
    sensor.calibrate_pass().unwrap();
    assert_eq!(sensor.channel().samples, 10 * 2 * 2);
    assert!(sensor.is_calibrated());
}

#[test]
fn flat_first_pass_collapses_envelope() {
    let mut sensor = scripted(&[100]);
    sensor.calibrate_pass().unwrap();
    // Pass min 100 > maximum 0 raises maximum; pass max 100 < 1023 lowers minimum.
    assert_eq!(sensor.envelope().maximum(), &[100]);
    assert_eq!(sensor.envelope().minimum(), &[100]);
    assert_eq!(sensor.read_calibrated().unwrap().as_slice(), &[0]);
}

#[test]
fn repeated_identical_passes_are_idempotent() {
    let mut once = scripted(&[100, 700, 300]);
    once.calibrate_pass().unwrap();

    let mut twice = scripted(&[100, 700, 300]);
    twice.calibrate_pass().unwrap();
    twice.calibrate_pass().unwrap();

    assert_eq!(once.envelope(), twice.envelope());
}

#[test]
fn second_differing_pass_opens_the_envelope() {
    // Sensor 0 sees 100 for the first pass, then 600.
    let script = vec![[vec![100; 40], vec![600; 40]].concat()];
    let mut sensor = LineSensor::builder()
        .with_channel(ScriptedChannel::new(script))
        .with_sensor_count(1)
        .build()
        .unwrap();
    sensor.calibrate_pass().unwrap();
    sensor.calibrate_pass().unwrap();
    assert_eq!(sensor.envelope().minimum(), &[100]);
    assert_eq!(sensor.envelope().maximum(), &[600]);
    // The channel now serves 600 forever.
    assert_eq!(sensor.read_calibrated().unwrap().as_slice(), &[1000]);
}

#[test]
fn disabled_calibration_skips_passes() {
    let mut sensor = LineSensor::builder()
        .with_channel(ScriptedChannel::constant(&[100, 200]))
        .with_sensor_count(2)
        .with_calibration_enabled(false)
        .build()
        .unwrap();
    sensor.calibrate_pass().unwrap();
    assert_eq!(sensor.channel().calls(), 0);
    assert!(!sensor.is_calibrated());
    let err = sensor.read_calibrated().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SensorError>(),
        Some(SensorError::NotCalibrated)
    ));
}

#[test]
fn reset_keeps_driver_calibrated() {
    let mut sensor = calibrated_sim();
    sensor.reset_calibration();
    assert!(sensor.is_calibrated());
    assert!(sensor.envelope().minimum().iter().all(|&m| m == 1023));
    assert!(sensor.envelope().maximum().iter().all(|&m| m == 0));
    // Inverted envelope: every sensor normalizes to 0 and the line is lost.
    assert!(sensor.read_calibrated().unwrap().iter().all(|&v| v == 0));
    assert!(sensor.estimate_line().unwrap().is_lost());
}

#[rstest]
#[case(0, 1, 0)]
#[case(1, 1, 0)]
#[case(3, 3, 0)]
#[case(16, 16, 4)]
#[case(64, 64, 6)]
#[case(65, 64, 6)]
#[case(1000, 64, 6)]
fn configure_samples_clamps(#[case] requested: u32, #[case] count: u8, #[case] shift: u8) {
    let mut sensor = scripted(&[1]);
    sensor.configure_samples(requested);
    assert_eq!(sensor.sampling().samples_per_sensor(), count);
    assert_eq!(sensor.sampling().shift_amount(), shift);
}

#[test]
fn sim_tracks_line_and_falls_back_to_nearer_edge() {
    let mut sensor = calibrated_sim();
    let line = sensor.channel().line_handle();

    line.set(Some(3000));
    assert_eq!(sensor.estimate_line().unwrap(), LinePosition::Tracking(3000));
    line.set(None);
    assert_eq!(
        sensor.estimate_line().unwrap(),
        LinePosition::Lost {
            side: LostSide::Left,
            position: 0
        }
    );
    assert_eq!(sensor.last_position(), 3000);

    line.set(Some(4000));
    assert_eq!(sensor.read_line_position().unwrap(), 4000);
    line.set(None);
    assert_eq!(sensor.read_line_position().unwrap(), 7000);
    assert_eq!(sensor.last_position(), 4000);
}

#[test]
fn frame_carries_raw_calibrated_and_position() {
    let mut sensor = calibrated_sim();
    sensor.channel().line_handle().set(Some(0));
    let frame = sensor.read_frame().unwrap();
    assert_eq!(frame.raw.len(), 8);
    assert_eq!(frame.raw[0], 900);
    assert_eq!(frame.calibrated[0], 1000);
    assert_eq!(frame.calibrated[7], 0);
    // Only sensor 1 also clears the noise floor; the centroid sits just right of 0.
    assert!(matches!(frame.position, LinePosition::Tracking(p) if p < 500));
}

#[test]
fn adc_failure_maps_to_hardware_error() {
    let mut sensor = LineSensor::builder()
        .with_channel(FailingChannel::new(3, 500))
        .with_sensor_count(2)
        .build()
        .unwrap();
    let err = sensor.read().unwrap_err();
    match err.downcast_ref::<SensorError>() {
        Some(SensorError::Hardware(msg)) => assert!(msg.contains("adc not responding")),
        other => panic!("expected Hardware, got {other:?}"),
    }
}

#[cfg(feature = "hardware-errors")]
#[test]
fn known_hardware_errors_map_to_fault() {
    // Channel only has two inputs; the third select fails inside the backend.
    let mut sensor = LineSensor::builder()
        .with_channel(SimulatedChannel::new(2))
        .with_sensor_count(3)
        .build()
        .unwrap();
    let err = sensor.read().unwrap_err();
    match err.downcast_ref::<SensorError>() {
        Some(SensorError::HardwareFault(msg)) => assert!(msg.contains("channel 2")),
        other => panic!("expected HardwareFault, got {other:?}"),
    }
}

#[test]
fn failed_pass_leaves_envelope_seeded_only() {
    // Enough samples for three reads of one sensor at 4 samples each.
    let mut sensor = LineSensor::builder()
        .with_channel(FailingChannel::new(12, 500))
        .with_sensor_count(1)
        .build()
        .unwrap();
    assert!(sensor.calibrate_pass().is_err());
    assert!(sensor.is_calibrated());
    assert_eq!(sensor.envelope().minimum(), &[1023]);
    assert_eq!(sensor.envelope().maximum(), &[0]);
}

#[test]
fn into_channel_returns_backend() {
    let mut sensor = scripted(&[7, 8]);
    sensor.read().unwrap();
    let ch = sensor.into_channel();
    assert_eq!(ch.samples, 8);
}

//! Tests for decoding the 130-byte data-dump frame

mod common;

use common::*;
use um25c_lib::layout::{FIELDS, LAYOUT_VERSION, field};

/// Value of a layout field as seen through the decoded record
fn record_value(m: &Measurement, name: &str) -> u32 {
    if let Some(rest) = name.strip_prefix("group") {
        let (index, kind) = rest.split_once('_').expect("group field name");
        let g = m.groups[index.parse::<usize>().unwrap()];
        return match kind {
            "mah" => g.milliamp_hours,
            "mwh" => g.milliwatt_hours,
            other => panic!("unexpected group field {other}"),
        };
    }
    match name {
        "reserved_head" => m.reserved_head.into(),
        "millivolts" => m.millivolts.into(),
        "tenths_milliamps" => m.tenths_milliamps.into(),
        "milliwatts" => m.milliwatts,
        "temp_celsius" => u32::from(m.temp_celsius as u16),
        "temp_fahrenheit" => u32::from(m.temp_fahrenheit as u16),
        "data_group" => m.data_group.into(),
        "dplus_centivolts" => m.dplus_centivolts.into(),
        "dminus_centivolts" => m.dminus_centivolts.into(),
        "charge_mode" => u16::from(m.charge_mode).into(),
        "threshold_milliamps" => m.threshold_milliamps,
        "threshold_milliwatts" => m.threshold_milliwatts,
        "threshold_centivolts" => m.threshold_centivolts.into(),
        "recording_seconds" => m.recording_seconds,
        "recording_active" => m.recording_active.into(),
        "screen_timeout" => m.screen_timeout.into(),
        "backlight" => m.backlight.into(),
        "resistance_deciohms" => m.resistance_deciohms,
        "current_screen" => m.current_screen.into(),
        "reserved_tail" => m.reserved_tail.into(),
        other => panic!("layout field {other} has no record counterpart"),
    }
}

#[test]
fn test_decode_reencode_reproduces_frame() {
    for seed in [0u8, 1, 0x7f, 0xa5, 0xff] {
        let frame = patterned_frame(seed);
        let m = Measurement::from_bytes(&frame);
        assert_eq!(m.to_bytes(), frame, "round trip failed for seed {seed:#04x}");
    }

    let all_ones = [0xffu8; FRAME_SIZE];
    assert_eq!(Measurement::from_bytes(&all_ones).to_bytes(), all_ones);
}

#[test]
fn test_layout_table_matches_decoder() {
    assert_eq!(LAYOUT_VERSION, 1);
    let frame = patterned_frame(0x3c);
    let m = Measurement::from_bytes(&frame);

    for f in FIELDS {
        assert_eq!(
            f.read(&frame),
            record_value(&m, f.name),
            "field {} at offset {} disagrees",
            f.name,
            f.offset
        );
    }
}

#[test]
fn test_known_values_at_documented_offsets() {
    let expected = charging_measurement();
    let frame = expected.to_bytes();

    assert_eq!(&frame[2..4], &5083u16.to_be_bytes());
    assert_eq!(&frame[4..6], &12034u16.to_be_bytes());
    assert_eq!(&frame[6..10], &6116u32.to_be_bytes());
    assert_eq!(&frame[14..16], &3u16.to_be_bytes());
    // Group 3 starts at 16 + 3 * 8
    assert_eq!(&frame[40..44], &123456u32.to_be_bytes());
    assert_eq!(&frame[44..48], &654321u32.to_be_bytes());
    assert_eq!(&frame[100..102], &3u16.to_be_bytes());
    assert_eq!(&frame[122..126], &42u32.to_be_bytes());

    let m = Measurement::from_bytes(&frame);
    assert_eq!(m, expected);
    assert_eq!(m.charge_mode, ChargeMode::Apple2_4A);
    assert!(m.is_recording());
    assert_eq!(field("recording_seconds").unwrap().read(&frame), 3600);
}

#[test]
fn test_active_group_follows_index() {
    let mut m = charging_measurement();
    assert_eq!(
        m.active_group(),
        Some(&GroupTotals {
            milliamp_hours: 123456,
            milliwatt_hours: 654321
        })
    );

    m.data_group = 0;
    assert_eq!(m.active_group().unwrap().milliamp_hours, 11);

    m.data_group = 10;
    assert!(m.active_group().is_none());
}

#[test]
fn test_unknown_charge_mode_survives_round_trip() {
    let mut frame = charging_measurement().to_bytes();
    frame[100..102].copy_from_slice(&0x00ffu16.to_be_bytes());

    let m = Measurement::from_bytes(&frame);
    assert_eq!(m.charge_mode, ChargeMode::Unknown(0xff));
    assert_eq!(m.to_bytes(), frame);
}

#[test]
fn test_from_slice_accepts_exact_frame_only() {
    let frame = patterned_frame(9);
    assert_eq!(
        Measurement::from_slice(&frame).unwrap(),
        Measurement::from_bytes(&frame)
    );
    assert!(matches!(
        Measurement::from_slice(&frame[..129]),
        Err(UmError::FrameLength { actual: 129, .. })
    ));
    let mut long = frame.to_vec();
    long.push(0);
    assert!(matches!(
        Measurement::from_slice(&long),
        Err(UmError::FrameLength { actual: 131, .. })
    ));
}

#[test]
fn test_display_summary() {
    let text = charging_measurement().to_string();
    assert_eq!(
        text,
        "VBUS: 5.083 V, IBUS: 1.2034 A, Power: 6.116 W, Temp: 27 °C, Group: 3, Mode: APP2.4A"
    );
}

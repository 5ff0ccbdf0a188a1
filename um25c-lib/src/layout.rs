//! Offset table of the UM25C data-dump frame.
//!
//! [`FIELDS`] lists every word of the 130-byte frame in wire order, with its
//! offset, width and unit. [`crate::frame::FrameRaw`] is the typed view of the
//! same layout; the table is the reference it is checked against and is used
//! to dump raw frames field by field at debug level.

use crate::constants::FRAME_SIZE;
use byteorder::{BigEndian, ByteOrder};
use tracing::{Level, debug, enabled};

/// Bumped whenever an entry of [`FIELDS`] changes meaning or position.
pub const LAYOUT_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Word,
    DoubleWord,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::Word => 2,
            Width::DoubleWord => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: Width,
    pub unit: &'static str,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, width: Width, unit: &'static str) -> Self {
        Self {
            name,
            offset,
            width,
            unit,
        }
    }

    /// Raw unsigned value of this field. Signed fields come back as their bit pattern.
    pub fn read(&self, frame: &[u8; FRAME_SIZE]) -> u32 {
        let end = self.offset + self.width.bytes();
        let bytes = &frame[self.offset..end];
        match self.width {
            Width::Word => u32::from(BigEndian::read_u16(bytes)),
            Width::DoubleWord => BigEndian::read_u32(bytes),
        }
    }
}

use Width::{DoubleWord, Word};

#[rustfmt::skip]
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("reserved_head",        0,   Word,       ""),
    FieldSpec::new("millivolts",           2,   Word,       "mV"),
    FieldSpec::new("tenths_milliamps",     4,   Word,       "0.1 mA"),
    FieldSpec::new("milliwatts",           6,   DoubleWord, "mW"),
    FieldSpec::new("temp_celsius",         10,  Word,       "°C"),
    FieldSpec::new("temp_fahrenheit",      12,  Word,       "°F"),
    FieldSpec::new("data_group",           14,  Word,       ""),
    FieldSpec::new("group0_mah",           16,  DoubleWord, "mAh"),
    FieldSpec::new("group0_mwh",           20,  DoubleWord, "mWh"),
    FieldSpec::new("group1_mah",           24,  DoubleWord, "mAh"),
    FieldSpec::new("group1_mwh",           28,  DoubleWord, "mWh"),
    FieldSpec::new("group2_mah",           32,  DoubleWord, "mAh"),
    FieldSpec::new("group2_mwh",           36,  DoubleWord, "mWh"),
    FieldSpec::new("group3_mah",           40,  DoubleWord, "mAh"),
    FieldSpec::new("group3_mwh",           44,  DoubleWord, "mWh"),
    FieldSpec::new("group4_mah",           48,  DoubleWord, "mAh"),
    FieldSpec::new("group4_mwh",           52,  DoubleWord, "mWh"),
    FieldSpec::new("group5_mah",           56,  DoubleWord, "mAh"),
    FieldSpec::new("group5_mwh",           60,  DoubleWord, "mWh"),
    FieldSpec::new("group6_mah",           64,  DoubleWord, "mAh"),
    FieldSpec::new("group6_mwh",           68,  DoubleWord, "mWh"),
    FieldSpec::new("group7_mah",           72,  DoubleWord, "mAh"),
    FieldSpec::new("group7_mwh",           76,  DoubleWord, "mWh"),
    FieldSpec::new("group8_mah",           80,  DoubleWord, "mAh"),
    FieldSpec::new("group8_mwh",           84,  DoubleWord, "mWh"),
    FieldSpec::new("group9_mah",           88,  DoubleWord, "mAh"),
    FieldSpec::new("group9_mwh",           92,  DoubleWord, "mWh"),
    FieldSpec::new("dplus_centivolts",     96,  Word,       "cV"),
    FieldSpec::new("dminus_centivolts",    98,  Word,       "cV"),
    FieldSpec::new("charge_mode",          100, Word,       ""),
    FieldSpec::new("threshold_milliamps",  102, DoubleWord, "mA"),
    FieldSpec::new("threshold_milliwatts", 106, DoubleWord, "mW"),
    FieldSpec::new("threshold_centivolts", 110, Word,       "cV"),
    FieldSpec::new("recording_seconds",    112, DoubleWord, "s"),
    FieldSpec::new("recording_active",     116, Word,       ""),
    FieldSpec::new("screen_timeout",       118, Word,       "s"),
    FieldSpec::new("backlight",            120, Word,       ""),
    FieldSpec::new("resistance_deciohms",  122, DoubleWord, "0.1 Ω"),
    FieldSpec::new("current_screen",       126, Word,       ""),
    FieldSpec::new("reserved_tail",        128, Word,       ""),
];

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Emit every field of `frame` as a debug event.
pub fn debug_fields(frame: &[u8; FRAME_SIZE]) {
    if !enabled!(Level::DEBUG) {
        return;
    }
    for f in FIELDS {
        debug!(
            layout = LAYOUT_VERSION,
            field = f.name,
            offset = f.offset,
            value = f.read(frame),
            unit = f.unit,
            "Frame field"
        );
    }
}

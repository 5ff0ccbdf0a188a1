use crate::constants::{FRAME_SIZE, GROUP_COUNT};
use crate::error::UmError;
use crate::format::fixed_point;
use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;
use strum_macros::Display;
use zerocopy::byteorder::big_endian::{I16, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use serde::{Deserialize, Serialize};

/// Charging protocol reported by the meter's D+/D- detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromPrimitive, IntoPrimitive)]
#[derive(Serialize, Deserialize)]
#[repr(u16)]
pub enum ChargeMode {
    #[strum(to_string = "Standard")]
    Standard = 0,
    #[strum(to_string = "QC2.0")]
    Qc2 = 1,
    #[strum(to_string = "QC3.0")]
    Qc3 = 2,
    #[strum(to_string = "APP2.4A")]
    Apple2_4A = 3,
    #[strum(to_string = "APP2.1A")]
    Apple2_1A = 4,
    #[strum(to_string = "APP1.0A")]
    Apple1_0A = 5,
    #[strum(to_string = "APP0.5A")]
    Apple0_5A = 6,
    #[strum(to_string = "DCP1.5A")]
    Dcp1_5A = 7,
    #[strum(to_string = "SAMSUNG")]
    Samsung = 8,

    #[num_enum(catch_all)]
    #[strum(to_string = "Unknown")]
    Unknown(u16),
}

/// A complete data-dump frame exactly as received.
pub type RawFrame = [u8; FRAME_SIZE];

/// One accumulator slot as laid out on the wire (8 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct GroupRaw {
    pub milliamp_hours: U32,  // mAh
    pub milliwatt_hours: U32, // mWh
}

/// The 130-byte data-dump frame, field for field. All words are big-endian.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct FrameRaw {
    pub reserved_head: U16,
    pub millivolts: U16,       // mV
    pub tenths_milliamps: U16, // 0.1 mA
    pub milliwatts: U32,       // mW
    pub temp_celsius: I16,     // °C
    pub temp_fahrenheit: I16,  // °F
    pub data_group: U16,       // 0-9
    pub groups: [GroupRaw; GROUP_COUNT],
    pub dplus_centivolts: U16,  // cV
    pub dminus_centivolts: U16, // cV
    pub charge_mode: U16,
    pub threshold_milliamps: U32,  // mA
    pub threshold_milliwatts: U32, // mW
    pub threshold_centivolts: U16, // cV
    pub recording_seconds: U32,    // s
    pub recording_active: U16,
    pub screen_timeout: U16,
    pub backlight: U16,
    pub resistance_deciohms: U32, // 0.1 Ω
    pub current_screen: U16,
    pub reserved_tail: U16,
}

const _: () = assert!(size_of::<FrameRaw>() == FRAME_SIZE);

impl FrameRaw {
    pub fn from_bytes(bytes: [u8; FRAME_SIZE]) -> Self {
        zerocopy::transmute!(bytes)
    }

    pub fn to_bytes(self) -> [u8; FRAME_SIZE] {
        zerocopy::transmute!(self)
    }
}

/// Accumulated totals of one data group, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Serialize, Deserialize)]
pub struct GroupTotals {
    pub milliamp_hours: u32,
    pub milliwatt_hours: u32,
}

/// Decoded data-dump frame. Values stay in the meter's integer units;
/// scaling to volts/amps/watts is done when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Measurement {
    pub reserved_head: u16,
    pub millivolts: u16,
    pub tenths_milliamps: u16,
    pub milliwatts: u32,
    pub temp_celsius: i16,
    pub temp_fahrenheit: i16,
    pub data_group: u16,
    pub groups: [GroupTotals; GROUP_COUNT],
    pub dplus_centivolts: u16,
    pub dminus_centivolts: u16,
    pub charge_mode: ChargeMode,
    pub threshold_milliamps: u32,
    pub threshold_milliwatts: u32,
    pub threshold_centivolts: u16,
    pub recording_seconds: u32,
    pub recording_active: u16,
    pub screen_timeout: u16,
    pub backlight: u16,
    pub resistance_deciohms: u32,
    pub current_screen: u16,
    pub reserved_tail: u16,
}

impl From<FrameRaw> for Measurement {
    fn from(raw: FrameRaw) -> Self {
        let groups = raw.groups.map(|g| GroupTotals {
            milliamp_hours: g.milliamp_hours.get(),
            milliwatt_hours: g.milliwatt_hours.get(),
        });

        Measurement {
            reserved_head: raw.reserved_head.get(),
            millivolts: raw.millivolts.get(),
            tenths_milliamps: raw.tenths_milliamps.get(),
            milliwatts: raw.milliwatts.get(),
            temp_celsius: raw.temp_celsius.get(),
            temp_fahrenheit: raw.temp_fahrenheit.get(),
            data_group: raw.data_group.get(),
            groups,
            dplus_centivolts: raw.dplus_centivolts.get(),
            dminus_centivolts: raw.dminus_centivolts.get(),
            charge_mode: ChargeMode::from_primitive(raw.charge_mode.get()),
            threshold_milliamps: raw.threshold_milliamps.get(),
            threshold_milliwatts: raw.threshold_milliwatts.get(),
            threshold_centivolts: raw.threshold_centivolts.get(),
            recording_seconds: raw.recording_seconds.get(),
            recording_active: raw.recording_active.get(),
            screen_timeout: raw.screen_timeout.get(),
            backlight: raw.backlight.get(),
            resistance_deciohms: raw.resistance_deciohms.get(),
            current_screen: raw.current_screen.get(),
            reserved_tail: raw.reserved_tail.get(),
        }
    }
}

impl From<&Measurement> for FrameRaw {
    fn from(m: &Measurement) -> Self {
        let groups = m.groups.map(|g| GroupRaw {
            milliamp_hours: U32::new(g.milliamp_hours),
            milliwatt_hours: U32::new(g.milliwatt_hours),
        });

        FrameRaw {
            reserved_head: U16::new(m.reserved_head),
            millivolts: U16::new(m.millivolts),
            tenths_milliamps: U16::new(m.tenths_milliamps),
            milliwatts: U32::new(m.milliwatts),
            temp_celsius: I16::new(m.temp_celsius),
            temp_fahrenheit: I16::new(m.temp_fahrenheit),
            data_group: U16::new(m.data_group),
            groups,
            dplus_centivolts: U16::new(m.dplus_centivolts),
            dminus_centivolts: U16::new(m.dminus_centivolts),
            charge_mode: U16::new(m.charge_mode.into()),
            threshold_milliamps: U32::new(m.threshold_milliamps),
            threshold_milliwatts: U32::new(m.threshold_milliwatts),
            threshold_centivolts: U16::new(m.threshold_centivolts),
            recording_seconds: U32::new(m.recording_seconds),
            recording_active: U16::new(m.recording_active),
            screen_timeout: U16::new(m.screen_timeout),
            backlight: U16::new(m.backlight),
            resistance_deciohms: U32::new(m.resistance_deciohms),
            current_screen: U16::new(m.current_screen),
            reserved_tail: U16::new(m.reserved_tail),
        }
    }
}

impl Measurement {
    /// Decode a complete data-dump frame. Total over every possible input.
    pub fn from_bytes(bytes: &[u8; FRAME_SIZE]) -> Self {
        Measurement::from(FrameRaw::from_bytes(*bytes))
    }

    /// Decode from a slice, which must be exactly one frame long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, UmError> {
        let frame: &[u8; FRAME_SIZE] = bytes.try_into().map_err(|_| UmError::FrameLength {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Measurement::from_bytes(frame))
    }

    /// Serialize back to the wire layout.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        FrameRaw::from(self).to_bytes()
    }

    /// Totals of the data group currently selected on the meter.
    ///
    /// `None` if the reported index is outside the ten slots.
    pub fn active_group(&self) -> Option<&GroupTotals> {
        self.groups.get(usize::from(self.data_group))
    }

    pub fn is_recording(&self) -> bool {
        self.recording_active != 0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VBUS: {} V, IBUS: {} A, Power: {} W, Temp: {} °C, Group: {}, Mode: {}",
            fixed_point(self.millivolts.into(), 3),
            fixed_point(self.tenths_milliamps.into(), 4),
            fixed_point(self.milliwatts.into(), 3),
            self.temp_celsius,
            self.data_group,
            self.charge_mode
        )
    }
}

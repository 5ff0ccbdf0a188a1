// Protocol constants for the RDTech UM25C

use std::time::Duration;

/// Size of the status frame returned for a data dump (130 bytes)
pub const FRAME_SIZE: usize = 130;

/// Number of accumulator slots (data groups) kept by the meter
pub const GROUP_COUNT: usize = 10;

/// Size of one data-group record: accumulated mAh + accumulated mWh (8 bytes)
pub const GROUP_RECORD_SIZE: usize = 8;

/// Line speed of the meter's serial link. RFCOMM ttys ignore it.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Request a data-dump frame
pub const CMD_DATA_DUMP: u8 = 0xF0;

/// Switch to the next screen
pub const CMD_NEXT_SCREEN: u8 = 0xF1;

/// Rotate the screen
pub const CMD_ROTATE_SCREEN: u8 = 0xF2;

/// Switch to the previous screen
pub const CMD_PREVIOUS_SCREEN: u8 = 0xF3;

/// Clear the accumulated sums of the active data group
pub const CMD_CLEAR_GROUP: u8 = 0xF4;

/// Select data group `n` with `0xA0 + n`
pub const CMD_SELECT_GROUP_BASE: u8 = 0xA0;

/// Set backlight level `n` with `0xD0 + n`
pub const CMD_BACKLIGHT_BASE: u8 = 0xD0;

/// Highest backlight level accepted by the meter
pub const MAX_BACKLIGHT: u8 = 5;

/// Set screen timeout level `n` with `0xE0 + n`
pub const CMD_SCREEN_TIMEOUT_BASE: u8 = 0xE0;

/// Highest screen timeout accepted by the meter
pub const MAX_SCREEN_TIMEOUT: u8 = 9;

/// The meter ignores requests for a while after clearing its sums
pub const CLEAR_SETTLE_TIME: Duration = Duration::from_millis(200);

use crate::constants::*;
use crate::error::UmError;
use std::fmt;

/// A single-byte request understood by the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask for a 130-byte data-dump frame
    DataDump,
    NextScreen,
    RotateScreen,
    PreviousScreen,
    /// Reset the accumulated sums of the active data group
    ClearGroup,
    /// Make data group `n` (0-9) the active one
    SelectGroup(u8),
    /// Backlight level 0-5
    SetBacklight(u8),
    /// Screen timeout level 0-9
    SetScreenTimeout(u8),
}

impl Command {
    /// Encode the command, validating its argument.
    pub fn byte(self) -> Result<u8, UmError> {
        let arg_in_range = |n: u8, max: u8, what: &str| {
            if n <= max {
                Ok(n)
            } else {
                Err(UmError::InvalidArgument(format!("{what} {n} out of range 0-{max}")))
            }
        };

        match self {
            Command::DataDump => Ok(CMD_DATA_DUMP),
            Command::NextScreen => Ok(CMD_NEXT_SCREEN),
            Command::RotateScreen => Ok(CMD_ROTATE_SCREEN),
            Command::PreviousScreen => Ok(CMD_PREVIOUS_SCREEN),
            Command::ClearGroup => Ok(CMD_CLEAR_GROUP),
            Command::SelectGroup(n) => {
                let n = arg_in_range(n, (GROUP_COUNT - 1) as u8, "data group")?;
                Ok(CMD_SELECT_GROUP_BASE + n)
            }
            Command::SetBacklight(n) => Ok(CMD_BACKLIGHT_BASE + arg_in_range(n, MAX_BACKLIGHT, "backlight")?),
            Command::SetScreenTimeout(n) => {
                Ok(CMD_SCREEN_TIMEOUT_BASE + arg_in_range(n, MAX_SCREEN_TIMEOUT, "screen timeout")?)
            }
        }
    }

    /// Whether the meter answers this command with a data-dump frame
    pub fn expects_frame(self) -> bool {
        matches!(self, Command::DataDump)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SelectGroup(n) => write!(f, "SelectGroup({n})"),
            Command::SetBacklight(n) => write!(f, "SetBacklight({n})"),
            Command::SetScreenTimeout(n) => write!(f, "SetScreenTimeout({n})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_command_bytes() {
        assert_eq!(Command::DataDump.byte().unwrap(), 0xF0);
        assert_eq!(Command::NextScreen.byte().unwrap(), 0xF1);
        assert_eq!(Command::RotateScreen.byte().unwrap(), 0xF2);
        assert_eq!(Command::PreviousScreen.byte().unwrap(), 0xF3);
        assert_eq!(Command::ClearGroup.byte().unwrap(), 0xF4);
    }

    #[test]
    fn test_argument_commands() {
        assert_eq!(Command::SelectGroup(0).byte().unwrap(), 0xA0);
        assert_eq!(Command::SelectGroup(9).byte().unwrap(), 0xA9);
        assert_eq!(Command::SetBacklight(5).byte().unwrap(), 0xD5);
        assert_eq!(Command::SetScreenTimeout(3).byte().unwrap(), 0xE3);
    }

    #[test]
    fn test_out_of_range_arguments() {
        assert!(matches!(Command::SelectGroup(10).byte(), Err(UmError::InvalidArgument(_))));
        assert!(matches!(Command::SetBacklight(6).byte(), Err(UmError::InvalidArgument(_))));
        assert!(matches!(Command::SetScreenTimeout(10).byte(), Err(UmError::InvalidArgument(_))));
    }

    #[test]
    fn test_only_data_dump_expects_frame() {
        assert!(Command::DataDump.expects_frame());
        assert!(!Command::ClearGroup.expects_frame());
        assert!(!Command::SelectGroup(2).expects_frame());
    }
}

//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use std::time::Duration;
#[allow(unused_imports)]
pub use um25c_lib::constants::{FRAME_SIZE, GROUP_COUNT};
#[allow(unused_imports)]
pub use um25c_lib::error::UmError;
#[allow(unused_imports)]
pub use um25c_lib::{
    ChargeMode, Command, GroupTotals, Measurement, RawFrame, Sampler, SamplerConfig, Shutdown, StopReason, Template,
    Um25c,
};

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

/// A reading resembling a phone charging at 5 V / 1.2 A on data group 3
#[allow(dead_code)]
pub fn charging_measurement() -> Measurement {
    let mut groups = [GroupTotals::default(); GROUP_COUNT];
    groups[0] = GroupTotals {
        milliamp_hours: 11,
        milliwatt_hours: 22,
    };
    groups[3] = GroupTotals {
        milliamp_hours: 123456,
        milliwatt_hours: 654321,
    };

    Measurement {
        reserved_head: 0x0963,
        millivolts: 5083,
        tenths_milliamps: 12034,
        milliwatts: 6116,
        temp_celsius: 27,
        temp_fahrenheit: 80,
        data_group: 3,
        groups,
        dplus_centivolts: 272,
        dminus_centivolts: 265,
        charge_mode: ChargeMode::Apple2_4A,
        threshold_milliamps: 10,
        threshold_milliwatts: 0,
        threshold_centivolts: 30,
        recording_seconds: 3600,
        recording_active: 1,
        screen_timeout: 2,
        backlight: 5,
        resistance_deciohms: 42,
        current_screen: 1,
        reserved_tail: 0x8068,
    }
}

/// Frame whose bytes are all distinct from their neighbours, so a misplaced
/// offset or swapped byte order shows up in comparisons.
#[allow(dead_code)]
pub fn patterned_frame(seed: u8) -> RawFrame {
    let mut frame = [0u8; FRAME_SIZE];
    for (i, b) in frame.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(37).wrapping_add(seed);
    }
    frame
}

/// Chunk sizes between 1 and 50 adding up to one frame
#[allow(dead_code)]
pub fn uneven_chunks() -> Vec<usize> {
    let sizes = [1, 50, 3, 17, 1, 29, 8, 21];
    assert_eq!(sizes.iter().sum::<usize>(), FRAME_SIZE);
    sizes.to_vec()
}

/// Simulated meter on the far end of an in-memory pipe.
#[allow(dead_code)]
pub struct FakeMeter {
    pub commands: Arc<Mutex<Vec<u8>>>,
    pub task: JoinHandle<()>,
}

#[allow(dead_code)]
impl FakeMeter {
    /// Answer every data-dump request with `frame`, written in `chunk`-byte pieces.
    /// With `respond` unset the meter records commands but never answers.
    pub fn spawn(frame: RawFrame, chunk: usize, respond: bool) -> (DuplexStream, FakeMeter) {
        let (client, mut server) = tokio::io::duplex(1024);
        let commands = Arc::new(Mutex::new(Vec::new()));
        let log = commands.clone();

        let task = tokio::spawn(async move {
            let mut byte = [0u8; 1];
            loop {
                match server.read(&mut byte).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                log.lock().unwrap().push(byte[0]);
                if byte[0] == 0xF0 && respond {
                    for piece in frame.chunks(chunk) {
                        if server.write_all(piece).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        (client, FakeMeter { commands, task })
    }

    /// Wait for the link to close and return every command byte received.
    pub async fn finish(self) -> Vec<u8> {
        self.task.await.expect("fake meter task panicked");
        let commands = self.commands.lock().unwrap();
        commands.clone()
    }
}

use crate::error::UmError;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

/// Open the meter's tty (an RFCOMM binding or a USB serial adapter) in raw 8N1 mode.
///
/// The returned stream is registered with the tokio reactor, so a pending
/// read can be dropped at any time without leaving a blocked thread behind.
pub fn open(path: &str, baud_rate: u32) -> Result<SerialStream, UmError> {
    let stream = tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()?;
    info!(path, baud_rate, "Opened serial device");
    Ok(stream)
}


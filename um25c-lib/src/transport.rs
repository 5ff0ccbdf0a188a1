use crate::command::Command;
use crate::constants::{CLEAR_SETTLE_TIME, FRAME_SIZE};
use crate::error::UmError;
use crate::frame::{Measurement, RawFrame};
use crate::layout;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace};

/// Write one command byte and flush it out.
pub async fn send_command<S>(stream: &mut S, command: Command) -> Result<(), UmError>
where
    S: AsyncWrite + Unpin,
{
    let byte = command.byte()?;
    debug!(bytes = hex::encode([byte]), %command, "Serial Write");
    stream.write_all(&[byte]).await?;
    stream.flush().await?;
    Ok(())
}

/// Read until a whole frame has arrived.
///
/// The meter streams the frame in arbitrary chunks, so a single read is
/// never assumed to return all of it. A zero-byte read means the link is gone.
pub async fn read_frame<S>(stream: &mut S) -> Result<RawFrame, UmError>
where
    S: AsyncRead + Unpin,
{
    let mut frame = [0u8; FRAME_SIZE];
    let mut received = 0;

    while received < FRAME_SIZE {
        let n = match stream.read(&mut frame[received..]).await {
            Ok(0) => {
                return Err(UmError::Disconnected {
                    received,
                    expected: FRAME_SIZE,
                });
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        received += n;
        trace!(chunk = n, received, "Partial frame read");
    }

    debug!(bytes = hex::encode(frame), "Serial Read");
    layout::debug_fields(&frame);
    Ok(frame)
}

/// One request/response round trip: `command` out, a full frame back.
pub async fn exchange<S>(stream: &mut S, command: Command) -> Result<RawFrame, UmError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    send_command(stream, command).await?;
    read_frame(stream).await
}

/// Connection to a UM25C over any byte stream (RFCOMM tty, serial adapter, test double).
pub struct Um25c<S> {
    stream: S,
}

impl<S> Um25c<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Request and return the raw data-dump frame
    pub async fn request_frame(&mut self) -> Result<RawFrame, UmError> {
        exchange(&mut self.stream, Command::DataDump).await
    }

    /// Request and decode a data-dump frame
    pub async fn request_measurement(&mut self) -> Result<Measurement, UmError> {
        let frame = self.request_frame().await?;
        Ok(Measurement::from_bytes(&frame))
    }

    /// Send a command that has no response frame.
    ///
    /// The meter drops requests that arrive right after such a command, so
    /// this returns only once it has had time to settle.
    pub async fn send(&mut self, command: Command) -> Result<(), UmError> {
        if command.expects_frame() {
            return Err(UmError::InvalidArgument(format!(
                "{command} expects a response frame, use request_frame()"
            )));
        }
        send_command(&mut self.stream, command).await?;
        tokio::time::sleep(CLEAR_SETTLE_TIME).await;
        Ok(())
    }

    /// Reset the sums of the active data group
    pub async fn clear_group(&mut self) -> Result<(), UmError> {
        info!("Clearing accumulated sums of the active data group");
        self.send(Command::ClearGroup).await
    }

    pub async fn select_group(&mut self, group: u8) -> Result<(), UmError> {
        info!(group, "Selecting data group");
        self.send(Command::SelectGroup(group)).await
    }

    /// Flush pending output and shut down the write side of the link.
    pub async fn close(&mut self) -> Result<(), UmError> {
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        info!("Device link closed");
        Ok(())
    }
}

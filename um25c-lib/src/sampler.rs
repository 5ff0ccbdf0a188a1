use crate::error::UmError;
use crate::format::{Template, format_time};
use crate::frame::Measurement;
use crate::scheduler::{Schedule, Shutdown, Wake};
use crate::transport::Um25c;
use serde::{Serialize, Serializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Clock used for the `Time` token and the JSON `time` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBase {
    /// Monotonic time elapsed since sampling started
    #[default]
    Session,
    /// Wall-clock time since the Unix epoch
    Unix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Text(Template),
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub output: OutputMode,
    pub interval: Duration,
    pub time_base: TimeBase,
    /// Stop after this many samples
    pub count: Option<u64>,
    /// Data group to select before sampling
    pub select_group: Option<u8>,
    /// Clear the active group's sums before sampling
    pub clear_sums: bool,
}

impl SamplerConfig {
    /// Text output with `template`, sampling every `interval_secs` seconds.
    pub fn new(template: &str, interval_secs: f64) -> Result<Self, UmError> {
        Ok(Self {
            output: OutputMode::Text(Template::parse(template)),
            interval: Schedule::interval_from_secs(interval_secs)?,
            time_base: TimeBase::default(),
            count: None,
            select_group: None,
            clear_sums: false,
        })
    }
}

/// One decoded reading and the time its frame finished arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleEvent {
    #[serde(rename = "time", serialize_with = "serialize_time")]
    pub timestamp: Duration,
    #[serde(flatten)]
    pub measurement: Measurement,
}

fn serialize_time<S: Serializer>(timestamp: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_time(*timestamp))
}

impl SampleEvent {
    pub fn to_json_line(&self) -> Result<String, UmError> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    CountReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: u64,
    pub stop: StopReason,
}

/// Polls the meter on a fixed schedule and writes one line per reading.
pub struct Sampler<S> {
    device: Um25c<S>,
    config: SamplerConfig,
    shutdown: Shutdown,
}

impl<S> Sampler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(device: Um25c<S>, config: SamplerConfig, shutdown: Shutdown) -> Self {
        Self {
            device,
            config,
            shutdown,
        }
    }

    /// Run until shutdown, a sample limit, or a fatal error.
    ///
    /// The device link is closed on every exit path.
    pub async fn run<W>(&mut self, out: &mut W) -> Result<RunSummary, UmError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut samples = 0;
        let result = match self.sample_loop(out, &mut samples).await {
            Ok(stop) => Ok(RunSummary { samples, stop }),
            Err(UmError::Interrupted) => Ok(RunSummary {
                samples,
                stop: StopReason::Interrupted,
            }),
            Err(e) => Err(e),
        };

        match self.device.close().await {
            Ok(()) => {}
            Err(e) if result.is_err() => warn!("Failed to close device link: {}", e),
            Err(e) => return Err(e),
        }

        if let Ok(summary) = &result {
            info!(samples = summary.samples, stop = ?summary.stop, "Sampling finished");
        }
        result
    }

    async fn prepare_device(&mut self) -> Result<(), UmError> {
        if let Some(group) = self.config.select_group {
            self.device.select_group(group).await?;
        }
        if self.config.clear_sums {
            self.device.clear_group().await?;
        }
        Ok(())
    }

    async fn sample_loop<W>(&mut self, out: &mut W, samples: &mut u64) -> Result<StopReason, UmError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.config.count == Some(0) {
            return Ok(StopReason::CountReached);
        }
        self.prepare_device().await?;

        let started = Instant::now();
        let mut schedule = Schedule::starting_at(started, self.config.interval);
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            time_base = ?self.config.time_base,
            "Starting sampling loop"
        );

        loop {
            if self.shutdown.is_requested() {
                return Err(UmError::Interrupted);
            }

            let measurement = tokio::select! {
                biased;
                _ = self.shutdown.requested() => return Err(UmError::Interrupted),
                m = self.device.request_measurement() => m?,
            };
            let event = SampleEvent {
                timestamp: self.timestamp(started)?,
                measurement,
            };
            debug!(sample = *samples + 1, "{}", event.measurement);

            let line = match &self.config.output {
                OutputMode::Text(template) => template.render(&event.measurement, event.timestamp),
                OutputMode::Json => event.to_json_line()?,
            };
            out.write_all(line.as_bytes()).await?;
            out.flush().await?;
            *samples += 1;

            if self.config.count.is_some_and(|limit| *samples >= limit) {
                return Ok(StopReason::CountReached);
            }
            if self.shutdown.is_requested() {
                return Err(UmError::Interrupted);
            }
            if schedule.tick(&self.shutdown).await? == Wake::Shutdown {
                return Err(UmError::Interrupted);
            }
        }
    }

    fn timestamp(&self, started: Instant) -> Result<Duration, UmError> {
        match self.config.time_base {
            TimeBase::Session => Ok(started.elapsed()),
            TimeBase::Unix => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| UmError::Clock(format!("system clock is before the Unix epoch: {e}"))),
        }
    }
}

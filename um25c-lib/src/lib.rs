pub mod command;
pub mod constants;
pub mod error;
pub mod format;
pub mod frame;
pub mod layout;
pub mod sampler;
pub mod scheduler;
pub mod serial;
pub mod transport;

// Re-export the commonly used types for easy access
pub use command::Command;
pub use error::UmError;
pub use format::{Template, TokenSet};
pub use frame::{ChargeMode, FrameRaw, GroupTotals, Measurement, RawFrame};
pub use sampler::{OutputMode, RunSummary, SampleEvent, Sampler, SamplerConfig, StopReason, TimeBase};
pub use scheduler::{Schedule, Shutdown, Wake};
pub use transport::{Um25c, exchange};

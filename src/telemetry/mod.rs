//! Telemetry emission
//!
//! - `record` - the records, reports and envelope sent to a sink
//! - `exception` - normalization of raised values
//! - `target` - the process-wide client and its scope
//! - `facade` - the uniform logging/capture API used by scenarios

pub mod exception;
pub mod facade;
pub mod record;
pub mod target;

pub use exception::Thrown;
pub use facade::TelemetryFacade;
pub use record::{Attachment, CaptureContext, ErrorInfo, ExceptionReport, Level, Tags, TelemetryRecord, UserIdentity};
pub use target::{Client, ClientOptions, Scope, SinkTarget};

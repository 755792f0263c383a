//! Sink target: one client per process, plus a scope merged onto everything sent
//!
//! Initialization order is fixed: build the client, build the scope, attach
//! the scope to the client, then mark the client initialized. Anything
//! captured on an uninitialized client is dropped with a warning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::exception::Thrown;
use super::record::{Attachment, CaptureContext, Envelope, ExceptionReport, Tags, TelemetryRecord, UserIdentity};
use crate::config::ClientConfig;
use crate::sink::{SinkError, TelemetrySink};

/// Options stamped onto every outgoing envelope
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub environment: Option<String>,
    pub release: Option<String>,
    /// Log every outgoing record at debug level
    pub debug: bool,
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            environment: Some(config.environment.clone()).filter(|s| !s.is_empty()),
            release: Some(config.release.clone()).filter(|s| !s.is_empty()),
            debug: config.debug,
        }
    }
}

/// Owns the sink and the client options
pub struct Client {
    options: ClientOptions,
    sink: Arc<dyn TelemetrySink>,
    initialized: AtomicBool,
}

impl Client {
    pub fn new(options: ClientOptions, sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            options,
            sink,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn init(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        log::info!("Telemetry client initialized with '{}' sink", self.sink.name());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    pub fn capture_event(&self, mut record: TelemetryRecord) {
        if !self.accepting("event") {
            return;
        }
        self.stamp(&mut record.envelope);
        if self.options.debug {
            log::debug!("Outgoing event: {}", serde_json::to_string(&record).unwrap_or_default());
        }
        self.report("capture_event", self.sink.capture_event(&record));
    }

    pub fn capture_exception(&self, mut report: ExceptionReport) {
        if !self.accepting("exception") {
            return;
        }
        self.stamp(&mut report.envelope);
        if self.options.debug {
            log::debug!("Outgoing exception: {}", serde_json::to_string(&report).unwrap_or_default());
        }
        self.report("capture_exception", self.sink.capture_exception(&report));
    }

    pub fn set_user(&self, user: &UserIdentity) {
        self.report("set_user", self.sink.set_user(user));
    }

    pub fn add_attachment(&self, attachment: &Attachment) {
        self.report("add_attachment", self.sink.add_attachment(attachment));
    }

    pub fn clear_attachments(&self) {
        self.report("clear_attachments", self.sink.clear_attachments());
    }

    pub fn start_buffering(&self) {
        self.report("start_buffering", self.sink.start_buffering());
    }

    pub fn flush(&self) {
        self.report("flush", self.sink.flush());
    }

    pub fn stop(&self) {
        self.report("stop", self.sink.stop());
    }

    fn accepting(&self, what: &str) -> bool {
        if !self.is_initialized() {
            log::warn!("Telemetry client not initialized, dropping {}", what);
        }
        self.is_initialized()
    }

    fn stamp(&self, envelope: &mut Envelope) {
        if envelope.environment.is_none() {
            envelope.environment = self.options.environment.clone();
        }
        if envelope.release.is_none() {
            envelope.release = self.options.release.clone();
        }
    }

    /// Sink failures stop here
    fn report(&self, operation: &str, result: Result<(), SinkError>) {
        if let Err(e) = result {
            log::warn!("Telemetry sink '{}' failed on {}: {}", self.sink.name(), operation, e);
        }
    }
}

#[derive(Debug, Default)]
struct ScopeContext {
    tags: Tags,
    user: Option<UserIdentity>,
    attachments: Vec<Attachment>,
}

/// Shared mutable context merged onto records when they are sent
#[derive(Default)]
pub struct Scope {
    client: Option<Arc<Client>>,
    context: Mutex<ScopeContext>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_client(&mut self, client: Arc<Client>) {
        self.client = Some(client);
    }

    fn context(&self) -> MutexGuard<'_, ScopeContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.context().tags.insert(key.into(), value.into());
    }

    pub fn set_user(&self, user: UserIdentity) {
        self.context().user = Some(user.clone());
        if let Some(client) = &self.client {
            client.set_user(&user);
        }
    }

    pub fn add_attachment(&self, attachment: Attachment) {
        if let Some(client) = &self.client {
            client.add_attachment(&attachment);
        }
        self.context().attachments.push(attachment);
    }

    pub fn clear_attachments(&self) {
        self.context().attachments.clear();
        if let Some(client) = &self.client {
            client.clear_attachments();
        }
    }

    pub fn attachments(&self) -> Vec<String> {
        self.context().attachments.iter().map(|a| a.filename.clone()).collect()
    }

    /// Per-item values win over scope values
    fn merge(&self, envelope: &mut Envelope) {
        let context = self.context();

        for (key, value) in &context.tags {
            envelope.tags.entry(key.clone()).or_insert_with(|| value.clone());
        }
        if envelope.user.is_none() {
            envelope.user = context.user.clone();
        }
        for attachment in &context.attachments {
            if !envelope.attachments.contains(&attachment.filename) {
                envelope.attachments.push(attachment.filename.clone());
            }
        }
    }

    pub fn capture_event(&self, mut record: TelemetryRecord) {
        self.merge(&mut record.envelope);
        match &self.client {
            Some(client) => client.capture_event(record),
            None => log::warn!("Scope has no client, dropping event '{}'", record.message),
        }
    }

    pub fn capture_exception(&self, thrown: impl Into<Thrown>, context: CaptureContext) {
        let (error, mut extra) = thrown.into().normalize();
        extra.extend(context.extra);

        let mut report = ExceptionReport::new(error, extra);
        report.envelope.tags = context.tags;
        self.merge(&mut report.envelope);

        match &self.client {
            Some(client) => client.capture_exception(report),
            None => log::warn!("Scope has no client, dropping exception '{}'", report.error),
        }
    }
}

/// Process-wide client and scope
#[derive(Clone)]
pub struct SinkTarget {
    client: Arc<Client>,
    scope: Arc<Scope>,
}

impl SinkTarget {
    pub fn init(options: ClientOptions, sink: Arc<dyn TelemetrySink>, tags: &Tags) -> Self {
        let client = Arc::new(Client::new(options, sink));

        let mut scope = Scope::new();
        scope.set_client(Arc::clone(&client));
        for (key, value) in tags {
            scope.set_tag(key.clone(), value.clone());
        }

        client.init();

        Self {
            client,
            scope: Arc::new(scope),
        }
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }
}

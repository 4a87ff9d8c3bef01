//! Form state and the transitions driven by the four user actions:
//! edit, confirm, resolve-self, lookup-info.
//!
//! Network actions are split into `begin_*` / `apply_*` halves so a caller
//! can run the request elsewhere (the terminal form spawns a task) and feed
//! the outcome back. [`FormController::resolve_self`] and
//! [`FormController::lookup_info`] compose the halves for callers that can
//! simply await.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{LookupError, NetworkError};
use crate::net::LookupClient;
use crate::notify::{Notification, NotificationSink, Severity};
use crate::record::AddressInfoRecord;
use crate::validate;

/// Inline message shown next to the input when the last check failed.
pub const INVALID_FORMAT: &str = "Invalid IPV4 address format";

/// Result of the last confirm transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationState {
    /// No check has run yet.
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

/// Correlates a network action with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct FormController {
    address: String,
    validation: ValidationState,
    info: Option<AddressInfoRecord>,
    next_request: u64,
    pending: usize,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn validation(&self) -> ValidationState {
        self.validation
    }

    /// Most recent successful lookup, if any.
    pub fn info(&self) -> Option<&AddressInfoRecord> {
        self.info.as_ref()
    }

    /// Network actions started but not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Replace the address text. Validation is left as it was until the
    /// next confirm.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.address = text.into();
    }

    /// Check the current address and record the result. Emits nothing.
    pub fn confirm(&mut self) -> ValidationState {
        self.validation = match validate::check(&self.address) {
            Ok(()) => ValidationState::Valid,
            Err(e) => {
                debug!(error = %e, "address failed validation");
                ValidationState::Invalid
            }
        };
        self.validation
    }

    pub fn inline_error(&self) -> Option<&'static str> {
        (self.validation == ValidationState::Invalid).then_some(INVALID_FORMAT)
    }

    pub fn begin_resolve_self(&mut self) -> RequestId {
        self.start_request()
    }

    /// On success the address is replaced and immediately confirmed; on
    /// failure one error notification is emitted and nothing changes.
    pub fn apply_resolve_self(
        &mut self,
        id: RequestId,
        result: Result<String, NetworkError>,
        sink: &mut dyn NotificationSink,
    ) {
        self.finish_request();
        match result {
            Ok(ip) => {
                info!(request = %id, ip = %ip, "server address resolved");
                sink.notify(Notification::new(
                    Severity::Success,
                    format!("Server IP is {}", ip),
                ));
                self.address = ip;
                self.confirm();
            }
            Err(e) => {
                warn!(request = %id, error = %e, "fetching server address failed");
                let message = match e {
                    NetworkError::Status(_) => {
                        "The API you are requesting from is not working properly at the moment"
                    }
                    _ => "Error fetching IP address",
                };
                sink.notify(Notification::new(Severity::Error, message));
            }
        }
    }

    /// Start a lookup of the current address, returning the address to
    /// query. The address is looked up whatever its validation state; the
    /// progress notice becomes a warning when the last check rejected it.
    pub fn begin_lookup(&mut self, sink: &mut dyn NotificationSink) -> (RequestId, String) {
        let notice = if self.validation == ValidationState::Invalid {
            Notification::new(
                Severity::Warn,
                format!("{} failed validation; looking it up anyway", self.address),
            )
        } else {
            Notification::new(Severity::Info, format!("Looking up {}", self.address))
        };
        sink.notify(notice);
        (self.start_request(), self.address.clone())
    }

    /// On success the stored record is replaced wholesale; on failure the
    /// previous record (or its absence) is kept.
    pub fn apply_lookup(
        &mut self,
        id: RequestId,
        result: Result<AddressInfoRecord, LookupError>,
        sink: &mut dyn NotificationSink,
    ) {
        self.finish_request();
        match result {
            Ok(record) => {
                info!(request = %id, fields = record.attrs().len(), "address info loaded");
                sink.notify(Notification::new(
                    Severity::Success,
                    "IP information loaded",
                ));
                self.info = Some(record);
            }
            Err(e) => {
                warn!(request = %id, error = %e, "address lookup failed");
                sink.notify(Notification::new(
                    Severity::Error,
                    format!("Error fetching IP information: {}", e),
                ));
            }
        }
    }

    pub async fn resolve_self(
        &mut self,
        client: &LookupClient,
        sink: &mut dyn NotificationSink,
    ) -> ValidationState {
        let id = self.begin_resolve_self();
        let result = client.resolve_self().await;
        self.apply_resolve_self(id, result, sink);
        self.validation
    }

    /// Returns the stored record afterwards, which is the previous one
    /// when this lookup failed.
    pub async fn lookup_info(
        &mut self,
        client: &LookupClient,
        sink: &mut dyn NotificationSink,
    ) -> Option<&AddressInfoRecord> {
        let (id, address) = self.begin_lookup(sink);
        let result = client.lookup(&address).await;
        self.apply_lookup(id, result, sink);
        self.info.as_ref()
    }

    fn start_request(&mut self) -> RequestId {
        self.next_request += 1;
        self.pending += 1;
        RequestId(self.next_request)
    }

    fn finish_request(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}

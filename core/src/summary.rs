/// One-shot "email me a report" request flow
///
/// Status walks `Idle -> Pending -> {Ok|Error} -> Idle` and nothing else.
/// At most one non-idle request exists per conversation; the transport
/// does not enforce this, the flow does.
use crate::events::OutboundIntent;
use crate::notify::{Notifier, StateChange};
use crate::outbound::OutboundSink;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const GENERIC_FAILURE: &str = "Report generation failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Idle,
    Pending,
    Ok,
    Error,
}

/// Minimal address-shape check: local@domain.tld, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub struct SummaryRequestFlow {
    sink: Arc<dyn OutboundSink>,
    notifier: Notifier,
    status: SummaryStatus,
}

impl SummaryRequestFlow {
    pub fn new(sink: Arc<dyn OutboundSink>, notifier: Notifier) -> Self {
        Self {
            sink,
            notifier,
            status: SummaryStatus::Idle,
        }
    }

    pub fn status(&self) -> SummaryStatus {
        self.status
    }

    /// Issue the one-shot request. Rejected synchronously while a request
    /// is pending or when the address fails the shape check.
    pub fn request(&mut self, email: &str) -> bool {
        if self.status == SummaryStatus::Pending {
            debug!("summary request rejected: already pending");
            return false;
        }
        if !is_valid_email(email) {
            debug!("summary request rejected: invalid address");
            return false;
        }
        self.status = SummaryStatus::Pending;
        self.notifier.publish(StateChange::SummaryChanged {
            status: SummaryStatus::Pending,
            message: None,
        });
        self.sink.emit(OutboundIntent::RequestSummary {
            email: email.trim().to_string(),
        });
        true
    }

    /// Advisory progress from the collaborator; status is unchanged.
    pub fn on_progress(&self, step: &str, detail: Option<&str>) {
        if self.status != SummaryStatus::Pending {
            debug!("summary progress while not pending: {}", step);
        }
        self.notifier.publish(StateChange::SummaryProgress {
            step: step.to_string(),
            detail: detail.map(str::to_string),
        });
    }

    /// Terminal result. A malformed or unknown status maps to `Error` with
    /// a generic message; either way the flow immediately returns to
    /// `Idle`, so the next request is permitted. Returns the terminal
    /// outcome for callers that surface it to the user. A result arriving
    /// while no request is pending (unsolicited, or a duplicate after a
    /// terminal result) is ignored.
    pub fn on_result(
        &mut self,
        status: Option<&str>,
        message: Option<&str>,
    ) -> Option<(SummaryStatus, Option<String>)> {
        if self.status != SummaryStatus::Pending {
            debug!("summary result while not pending, ignoring: {:?}", status);
            return None;
        }
        let (terminal, message) = match status {
            Some("ok") => (SummaryStatus::Ok, message.map(str::to_string)),
            Some("error") => (
                SummaryStatus::Error,
                Some(message.unwrap_or(GENERIC_FAILURE).to_string()),
            ),
            other => {
                warn!("malformed summary result {:?}, treating as error", other);
                (SummaryStatus::Error, Some(GENERIC_FAILURE.to_string()))
            }
        };
        self.notifier.publish(StateChange::SummaryChanged {
            status: terminal,
            message: message.clone(),
        });
        self.status = SummaryStatus::Idle;
        Some((terminal, message))
    }
}

// src/notify/mod.rs
pub mod dry_run;
pub mod twilio;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::error::NotifierError;

pub const BOOKING_URL: &str = "https://ttp.cbp.dhs.gov";

/// Provider-assigned id of a dispatched message. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, body: &str) -> Result<MessageId, NotifierError>;
}

/// Text sent for a newly opened slot, e.g.
/// `Nexus appt in Champlain, NY at Thursday May 02, 08:15AM! Log in at https://ttp.cbp.dhs.gov`.
/// The time is shown in the slot's own offset, i.e. the center's wall clock.
pub fn compose_message<Tz>(label: &str, start: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "Nexus appt in {label} at {}! Log in at {BOOKING_URL}",
        start.format("%A %B %d, %I:%M%p")
    )
}

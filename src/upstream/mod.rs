// src/upstream/mod.rs
pub mod ttp;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::watchlist::LocationId;

/// A location reported by the "as-locations" query. The query only returns
/// centers with at least one open slot, so presence is all that matters here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationSummary {
    pub id: LocationId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Slot exactly as the scheduler serializes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSlot {
    pub location_id: LocationId,
    pub start_timestamp: String,
    #[serde(default)]
    pub end_timestamp: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
}

/// An open appointment. `(location_id, start)` identifies it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Slot {
    pub location_id: LocationId,
    /// Upstream text, kept for logs and the cache payload.
    pub start_timestamp: String,
    pub start: DateTime<FixedOffset>,
    pub end_timestamp: Option<String>,
    pub duration: Option<u32>,
}

impl Slot {
    pub fn from_raw(raw: RawSlot, zone: SlotZone) -> Result<Self, UpstreamError> {
        let start = parse_start_timestamp(&raw.start_timestamp, zone)?;
        Ok(Self {
            location_id: raw.location_id,
            start_timestamp: raw.start_timestamp,
            start,
            end_timestamp: raw.end_timestamp,
            duration: raw.duration,
        })
    }
}

/// Read operations against the scheduling service.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Locations currently reporting at least one open slot.
    async fn list_open_locations(&self) -> Result<Vec<LocationSummary>, UpstreamError>;

    /// Soonest open slot(s) for one location (the query caps at one).
    async fn list_soonest_slots(&self, location_id: LocationId)
        -> Result<Vec<Slot>, UpstreamError>;
}

/// How zone-less scheduler timestamps are placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotZone {
    /// Host time zone rules for the slot's own date, so a December slot
    /// read in July still gets the winter offset.
    #[default]
    HostLocal,
    /// One offset for every slot.
    Fixed(FixedOffset),
}

impl SlotZone {
    fn resolve(self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            SlotZone::Fixed(offset) => offset.from_local_datetime(naive).single(),
            SlotZone::HostLocal => {
                // Ambiguous fall-back hour takes the first occurrence; a
                // wall time skipped by spring-forward moves past the gap.
                let local = Local
                    .from_local_datetime(naive)
                    .earliest()
                    .or_else(|| Local.from_local_datetime(&(*naive + Duration::hours(1))).earliest())?;
                Some(local.with_timezone(&local.offset().fix()))
            }
        }
    }
}

const ZONELESS_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Accepts RFC 3339, or the scheduler's usual zone-less `2024-05-02T08:15`
/// form which is read as wall-clock time in `zone`.
pub fn parse_start_timestamp(raw: &str, zone: SlotZone) -> Result<DateTime<FixedOffset>, UpstreamError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for fmt in ZONELESS_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(dt) = zone.resolve(&naive) {
                return Ok(dt);
            }
        }
    }
    Err(UpstreamError::Malformed(format!(
        "unrecognized startTimestamp {raw:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eastern() -> SlotZone {
        SlotZone::Fixed(FixedOffset::west_opt(4 * 3600).unwrap())
    }

    #[test]
    fn zoneless_timestamp_uses_configured_offset() {
        let dt = parse_start_timestamp("2024-05-02T08:15", eastern()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-02T08:15:00-04:00");

        let with_secs = parse_start_timestamp("2024-05-02T08:15:00", eastern()).unwrap();
        assert_eq!(dt, with_secs);
    }

    #[test]
    fn explicit_offset_wins_over_configured() {
        let dt = parse_start_timestamp("2024-05-02T08:15:00Z", eastern()).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.timestamp(), 1_714_637_700);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse_start_timestamp("next tuesday", eastern()).unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[test]
    fn raw_slot_ignores_extra_fields() {
        let json = r#"[{"locationId":5021,"startTimestamp":"2024-05-02T08:15",
            "endTimestamp":"2024-05-02T08:30","active":1,"duration":15,"remoteInd":false}]"#;
        let raw: Vec<RawSlot> = serde_json::from_str(json).unwrap();
        let slot = Slot::from_raw(raw[0].clone(), eastern()).unwrap();
        assert_eq!(slot.location_id, 5021);
        assert_eq!(slot.duration, Some(15));
        assert_eq!(slot.start_timestamp, "2024-05-02T08:15");
    }
}

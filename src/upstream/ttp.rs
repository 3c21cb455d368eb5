// src/upstream/ttp.rs
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{LocationSummary, RawSlot, Slot, SlotZone, UpstreamClient};
use crate::error::UpstreamError;
use crate::watchlist::LocationId;

pub const DEFAULT_BASE_URL: &str = "https://ttp.cbp.dhs.gov";

#[derive(Debug, Clone)]
pub struct TtpSettings {
    pub base_url: String,
    pub service_name: String,
    /// Cap passed to the as-locations query.
    pub location_limit: u32,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Zone for zone-less `startTimestamp` values.
    pub slot_zone: SlotZone,
}

impl Default for TtpSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            service_name: "NEXUS".to_string(),
            location_limit: 5,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            slot_zone: SlotZone::HostLocal,
        }
    }
}

/// Client for the public trusted-traveler scheduler API.
#[derive(Clone)]
pub struct TtpClient {
    client: Client,
    settings: TtpSettings,
}

impl TtpClient {
    pub fn new(settings: TtpSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.connect_timeout + settings.read_timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(format!("building http client: {e}")))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let resp = self.client.get(self.url(path)).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(format!("{path}: {e}")))
    }
}

#[async_trait]
impl UpstreamClient for TtpClient {
    async fn list_open_locations(&self) -> Result<Vec<LocationSummary>, UpstreamError> {
        let query = [
            ("temporary", "false".to_string()),
            ("inviteOnly", "false".to_string()),
            ("operational", "true".to_string()),
            ("serviceName", self.settings.service_name.clone()),
            ("minimum", "1".to_string()),
            ("limit", self.settings.location_limit.to_string()),
        ];
        self.get_json("/schedulerapi/slots/asLocations", &query)
            .await
    }

    async fn list_soonest_slots(
        &self,
        location_id: LocationId,
    ) -> Result<Vec<Slot>, UpstreamError> {
        let query = [
            ("orderBy", "soonest".to_string()),
            ("limit", "1".to_string()),
            ("locationId", location_id.to_string()),
            ("minimum", "1".to_string()),
        ];
        let raw: Vec<RawSlot> = self.get_json("/schedulerapi/slots", &query).await?;
        raw.into_iter()
            .map(|r| Slot::from_raw(r, self.settings.slot_zone))
            .collect()
    }
}

/// The scheduler sits behind a bot filter that rejects non-browser clients,
/// so requests carry the header set of a desktop Chrome session.
fn browser_headers() -> HeaderMap {
    const HEADERS: [(&str, &str); 14] = [
        ("accept", "application/json, text/plain, */*"),
        ("accept-encoding", "application/json, text/plain, */*"),
        ("accept-language", "en-US,en;q=0.9"),
        ("authorization", ""),
        ("dnt", "1"),
        ("origin", "https://ttp.dhs.gov"),
        ("referer", "https://ttp.dhs.gov/"),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-site"),
        (
            "user-agent",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.0.0 Safari/537.36",
        ),
        (
            "sec-ch-ua",
            r#""Chromium";v="104", " Not A;Brand";v="99", "Google Chrome";v="104""#,
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""macOS""#),
    ];

    let mut map = HeaderMap::with_capacity(HEADERS.len());
    for (name, value) in HEADERS {
        map.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    map
}

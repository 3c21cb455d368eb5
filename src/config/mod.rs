// src/config/mod.rs
pub mod watchlist;

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, Offset};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::notify::twilio::TwilioCredentials;
use crate::pipeline::PipelineOptions;
use crate::upstream::ttp::{TtpSettings, DEFAULT_BASE_URL};
use crate::upstream::SlotZone;

/// Where dedup records go and how texts leave the process.
#[derive(Debug, Clone)]
pub enum Delivery {
    Live {
        redis_url: String,
        twilio: TwilioCredentials,
        recipient: String,
    },
    /// In-process store and log-only notifier.
    DryRun { recipient: String },
}

impl Delivery {
    pub fn recipient(&self) -> &str {
        match self {
            Delivery::Live { recipient, .. } | Delivery::DryRun { recipient } => recipient,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub delivery: Delivery,
    pub upstream: TtpSettings,
    pub pipeline: PipelineOptions,
    /// Bound on each dedup store round trip.
    pub cache_timeout: Duration,
    pub metrics_textfile: Option<PathBuf>,
}

impl AppConfig {
    /// Read the environment once at startup.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dry_run = get("NEXUS_DRY_RUN").is_some_and(|v| is_truthy(&v));
        let required = |key: &str| -> Result<String> {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let delivery = if dry_run {
            Delivery::DryRun {
                recipient: get("TWILIO_TO").unwrap_or_else(|| "dry-run".to_string()),
            }
        } else {
            Delivery::Live {
                redis_url: required("REDIS_URL")?,
                twilio: TwilioCredentials {
                    account_sid: required("TWILIO_ACCOUNT_SID")?,
                    auth_token: required("TWILIO_AUTH_TOKEN")?,
                    from: required("TWILIO_FROM")?,
                },
                recipient: required("TWILIO_TO")?,
            }
        };

        let connect_secs: u64 = parse_or(&get, "NEXUS_CONNECT_TIMEOUT_SECS", 10)?;
        let read_secs: u64 = parse_or(&get, "NEXUS_READ_TIMEOUT_SECS", 10)?;
        let slot_zone = match get("NEXUS_SLOT_UTC_OFFSET").filter(|v| !v.trim().is_empty()) {
            Some(v) => SlotZone::Fixed(
                parse_utc_offset(&v)
                    .with_context(|| format!("NEXUS_SLOT_UTC_OFFSET={v:?} is not an offset"))?,
            ),
            None => SlotZone::HostLocal,
        };

        let upstream = TtpSettings {
            base_url: get("NEXUS_UPSTREAM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            service_name: get("NEXUS_SERVICE_NAME").unwrap_or_else(|| "NEXUS".to_string()),
            location_limit: parse_or(&get, "NEXUS_LOCATION_LIMIT", 5)?,
            connect_timeout: Duration::from_secs(connect_secs),
            read_timeout: Duration::from_secs(read_secs),
            slot_zone,
        };

        let fetch_concurrency: usize = parse_or(&get, "NEXUS_FETCH_CONCURRENCY", 2)?;

        Ok(Self {
            delivery,
            upstream,
            pipeline: PipelineOptions {
                fetch_concurrency: fetch_concurrency.max(1),
            },
            cache_timeout: Duration::from_secs(connect_secs.max(read_secs)),
            metrics_textfile: get("NEXUS_METRICS_TEXTFILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}

/// `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(chrono::Utc.fix());
    }
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(anyhow!("offset must start with + or -")),
    };
    let (h, m) = rest
        .split_once(':')
        .ok_or_else(|| anyhow!("offset must look like +HH:MM"))?;
    let h: i32 = h.parse().context("offset hours")?;
    let m: i32 = m.parse().context("offset minutes")?;
    if h > 23 || m > 59 {
        return Err(anyhow!("offset out of range"));
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60)).ok_or_else(|| anyhow!("offset out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn live_requires_credentials() {
        let err = AppConfig::from_lookup(lookup(&[("REDIS_URL", "redis://localhost")]))
            .unwrap_err();
        assert!(err.to_string().contains("TWILIO_ACCOUNT_SID"));
    }

    #[test]
    fn dry_run_needs_nothing_and_defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("NEXUS_DRY_RUN", "1"),
            ("NEXUS_SLOT_UTC_OFFSET", "-04:00"),
        ]))
        .unwrap();
        assert!(matches!(cfg.delivery, Delivery::DryRun { .. }));
        assert_eq!(cfg.upstream.location_limit, 5);
        assert_eq!(cfg.upstream.service_name, "NEXUS");
        assert_eq!(cfg.upstream.connect_timeout, Duration::from_secs(10));
        assert_eq!(cfg.pipeline.fetch_concurrency, 2);
        assert_eq!(
            cfg.upstream.slot_zone,
            SlotZone::Fixed(FixedOffset::west_opt(4 * 3600).unwrap())
        );
        assert!(cfg.metrics_textfile.is_none());
    }

    #[test]
    fn bad_number_is_reported_by_name() {
        let err = AppConfig::from_lookup(lookup(&[
            ("NEXUS_DRY_RUN", "true"),
            ("NEXUS_LOCATION_LIMIT", "five"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("NEXUS_LOCATION_LIMIT"));
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("NEXUS_DRY_RUN", "1"),
            ("NEXUS_FETCH_CONCURRENCY", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.pipeline.fetch_concurrency, 1);
    }

    #[test]
    fn unset_offset_follows_host_zone_rules() {
        let cfg = AppConfig::from_lookup(lookup(&[("NEXUS_DRY_RUN", "1")])).unwrap();
        assert_eq!(cfg.upstream.slot_zone, SlotZone::HostLocal);
    }

    #[test]
    fn offsets_parse() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("0500").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }
}

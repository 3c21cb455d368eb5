// src/config/watchlist.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::watchlist::{WatchList, WatchedLocation};

pub const ENV_PATH: &str = "NEXUS_WATCHLIST_PATH";

/// Load the watch list from an explicit path. Supports TOML or JSON formats.
pub fn load_watchlist_from(path: &Path) -> Result<WatchList> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading watch list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_watchlist(&content, ext.as_str())
        .with_context(|| format!("parsing watch list {}", path.display()))
}

/// Load the watch list using env var + fallbacks:
/// 1) $NEXUS_WATCHLIST_PATH
/// 2) config/watchlist.toml
/// 3) config/watchlist.json
/// 4) the built-in border-crossing table
pub fn load_watchlist_default() -> Result<WatchList> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_watchlist_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/watchlist.toml");
    if toml_p.exists() {
        return load_watchlist_from(&toml_p);
    }
    let json_p = PathBuf::from("config/watchlist.json");
    if json_p.exists() {
        return load_watchlist_from(&json_p);
    }
    Ok(WatchList::builtin())
}

fn parse_watchlist(s: &str, hint_ext: &str) -> Result<WatchList> {
    let try_toml = hint_ext == "toml" || s.contains("[[locations]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return validate(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return validate(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return validate(v);
        }
    }
    Err(anyhow!("unsupported watch list format"))
}

fn parse_toml(s: &str) -> Result<Vec<WatchedLocation>> {
    #[derive(Deserialize)]
    struct TomlWl {
        locations: Vec<WatchedLocation>,
    }
    let v: TomlWl = toml::from_str(s)?;
    Ok(v.locations)
}

fn parse_json(s: &str) -> Result<Vec<WatchedLocation>> {
    let v: Vec<WatchedLocation> = serde_json::from_str(s)?;
    Ok(v)
}

fn validate(items: Vec<WatchedLocation>) -> Result<WatchList> {
    let mut out = Vec::with_capacity(items.len());
    for mut it in items {
        let label = it.label.trim();
        if label.is_empty() {
            return Err(anyhow!("location {} has a blank label", it.id));
        }
        it.label = label.to_string();
        out.push(it);
    }
    Ok(WatchList::new(out))
}

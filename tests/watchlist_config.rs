// tests/watchlist_config.rs
use nexus_slot_watch::config::watchlist::{load_watchlist_default, load_watchlist_from, ENV_PATH};
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("watchlist.toml");
    fs::write(
        &p_toml,
        r#"
[[locations]]
id = 5021
label = "Champlain, NY"

[[locations]]
id = 5025
label = "Ottawa airport"
"#,
    )
    .unwrap();
    let wl = load_watchlist_from(&p_toml).unwrap();
    assert_eq!(wl.ids(), vec![5021, 5025]);

    let p_json = dir.path().join("watchlist.json");
    fs::write(&p_json, r#"[{"id": 5160, "label": " International Falls, MN "}]"#).unwrap();
    let wj = load_watchlist_from(&p_json).unwrap();
    assert_eq!(wj.label_for(5160), Some("International Falls, MN"));
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("nope.toml");
    let err = load_watchlist_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_PATH);

    // 1) Nothing on disk → built-in table
    let wl = load_watchlist_default().unwrap();
    assert_eq!(wl.ids(), vec![5021, 5025, 5028, 5223]);

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("watchlist.toml"),
        "[[locations]]\nid = 5223\nlabel = \"Derby Line, VT\"\n",
    )
    .unwrap();
    let wt = load_watchlist_default().unwrap();
    assert_eq!(wt.ids(), vec![5223]);

    // 3) Env wins
    let p_env = tmp.path().join("override.json");
    fs::write(&p_env, r#"[{"id": 5160, "label": "International Falls, MN"}]"#).unwrap();
    env::set_var(ENV_PATH, p_env.display().to_string());
    let we = load_watchlist_default().unwrap();
    assert_eq!(we.ids(), vec![5160]);

    // 4) Env pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(load_watchlist_default().is_err());
    env::remove_var(ENV_PATH);

    env::set_current_dir(&old).unwrap();
}

//! On-disk persistence through `ConfigManager` and `FileStore`

use std::fs;

use tempfile::TempDir;
use vlessconn_core::{
    AppSettings, ConfigManager, KeyValueStore, PROFILES_KEY, Profile, ProfileStore, StoreError,
    Theme,
};

#[test]
fn profiles_survive_restart() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());

    let mut store = ProfileStore::new(manager.profile_storage());
    let home = Profile::manual("Home", "home.example.com", 443, "id-home").unwrap();
    let office = Profile::from_uri(
        "Office",
        "vless://id-office@[2001:db8::10]:8443?reality=1&sni=office.example.com#Office",
    )
    .unwrap();
    store.add(home.clone()).unwrap();
    store.add(office.clone()).unwrap();

    let mut restarted = ProfileStore::new(manager.profile_storage());
    restarted.load().unwrap();
    assert_eq!(restarted.profiles(), &[home, office]);
}

#[test]
fn blob_is_a_json_array_under_the_collection_key() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
    let mut store = ProfileStore::new(manager.profile_storage());
    store
        .add(Profile::manual("Home", "home.example.com", 443, "id-home").unwrap())
        .unwrap();

    let raw = fs::read_to_string(dir.path().join(format!("{PROFILES_KEY}.json"))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Home");
    assert_eq!(entries[0]["raw_uri"], "vless://id-home@home.example.com:443");
}

#[test]
fn corrupt_file_reports_load_failed() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());
    manager.profile_storage().set(PROFILES_KEY, "garbage").unwrap();

    let mut store = ProfileStore::new(manager.profile_storage());
    assert!(matches!(store.load(), Err(StoreError::LoadFailed(_))));
    assert!(store.is_empty());
}

#[test]
fn settings_and_profiles_share_the_directory() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_config_dir(dir.path().join("vlessconn"));

    let settings = AppSettings {
        kill_switch: true,
        theme: Theme::System,
        ..AppSettings::default()
    };
    manager.save_settings(&settings).unwrap();

    let mut store = ProfileStore::new(manager.profile_storage());
    store
        .add(Profile::manual("a", "a.example.com", 443, "a").unwrap())
        .unwrap();

    assert_eq!(manager.load_settings().unwrap(), settings);
    assert!(manager.settings_path().starts_with(manager.config_dir()));
    assert!(manager.config_dir().join("vpn_configs.json").exists());
}

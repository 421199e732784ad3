use lyceum_domain::config::{DatabaseConfig, PlatformConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let config = PlatformConfig::default();
    assert!(config.superadmins.is_empty());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "lyceum");
    assert_eq!(db.database, "courses");
    assert!(db.credentials.is_none());
}

#[test]
fn platform_config_deserializes() {
    let raw = json!({
        "superadmins": ["root", "dean"],
        "database": { "url": "ws://db:8000", "namespace": "n", "database": "d", "credentials": { "username": "admin" } }
    });

    let cfg: PlatformConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.superadmins, vec!["root".to_owned(), "dean".to_owned()]);
    assert_eq!(cfg.database.url, "ws://db:8000");
    let credentials = cfg.database.credentials.as_ref().expect("credentials");
    assert_eq!(credentials.username, "admin");
    assert_eq!(credentials.password, "root");
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: PlatformConfig = serde_json::from_value(json!({})).expect("config deserialize");
    assert!(cfg.superadmins.is_empty());
    assert_eq!(cfg.database.namespace, "lyceum");
}

#[test]
fn clones_share_until_mutated() {
    let original = PlatformConfig::with_superadmins(["root"]);
    let mut copy = original.clone();
    copy.superadmins.push("dean".to_owned());

    assert_eq!(original.superadmins, vec!["root".to_owned()]);
    assert_eq!(copy.superadmins.len(), 2);
}

use joyport::{
    BindableAction, Config, ConfigError, DeviceDatabase, GamePadManager, HatScheme,
    LeftStickScheme, MappingScheme, PhysicalKey, PortId, RightStickScheme,
};
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("joyport-{}-{name}", std::process::id()))
}

#[test]
fn manager_picks_up_user_database() {
    let db_path = scratch("devices.json");
    let mut db = DeviceDatabase::new();
    db.set_schemes(
        "1",
        "2",
        MappingScheme::new(LeftStickScheme::A0A1r, RightStickScheme::A2A5, HatScheme::B4B7),
    );
    db.save(&db_path).unwrap();

    let cfg_path = scratch("config.toml");
    let cfg = Config {
        database_path: Some(db_path.clone()),
        port1: Some(3),
        ..Config::default()
    };
    cfg.save(&cfg_path).unwrap();

    let loaded = Config::load(&cfg_path).unwrap();
    assert_eq!(loaded, cfg);

    let mut mgr = GamePadManager::from_config(&loaded).unwrap();
    let slot = mgr
        .device_arrived(joyport::DeviceMeta::new("1", "2", "loc"))
        .unwrap();
    assert_eq!(slot, 3);
    assert_eq!(mgr.slot_on(PortId::Port1), Some(3));
    assert_eq!(mgr.pad(slot).unwrap().scheme().hat, HatScheme::B4B7);
    // built-in entries survive the merge
    assert!(mgr.database().is_known("1356", "1476"));

    std::fs::remove_file(db_path).ok();
    std::fs::remove_file(cfg_path).ok();
}

#[test]
fn missing_files_are_reported_with_their_path() {
    let path = scratch("absent.toml");
    match Config::load(&path) {
        Err(ConfigError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected {other:?}"),
    }

    let cfg = Config {
        database_path: Some(scratch("absent.json")),
        ..Config::default()
    };
    assert!(matches!(
        GamePadManager::from_config(&cfg),
        Err(ConfigError::Database(_))
    ));
}

#[test]
fn configured_keymaps_drive_the_keysets() {
    let cfg = Config::from_toml_str(
        r#"
        [[keymaps.keyset2]]
        key = { key_code = 12 }
        action = "PRESS_FIRE"
        "#,
    )
    .unwrap();
    let mgr = GamePadManager::from_config(&cfg).unwrap();
    let keyset2 = &mgr.key_maps().keyset2;
    assert_eq!(keyset2.len(), 1);
    assert_eq!(
        keyset2.lookup(&PhysicalKey::new(12)),
        Some(BindableAction::PressFire)
    );
}

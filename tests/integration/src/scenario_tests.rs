//! End-to-end scenarios against real directories.
//!
//! Each test builds a store over one or more temporary directories with the
//! OS filesystem and the system clock, the way an application would.

use overlay_core::{ConfigStore, LoadEvent, StandardSuffixes, StoreOptions};
use overlay_fs::SearchPath;
use overlay_test_utils::TestConfigDir;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn store_over(dirs: &[&TestConfigDir], environment: Option<&str>, host: Option<&str>) -> ConfigStore {
    ConfigStore::builder()
        .search_path(SearchPath::new(dirs.iter().map(|d| d.root().to_path_buf())))
        .suffixes(StandardSuffixes::new(
            environment.map(str::to_string),
            host.map(str::to_string),
        ))
        .reload_delay(Duration::ZERO)
        .build()
        .unwrap()
}

#[derive(Debug, Deserialize, PartialEq)]
struct Database {
    host: String,
    port: u16,
    #[serde(default)]
    replicas: Vec<String>,
}

#[test]
fn full_suffix_chain_into_typed_struct() {
    let mut dir = TestConfigDir::new();
    dir.write("db.yml", "host: localhost\nport: 5432\nreplicas: [r1]\n");
    dir.write("db_config.yml", "port: 6432\n");
    dir.write("db_staging.yml", "host: staging.internal\n");
    dir.write("db_web1.yml", "replicas: [r2, r3]\n");

    let store = store_over(&[&dir], Some("staging"), Some("web1"));
    let db: Database = store.get_configuration("db").unwrap().deserialize().unwrap();
    assert_eq!(
        db,
        Database {
            host: "staging.internal".into(),
            port: 6432,
            replicas: vec!["r2".into(), "r3".into()],
        }
    );
}

#[test]
fn site_directory_overrides_are_layered_under_first_declared() {
    let mut primary = TestConfigDir::new();
    let mut site = TestConfigDir::new();
    primary.write("global.yml", "region: eu\n");
    site.write("global.yml", "region: us\nowner: ops\n");

    let store = store_over(&[&primary, &site], None, None);
    assert_eq!(store.root("region").unwrap().unwrap().as_str(), Some("eu"));
    assert_eq!(store.root("owner").unwrap().unwrap().as_str(), Some("ops"));
}

#[test]
fn edit_on_disk_notifies_and_reloads() {
    let mut dir = TestConfigDir::new();
    dir.write("app.yml", "workers: 2\n");
    let store = store_over(&[&dir], None, None);

    let changes = Arc::new(AtomicUsize::new(0));
    let c = changes.clone();
    store
        .on_load(&["app"], move |event| {
            if matches!(event, LoadEvent::Changed { name: "app" }) {
                c.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        })
        .unwrap();

    assert_eq!(store.lookup("app", ["workers"]).unwrap().unwrap().as_i64(), Some(2));
    dir.write("app.yml", "workers: 8\n");
    std::thread::sleep(Duration::from_millis(5));

    assert_eq!(store.lookup("app", ["workers"]).unwrap().unwrap().as_i64(), Some(8));
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

#[test]
fn disabled_reload_pins_snapshot_until_lifted() {
    let mut dir = TestConfigDir::new();
    dir.write("app.yml", "mode: a\n");
    let store = store_over(&[&dir], None, None);
    let before = store.get_configuration("app").unwrap();

    store
        .disable_reload(|| {
            dir.write("app.yml", "mode: b\n");
            std::thread::sleep(Duration::from_millis(5));
            let pinned = store.get_configuration("app").unwrap();
            assert!(pinned.ptr_eq(&before));
        })
        .unwrap();

    std::thread::sleep(Duration::from_millis(5));
    let after = store.get_configuration("app").unwrap();
    assert_eq!(after.get("mode").and_then(|v| v.as_str()), Some("b"));
}

#[test]
fn options_loaded_from_json() {
    let mut dir = TestConfigDir::new();
    dir.write("svc.json", r#"{"listen": {"port": 9000}}"#);

    let raw = serde_json::json!({
        "path": dir.root().display().to_string(),
        "extension": "json",
        "reload_delay_secs": 0,
    });
    let options: StoreOptions = serde_json::from_value(raw).unwrap();
    let store = options.build().unwrap();
    assert_eq!(
        store.lookup("svc", ["listen", "port"]).unwrap().unwrap().as_i64(),
        Some(9000)
    );
}

#[test]
fn templated_file_lists_its_siblings() {
    let mut dir = TestConfigDir::new();
    dir.write("svc.yml", "base: true\n");
    dir.write(
        "svc_local.yml",
        "# overlay_config: template\nsources:\n{% for f in config_files %}{% if f.exists %}  - {{ f.suffixed_name }}\n{% endif %}{% endfor %}",
    );

    let store = store_over(&[&dir], None, None);
    let snapshot = store.get_configuration("svc").unwrap();
    let sources: Vec<String> = snapshot
        .lookup(["sources"])
        .and_then(|v| v.as_sequence())
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    assert_eq!(sources, vec!["svc".to_string(), "svc_local".to_string()]);
}

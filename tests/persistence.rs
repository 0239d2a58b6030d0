//! Cache round-trips and config-driven compilation.

mod common;

use std::fs;
use std::path::PathBuf;

use common::{demo_routes, observable_outcomes};
use pathmark::{
    load_config, load_table, match_request, save_table, Method, RoutingTable,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pathmark-it-{}-{name}", std::process::id()))
}

#[test]
fn saved_table_matches_identically_after_reload() {
    let table = RoutingTable::compile(&demo_routes()).unwrap();

    let path = temp_path("table.json");
    save_table(&table, &path).unwrap();
    let loaded = load_table(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(table.data(), loaded.data());
    assert_eq!(observable_outcomes(&table), observable_outcomes(&loaded));
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = temp_path("nested");
    let path = dir.join("cache").join("table.json");

    let table = RoutingTable::compile(&demo_routes()).unwrap();
    save_table(&table, &path).unwrap();
    assert!(path.is_file());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn config_file_end_to_end() {
    let config_path = temp_path("router.toml");
    let cache_path = temp_path("router.cache.json");
    fs::write(
        &config_path,
        format!(
            r#"
            [router]
            cache_path = "{}"

            [[routes]]
            methods = ["GET"]
            path = "/articles/{{slug:slug}}"
            action = "articles.show"

            [[routes]]
            path = "/health"
            action = "health"
            "#,
            cache_path.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let table =
        RoutingTable::compile_with(&config.to_routes(), &config.compile_options()).unwrap();

    let hit = match_request(&table, "/articles/rust-routing", Method::Get).unwrap();
    assert_eq!(hit.action.as_str(), "articles.show");
    assert_eq!(hit.variables["slug"], "rust-routing");

    // The any-method literal answers every method without the engine.
    let hit = match_request(&table, "/health", Method::Delete).unwrap();
    assert_eq!(hit.action.as_str(), "health");

    // Persist through the configured cache path and reload.
    save_table(&table, &cache_path).unwrap();
    let reloaded = load_table(&cache_path).unwrap();
    assert_eq!(observable_outcomes(&table), observable_outcomes(&reloaded));

    fs::remove_file(&config_path).unwrap();
    fs::remove_file(&cache_path).unwrap();
}

#[test]
fn invalid_config_is_rejected_with_all_errors() {
    let config_path = temp_path("bad.toml");
    fs::write(
        &config_path,
        r#"
        [[routes]]
        path = "no-slash"
        action = ""
        "#,
    )
    .unwrap();

    let err = load_config(&config_path).unwrap_err();
    fs::remove_file(&config_path).unwrap();

    let message = err.to_string();
    assert!(message.contains("must start with '/'"));
    assert!(message.contains("action is empty"));
}

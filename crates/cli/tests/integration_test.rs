use arbscan_core::ConfigLoader;

#[test]
fn test_config_loads_with_defaults_when_file_missing() {
    let config = ConfigLoader::load_from("tests/data/missing.toml").expect("defaults must load");

    assert!((config.scrape.interval_seconds - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.scrape.providers_enabled.len(), 5);
    assert_eq!(config.retention.odds_history_days, 7);
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = std::env::temp_dir().join("arbscan-cli-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("arbscan.toml");
    std::fs::write(
        &path,
        r#"
[scrape]
interval_seconds = 5.0
providers_enabled = ["maxbet"]

[arbitrage]
min_profit_percentage = "2.5"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from(path.to_str().unwrap()).expect("file must parse");

    assert!((config.scrape.interval_seconds - 5.0).abs() < f64::EPSILON);
    assert_eq!(config.scrape.providers_enabled, vec!["maxbet".to_string()]);
    assert_eq!(
        config.arbitrage.min_profit_percentage,
        rust_decimal::Decimal::new(25, 1)
    );
    // Untouched sections keep their defaults.
    assert_eq!(config.database.max_connections, 50);
}

use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.plugin.name, "mos-file-browser");
    assert_eq!(config.loader.debounce_ms, 300);
    assert_eq!(config.loader.settle_ms, 500);
    assert_eq!(config.loader.path_validation, PathValidation::Lenient);
    assert!(!config.loader.ignore_own_mutations);
}

#[test]
fn test_plugin_config_default() {
    let plugin = PluginConfig::default();
    assert_eq!(plugin.display_name, "MOS FileBrowser");
    assert_eq!(plugin.description, "File browser for MOS");
    assert_eq!(plugin.icon, "mdi-folder-open");
    assert_eq!(plugin.author, "RiDDiX");
    assert!(plugin.homepage.is_empty());
    assert!(plugin.version.is_none());
    assert_eq!(plugin.remote_entry, "remoteEntry.js");
    assert_eq!(plugin.exposed_module, "./Plugin");
}

#[test]
fn test_loader_config_default() {
    let loader = LoaderConfig::default();
    assert_eq!(loader.marker_class, "mos-filebrowser-icon");
    assert_eq!(loader.event_name, "mos-open-file-browser");
    assert_eq!(loader.storage_key, "mos-file-browser-path");
    assert_eq!(loader.default_title, "Browse files");
}

#[test]
fn test_disk_rules_priority_order() {
    let disk = RowRulesConfig::disk_defaults();
    assert_eq!(
        disk.path_attributes,
        vec!["data-disk-path", "data-mount-point", "data-path"]
    );
    assert!(disk.selectors.contains(&".v-list-item".to_string()));
    assert_eq!(disk.text_pattern.as_deref(), Some(DEFAULT_TEXT_PATTERN));
}

#[test]
fn test_every_category_has_text_pattern() {
    let rows = RowsConfig::default();
    for category in RowCategory::ALL {
        assert_eq!(
            rows.get(category).text_pattern.as_deref(),
            Some(r"/mnt/\S+"),
            "category {} should search row text",
            category
        );
    }
}

#[test]
fn test_row_category_display() {
    assert_eq!(RowCategory::Disk.to_string(), "disk");
    assert_eq!(RowCategory::Share.to_string(), "share");
    assert_eq!(RowCategory::Pool.as_str(), "pool");
}

#[test]
fn test_partial_rows_table_replaces_category() {
    let content = r#"
        [rows.share]
        selectors = [".smb-share"]
        path_attributes = ["data-smb-path"]
    "#;
    let config: Config = toml::from_str(content).unwrap();

    assert_eq!(config.rows.share.selectors, vec![".smb-share"]);
    assert!(config.rows.share.path_selectors.is_empty());
    assert!(config.rows.share.text_pattern.is_none());
    // Untouched categories keep their defaults.
    assert_eq!(config.rows.disk, RowRulesConfig::disk_defaults());
    assert_eq!(config.rows.pool, RowRulesConfig::pool_defaults());
}

#[test]
fn test_path_validation_deserialize() {
    let content = r#"
        [loader]
        path_validation = "strict"
        ignore_own_mutations = true
    "#;
    let config: Config = toml::from_str(content).unwrap();
    assert_eq!(config.loader.path_validation, PathValidation::Strict);
    assert!(config.loader.ignore_own_mutations);
    assert_eq!(config.loader.debounce_ms, 300);
}

#[test]
fn test_config_from_json() {
    let config: Config =
        serde_json::from_str(r#"{"loader": {"debounce_ms": 150}, "plugin": {"name": "fb"}}"#)
            .unwrap();
    assert_eq!(config.loader.debounce_ms, 150);
    assert_eq!(config.plugin.name, "fb");
    assert_eq!(config.plugin.icon, "mdi-folder-open");
}

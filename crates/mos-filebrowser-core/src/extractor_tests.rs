use super::*;
use crate::dom::Document;
use mos_filebrowser_config::RowsConfig;

fn rules(category: RowCategory) -> CategoryRules {
    CategoryRules::compile(category, RowsConfig::default().get(category)).unwrap()
}

fn first_row(doc: &Document, rules: &CategoryRules) -> crate::dom::NodeId {
    doc.query_all(rules.row_selector().unwrap()).unwrap()[0]
}

fn extract(json: &str, category: RowCategory) -> Option<ExtractedPath> {
    let doc = Document::from_json(json).unwrap();
    let rules = rules(category);
    let row = first_row(&doc, &rules);
    PathExtractor::default().extract_with_source(&doc, &row, &rules)
}

#[test]
fn test_data_attribute_priority() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "data-path": "/mnt/generic", "data-mount-point": "/mnt/mount", "data-disk-path": "/mnt/disk1" } }"#,
        RowCategory::Disk,
    )
    .unwrap();
    assert_eq!(found.path, "/mnt/disk1");
    assert_eq!(found.source, PathSource::DataAttribute("data-disk-path".to_string()));
}

#[test]
fn test_empty_attribute_falls_through() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "data-disk-path": "", "data-mount-point": "/mnt/cache" } }"#,
        RowCategory::Disk,
    )
    .unwrap();
    assert_eq!(found.path, "/mnt/cache");
}

#[test]
fn test_descendant_text_is_trimmed() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "class": "pool-row" }, "children": [
             { "tag": "span", "attrs": { "class": "pool-path" }, "children": [ { "text": "\n  /mnt/pool1  " } ] } ] }"#,
        RowCategory::Pool,
    )
    .unwrap();
    assert_eq!(found.path, "/mnt/pool1");
    assert_eq!(found.source, PathSource::Descendant);
}

#[test]
fn test_substring_class_selectors() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "class": "disk-row" }, "children": [
             { "tag": "em", "attrs": { "class": "disk-mountpoint-label" }, "children": [ { "text": "/mnt/disk3" } ] } ] }"#,
        RowCategory::Disk,
    )
    .unwrap();
    assert_eq!(found.path, "/mnt/disk3");
    assert_eq!(found.source, PathSource::Descendant);
}

#[test]
fn test_text_pattern_first_match() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "class": "share-row" }, "children": [
             { "text": "Share: /mnt/user/media (read-only), backup /mnt/user/backup" } ] }"#,
        RowCategory::Share,
    )
    .unwrap();
    assert_eq!(found.path, "/mnt/user/media");
    assert_eq!(found.source, PathSource::TextContent);
}

#[test]
fn test_empty_descendant_falls_back_to_text() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "class": "disk-row" }, "children": [
             { "tag": "span", "attrs": { "class": "path" }, "children": [ { "text": "   " } ] },
             { "text": "mounted at /mnt/disk4" } ] }"#,
        RowCategory::Disk,
    )
    .unwrap();
    assert_eq!(found.path, "/mnt/disk4");
}

#[test]
fn test_rejected_candidate_stops_rules() {
    // The descendant wins with "N/A", so the /mnt text is never consulted.
    let found = extract(
        r#"{ "tag": "div", "attrs": { "class": "disk-row" }, "children": [
             { "tag": "span", "attrs": { "class": "path" }, "children": [ { "text": "N/A" } ] },
             { "text": " /mnt/disk5" } ] }"#,
        RowCategory::Disk,
    );
    assert!(found.is_none());
}

#[test]
fn test_no_candidate() {
    let found = extract(
        r#"{ "tag": "div", "attrs": { "class": "pool-row" }, "children": [ { "text": "Pool offline" } ] }"#,
        RowCategory::Pool,
    );
    assert!(found.is_none());
}

#[test]
fn test_text_rule_disabled() {
    let doc = Document::from_json(
        r#"{ "tag": "div", "attrs": { "class": "share-row" }, "children": [ { "text": "/mnt/user/x" } ] }"#,
    )
    .unwrap();
    let mut config = RowsConfig::default().share;
    config.text_pattern = None;
    let rules = CategoryRules::compile(RowCategory::Share, &config).unwrap();
    let row = first_row(&doc, &rules);
    assert!(PathExtractor::default().extract(&doc, &row, &rules).is_none());
}

#[test]
fn test_lenient_validation() {
    let extractor = PathExtractor::new(PathValidation::Lenient);
    assert!(extractor.accepts("/"));
    assert!(extractor.accepts("/mnt/<b>x</b>"));
    assert!(extractor.accepts("/mnt/../etc"));
    assert!(!extractor.accepts(""));
    assert!(!extractor.accepts("mnt/disk1"));
    assert!(!extractor.accepts(" /mnt/disk1"));
}

#[test]
fn test_strict_validation() {
    let extractor = PathExtractor::new(PathValidation::Strict);
    assert!(extractor.accepts("/mnt/disk1"));
    assert!(extractor.accepts("/mnt/user/my.share-1"));
    assert!(!extractor.accepts("/"));
    assert!(!extractor.accepts("/mnt/my share"));
    assert!(!extractor.accepts("/mnt/<script>"));
    assert!(!extractor.accepts("/mnt/\"x\""));
    assert!(!extractor.accepts("/mnt/../etc"));
    assert!(!extractor.accepts("/mnt/a\u{7}"));
}

#[test]
fn test_invalid_pattern() {
    let config = RowRulesConfig {
        text_pattern: Some("(".to_string()),
        ..RowRulesConfig::default()
    };
    let err = CategoryRules::compile(RowCategory::Pool, &config).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidPattern {
            category: RowCategory::Pool,
            ..
        }
    ));
}

#[test]
fn test_compile_all_and_selector_groups() {
    let all = CategoryRules::compile_all(&RowsConfig::default()).unwrap();
    let categories: Vec<_> = all.iter().map(|r| r.category()).collect();
    assert_eq!(
        categories,
        vec![RowCategory::Disk, RowCategory::Share, RowCategory::Pool]
    );
    assert_eq!(
        all[1].row_selector(),
        Some("[data-share-path], .share-row")
    );
    assert_eq!(all[2].path_attributes(), ["data-pool-path", "data-path"]);

    let empty = CategoryRules::compile(RowCategory::Disk, &RowRulesConfig::default()).unwrap();
    assert!(empty.row_selector().is_none());
    assert!(empty.label_selector().is_none());
    assert!(empty.text_pattern().is_none());
}

#[test]
fn test_path_source_display() {
    assert_eq!(
        PathSource::DataAttribute("data-path".to_string()).to_string(),
        "attribute:data-path"
    );
    assert_eq!(PathSource::Descendant.to_string(), "descendant");
    assert_eq!(PathSource::TextContent.to_string(), "text");
}

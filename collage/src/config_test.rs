#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_env() {
    let config = CollageConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, CollageConfig::default());
    assert_eq!(config.canvas, Size::new(600.0, 800.0));
    assert_eq!(config.history_depth, 30);
    assert_eq!(config.grid_size, 20.0);
    assert_eq!(config.export_scale, 2.0);
    assert_eq!(config.base_item_width, 180.0);
    assert_eq!(config.fit_margin, 40.0);
}

#[test]
fn overrides_are_applied() {
    let config = CollageConfig::from_lookup(lookup(&[
        ("COLLAGE_CANVAS_WIDTH", "1080"),
        ("COLLAGE_CANVAS_HEIGHT", " 1350 "),
        ("COLLAGE_HISTORY_DEPTH", "50"),
        ("COLLAGE_GRID_SIZE", "10"),
        ("COLLAGE_EXPORT_SCALE", "1"),
        ("COLLAGE_BASE_ITEM_WIDTH", "240"),
        ("COLLAGE_FIT_MARGIN", "0"),
    ]))
    .unwrap();
    assert_eq!(config.canvas, Size::new(1080.0, 1350.0));
    assert_eq!(config.history_depth, 50);
    assert_eq!(config.grid_size, 10.0);
    assert_eq!(config.export_scale, 1.0);
    assert_eq!(config.base_item_width, 240.0);
    assert_eq!(config.fit_margin, 0.0);
}

#[test]
fn unparseable_value_is_rejected() {
    let err = CollageConfig::from_lookup(lookup(&[("COLLAGE_CANVAS_WIDTH", "wide")])).unwrap_err();
    assert_eq!(err, ConfigError::Parse { key: "COLLAGE_CANVAS_WIDTH", value: "wide".into() });
}

#[test]
fn non_finite_value_is_rejected() {
    let err = CollageConfig::from_lookup(lookup(&[("COLLAGE_EXPORT_SCALE", "inf")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { key: "COLLAGE_EXPORT_SCALE", .. }));
}

#[test]
fn zero_size_is_out_of_range() {
    let err = CollageConfig::from_lookup(lookup(&[("COLLAGE_CANVAS_HEIGHT", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { key: "COLLAGE_CANVAS_HEIGHT", .. }));
}

#[test]
fn zero_history_depth_is_out_of_range() {
    let err = CollageConfig::from_lookup(lookup(&[("COLLAGE_HISTORY_DEPTH", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { key: "COLLAGE_HISTORY_DEPTH", .. }));
    let err = CollageConfig::from_lookup(lookup(&[("COLLAGE_HISTORY_DEPTH", "-3")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { key: "COLLAGE_HISTORY_DEPTH", .. }));
}

#[test]
fn negative_margin_is_out_of_range() {
    let err = CollageConfig::from_lookup(lookup(&[("COLLAGE_FIT_MARGIN", "-1")])).unwrap_err();
    assert_eq!(err.to_string(), "COLLAGE_FIT_MARGIN must be non-negative, got -1");
}

use bsp_atlas_core::config::AtlasConfig;
use bsp_atlas_core::error::AtlasError;

#[test]
fn defaults_are_valid() {
    let cfg = AtlasConfig::default();
    assert_eq!((cfg.width, cfg.height, cfg.trials), (1024, 1024, 1000));
    assert!(cfg.validate().is_ok());
}

#[test]
fn one_pixel_dimension_is_rejected() {
    for (w, h) in [(0, 64), (64, 1), (1, 1)] {
        let cfg = AtlasConfig::builder().with_dimensions(w, h).build();
        match cfg.validate() {
            Err(AtlasError::InvalidDimensions { width, height }) => {
                assert_eq!((width, height), (w, h));
            }
            other => panic!("expected InvalidDimensions, got {other:?}"),
        }
    }
    assert!(AtlasConfig::builder().with_dimensions(2, 2).build().validate().is_ok());
}

#[test]
fn zero_trials_is_rejected() {
    let cfg = AtlasConfig::builder().trials(0).build();
    assert!(matches!(cfg.validate(), Err(AtlasError::InvalidConfig(_))));
}

#[test]
fn missing_fields_use_defaults() {
    let cfg: AtlasConfig = serde_json::from_str(r#"{"width": 256, "height": 128}"#).expect("parse");
    assert_eq!(cfg.trials, 1000);
    assert_eq!(cfg.strip, 0);
    assert!(!cfg.draw_padding);
    assert!(!cfg.parallel);
    assert_eq!(cfg.time_budget_ms, None);
}

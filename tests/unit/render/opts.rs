use super::*;

#[test]
fn defaults_are_sane() {
    let o = RenderOpts::default();
    assert!(!o.hq_pen);
    assert_eq!(o.pen_scale(), 1.0);
    assert_eq!(o.max_texture_dimension, 2048);
    assert!(o.validate().is_ok());
    assert_eq!(o.clone().with_hq_pen(true).pen_scale(), 2.0);
}

#[test]
fn json_fills_missing_fields() {
    let o = RenderOpts::from_json(r#"{ "hq_pen": true, "clear_rgba": [255, 255, 255, 255] }"#)
        .unwrap();
    assert!(o.hq_pen);
    assert_eq!(o.clear_rgba, Some([255, 255, 255, 255]));
    assert_eq!(o.hq_pen_scale, 2.0);
}

#[test]
fn json_rejects_unknown_and_invalid() {
    assert!(RenderOpts::from_json(r#"{ "hq": true }"#).is_err());
    assert!(RenderOpts::from_json(r#"{ "hq_pen_scale": 0.5 }"#).is_err());
    assert!(RenderOpts::from_json("not json").is_err());
}

#[test]
fn env_overrides_apply() {
    let o = RenderOpts::default()
        .apply_env_with(|k| match k {
            ENV_HQ_PEN => Some("on".to_owned()),
            ENV_MAX_TEXTURE_DIM => Some(" 1024 ".to_owned()),
            _ => None,
        })
        .unwrap();
    assert!(o.hq_pen);
    assert_eq!(o.max_texture_dimension, 1024);

    let bad = RenderOpts::default().apply_env_with(|k| {
        (k == ENV_MAX_TEXTURE_DIM).then(|| "huge".to_owned())
    });
    assert!(matches!(bad, Err(RenderError::Validation(_))));
}

#[test]
fn software_opts_follow() {
    let g = RenderOpts::default()
        .with_readback_bottom_up(true)
        .with_antialiasing(false)
        .software_gpu_opts();
    assert!(g.readback_bottom_up);
    assert!(!g.antialiasing);
}

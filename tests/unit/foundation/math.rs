use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
}

#[test]
fn wrap_clamp_is_modulo_over_range() {
    assert_eq!(wrap_clamp(1.0, 0.0, 1.0), 0.0);
    assert_eq!(wrap_clamp(0.0, 0.0, 1.0), 0.0);
    assert!((wrap_clamp(-0.25, 0.0, 1.0) - 0.75).abs() < 1e-12);
    assert!((wrap_clamp(2.5, 0.0, 1.0) - 0.5).abs() < 1e-12);
}

#[test]
fn wrap_clamp_inclusive_matches_scratch() {
    assert_eq!(wrap_clamp_inclusive(100.0, 0.0, 100.0), 100.0);
    assert_eq!(wrap_clamp_inclusive(101.0, 0.0, 100.0), 0.0);
    assert_eq!(wrap_clamp_inclusive(-1.0, 0.0, 100.0), 100.0);
}

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(premul_over_px([1, 2, 3, 255], [9, 8, 7, 255]), [9, 8, 7, 255]);
    assert_eq!(premul_over_px([1, 2, 3, 4], [0, 0, 0, 0]), [1, 2, 3, 4]);

    let mut dst = vec![0, 0, 0, 0, 10, 10, 10, 255];
    premul_over_in_place(&mut dst, &[100, 0, 0, 100, 0, 0, 0, 0]);
    assert_eq!(dst, vec![100, 0, 0, 100, 10, 10, 10, 255]);
}

#[test]
fn fract_matches_glsl() {
    assert_eq!(fract(1.25), 0.25);
    assert_eq!(fract(-0.25), 0.75);
}

use super::*;

#[test]
fn premul_roundtrip_keeps_opaque_colors() {
    let c = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
    assert_eq!(c, Rgba8Premul::opaque(10, 20, 30));
    assert_eq!(c.to_straight_rgba(), [10, 20, 30, 255]);
}

#[test]
fn premul_half_alpha_scales_channels() {
    let c = Rgba8Premul::from_straight_rgba(200, 100, 0, 128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, ((200u16 * 128 + 127) / 255) as u8);
    assert_eq!(Rgba8Premul::transparent().to_straight_rgba(), [0, 0, 0, 0]);
}

#[test]
fn hull_points_sort_row_major() {
    let mut pts = vec![
        HullPoint::new(3, 1),
        HullPoint::new(1, 2),
        HullPoint::new(1, 1),
    ];
    pts.sort_by(HullPoint::cmp_row_major);
    assert_eq!(
        pts,
        vec![
            HullPoint::new(1, 1),
            HullPoint::new(3, 1),
            HullPoint::new(1, 2)
        ]
    );
}

#[test]
fn scratch_rect_intersection_and_union() {
    let a = ScratchRect::new(-10.0, 10.0, 10.0, -10.0);
    let b = ScratchRect::new(5.0, 20.0, 30.0, 0.0);
    assert!(a.intersects(&b));
    assert_eq!(a.intersected(&b), ScratchRect::new(5.0, 10.0, 10.0, 0.0));
    assert_eq!(a.united(&b), ScratchRect::new(-10.0, 20.0, 30.0, -10.0));

    let far = ScratchRect::new(100.0, 110.0, 120.0, 100.0);
    assert!(!a.intersects(&far));
    assert!(a.intersected(&far).is_empty());
    assert_eq!(ScratchRect::default().united(&a), a);
}

#[test]
fn scratch_rect_from_points_and_snap() {
    let r = ScratchRect::from_points([Point::new(-1.5, 2.2), Point::new(3.1, -0.4)]);
    assert_eq!(r, ScratchRect::new(-1.5, 2.2, 3.1, -0.4));
    assert_eq!(r.snap_to_int(), ScratchRect::new(-2.0, 3.0, 4.0, -1.0));
    assert!(ScratchRect::from_points([]).is_empty());
}

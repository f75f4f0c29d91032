use super::*;
use crate::effects::effect::Effect;
use crate::gpu::software::{SoftwareGpu, SoftwareGpuOpts};

fn square_fixture() -> Vec<u8> {
    let mut data = vec![0u8; 6 * 6 * 4];
    for y in 1..=3 {
        for x in 1..=3 {
            let i = (y * 6 + x) * 4;
            data[i..i + 4].copy_from_slice(&[255, 0, 0, 255]);
        }
    }
    data
}

#[test]
fn square_hull_is_its_four_corners() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(6, 6, Some(&square_fixture())).unwrap();
    let mut cpu = CpuTextureManager::new();

    let hull = cpu.texture_convex_hull_points(
        &mut gpu,
        tex,
        tex.size(),
        EffectMask::EMPTY,
        &GraphicEffects::new(),
    );
    assert_eq!(
        hull,
        vec![
            HullPoint::new(1, 1),
            HullPoint::new(1, 3),
            HullPoint::new(3, 3),
            HullPoint::new(3, 1),
        ]
    );
}

#[test]
fn bottom_up_backends_give_the_same_hull() {
    let mut gpu = SoftwareGpu::new(SoftwareGpuOpts::default().with_readback_bottom_up(true));
    let mut data = vec![0u8; 4 * 4 * 4];
    // single opaque pixel at (2, 0)
    data[(2) * 4 + 3] = 255;
    let tex = gpu.create_texture(4, 4, Some(&data)).unwrap();
    let mut cpu = CpuTextureManager::new();
    let hull = cpu.texture_convex_hull_points(
        &mut gpu,
        tex,
        tex.size(),
        EffectMask::EMPTY,
        &GraphicEffects::new(),
    );
    assert_eq!(hull, vec![HullPoint::new(2, 0), HullPoint::new(2, 0)]);
}

#[test]
fn transparent_texture_has_no_hull() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(5, 5, None).unwrap();
    let mut cpu = CpuTextureManager::new();
    let hull = cpu.texture_convex_hull_points(
        &mut gpu,
        tex,
        tex.size(),
        EffectMask::EMPTY,
        &GraphicEffects::new(),
    );
    assert!(hull.is_empty());
}

#[test]
fn triangle_left_chain_drops_concave_points() {
    // Rows widen then narrow: left edge x = 2,1,0,1,2.
    let lefts = [2, 1, 0, 1, 2];
    let hull = hull_points(5, 5, |x, y| x >= lefts[y as usize] && x <= 4);
    assert_eq!(hull.first(), Some(&HullPoint::new(2, 0)));
    assert!(hull.contains(&HullPoint::new(0, 2)));
    assert!(!hull.is_empty());
}

#[test]
fn invalid_texture_yields_nothing() {
    let mut gpu = SoftwareGpu::default();
    let mut cpu = CpuTextureManager::new();
    assert!(cpu.texture_data(&mut gpu, Texture::default()).is_none());
    let deleted = gpu.create_texture(2, 2, None).unwrap();
    gpu.delete_texture(deleted);
    assert!(cpu.texture_data(&mut gpu, deleted).is_none());
    assert!(
        cpu.texture_convex_hull_points(
            &mut gpu,
            deleted,
            deleted.size(),
            EffectMask::EMPTY,
            &GraphicEffects::new()
        )
        .is_empty()
    );
}

#[test]
fn data_is_cached_until_removed() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(1, 1, Some(&[1, 2, 3, 4])).unwrap();
    let mut cpu = CpuTextureManager::new();

    assert_eq!(cpu.texture_data(&mut gpu, tex), Some(&[1u8, 2, 3, 4][..]));
    gpu.upload_texture(tex, &[9, 9, 9, 9]).unwrap();
    assert_eq!(cpu.texture_data(&mut gpu, tex), Some(&[1u8, 2, 3, 4][..]));
    assert_eq!(gpu.stats().readbacks, 1);

    cpu.remove_texture(tex);
    assert!(!cpu.is_cached(tex));
    assert_eq!(cpu.texture_data(&mut gpu, tex), Some(&[9u8, 9, 9, 9][..]));
    assert_eq!(gpu.stats().readbacks, 2);
}

#[test]
fn point_color_and_containment() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(6, 6, Some(&square_fixture())).unwrap();
    let mut cpu = CpuTextureManager::new();
    let none = GraphicEffects::new();

    assert_eq!(
        cpu.point_color(&mut gpu, tex, tex.size(), 2, 2, EffectMask::EMPTY, &none),
        Rgba8Premul::opaque(255, 0, 0)
    );
    assert_eq!(
        cpu.point_color(&mut gpu, tex, tex.size(), 0, 0, EffectMask::EMPTY, &none),
        Rgba8Premul::transparent()
    );
    assert_eq!(
        cpu.point_color(&mut gpu, tex, tex.size(), -1, 7, EffectMask::EMPTY, &none),
        Rgba8Premul::transparent()
    );

    let size = tex.size();
    assert!(cpu.texture_contains_point(&mut gpu, tex, size, Point::new(2.6, 1.4), EffectMask::EMPTY, &none));
    assert!(!cpu.texture_contains_point(&mut gpu, tex, size, Point::new(0.4, 0.4), EffectMask::EMPTY, &none));
}

#[test]
fn point_color_applies_color_effects() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(6, 6, Some(&square_fixture())).unwrap();
    let mut cpu = CpuTextureManager::new();
    let fx = GraphicEffects::new().with(Effect::Ghost, 100.0);
    assert_eq!(
        cpu.point_color(&mut gpu, tex, tex.size(), 2, 2, fx.mask(), &fx),
        Rgba8Premul::transparent()
    );
}

#[test]
fn shape_effects_bypass_the_hull_cache() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(6, 6, Some(&square_fixture())).unwrap();
    let mut cpu = CpuTextureManager::new();

    let plain = cpu.texture_convex_hull_points(
        &mut gpu,
        tex,
        tex.size(),
        EffectMask::EMPTY,
        &GraphicEffects::new(),
    );
    // Mosaic x2 tiles the square into every quadrant: the silhouette grows.
    let fx = GraphicEffects::new().with(Effect::Mosaic, 10.0);
    let tiled = cpu.texture_convex_hull_points(&mut gpu, tex, tex.size(), fx.mask(), &fx);
    assert_ne!(plain, tiled);
    assert!(tiled.iter().any(|p| p.x >= 4));

    // The cached effect-free hull is untouched.
    let again = cpu.texture_convex_hull_points(
        &mut gpu,
        tex,
        tex.size(),
        EffectMask::EMPTY,
        &GraphicEffects::new(),
    );
    assert_eq!(plain, again);
}

#[test]
fn colour_only_effects_reuse_the_cached_hull() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(6, 6, Some(&square_fixture())).unwrap();
    let mut cpu = CpuTextureManager::new();
    let fx = GraphicEffects::new().with(Effect::Color, 40.0);
    let a = cpu.texture_convex_hull_points(&mut gpu, tex, tex.size(), fx.mask(), &fx);
    let b = cpu.texture_convex_hull_points(
        &mut gpu,
        tex,
        tex.size(),
        EffectMask::EMPTY,
        &GraphicEffects::new(),
    );
    assert_eq!(a, b);
    assert_eq!(a.len(), 4);
}

#[test]
fn lookups_use_the_read_back_dimensions() {
    let mut gpu = SoftwareGpu::default();
    let tex = gpu.create_texture(6, 6, Some(&square_fixture())).unwrap();
    // Same texture, metadata that disagrees with what the backend hands back.
    let stale = Texture::new(tex.handle(), 3, 3);
    let mut cpu = CpuTextureManager::new();
    let none = GraphicEffects::new();

    assert_eq!(
        cpu.point_color(&mut gpu, stale, stale.size(), 3, 1, EffectMask::EMPTY, &none),
        Rgba8Premul::opaque(255, 0, 0)
    );
    assert_eq!(
        cpu.point_color(&mut gpu, stale, stale.size(), 4, 4, EffectMask::EMPTY, &none),
        Rgba8Premul::transparent()
    );
    assert!(cpu.texture_contains_point(
        &mut gpu,
        stale,
        stale.size(),
        Point::new(3.0, 3.0),
        EffectMask::EMPTY,
        &none
    ));
    assert!(!cpu.texture_contains_point(
        &mut gpu,
        stale,
        stale.size(),
        Point::new(5.0, 0.0),
        EffectMask::EMPTY,
        &none
    ));
}

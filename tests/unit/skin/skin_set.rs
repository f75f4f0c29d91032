use std::io::Cursor;
use std::sync::Arc;

use super::*;
use crate::gpu::software::SoftwareGpu;

pub(crate) fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn bitmap_skin_ignores_scale() {
    let mut gpu = SoftwareGpu::default();
    let mut skin = BitmapSkin::new(&mut gpu, &png_bytes(3, 2, [0, 0, 255, 255]), 1.0).unwrap();
    let a = skin.texture(&mut gpu, 0.1).unwrap();
    let b = skin.texture(&mut gpu, 8.0).unwrap();
    assert_eq!(a, b);
    assert_eq!(skin.size(), Size::new(3.0, 2.0));
    assert_eq!(skin.texture_scale(a), 1.0);
    skin.release(&mut gpu);
    assert_eq!(gpu.stats().live_textures, 0);
}

#[test]
fn bitmap_resolution_shrinks_the_logical_size() {
    let mut gpu = SoftwareGpu::default();
    let mut set = SkinSet::new();
    let hd = Costume::new("hd", CostumeFormat::Bitmap, png_bytes(8, 4, [0, 0, 255, 255]))
        .with_bitmap_resolution(2.0);
    let skin = set.get_or_create(&mut gpu, &hd).unwrap();
    assert_eq!(skin.size(), Size::new(4.0, 2.0));
    let texture = skin.texture(&mut gpu, 1.0).unwrap();
    assert_eq!((texture.width(), texture.height()), (8, 4));
    set.release(&mut gpu);
}

#[test]
fn skins_are_created_once_per_costume() {
    let mut gpu = SoftwareGpu::default();
    let mut set = SkinSet::new();
    let cat = Costume::new("cat", CostumeFormat::Bitmap, Arc::new(png_bytes(2, 2, [1, 2, 3, 255])));
    let svg = Costume::new(
        "box",
        CostumeFormat::Svg,
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><rect width="8" height="8"/></svg>"#.to_vec(),
    );

    set.get_or_create(&mut gpu, &cat).unwrap();
    set.get_or_create(&mut gpu, &cat).unwrap();
    let size = set.get_or_create(&mut gpu, &svg).unwrap().size();
    assert_eq!(size, Size::new(8.0, 8.0));
    assert_eq!(set.len(), 2);
    assert_eq!(gpu.stats().textures_created, 1);

    set.get_mut("box").unwrap().texture(&mut gpu, 1.0).unwrap();
    assert_eq!(gpu.stats().live_textures, 2);
    set.release(&mut gpu);
    assert!(set.is_empty());
    assert_eq!(gpu.stats().live_textures, 0);
}

#[test]
fn undecodable_costume_is_an_error() {
    let mut gpu = SoftwareGpu::default();
    let mut set = SkinSet::new();
    let bad = Costume::new("bad", CostumeFormat::Bitmap, b"nope".to_vec());
    assert!(set.get_or_create(&mut gpu, &bad).is_err());
    assert!(set.is_empty());
}

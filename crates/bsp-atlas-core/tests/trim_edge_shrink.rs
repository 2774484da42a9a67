use bsp_atlas_core::model::Rect;
use bsp_atlas_core::trim::{RgbaView, trim, trim_rect};
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};

/// Tight bbox by brute force; None when nothing is visible.
fn tight_bbox(img: &RgbaImage) -> Option<Rect> {
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
    for (x, y, p) in img.enumerate_pixels() {
        if p[3] > 0 {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
    }
    (x0 != u32::MAX).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
}

fn random_sprite(rng: &mut rand::rngs::StdRng) -> RgbaImage {
    let w = rng.gen_range(1..=24);
    let h = rng.gen_range(1..=24);
    let mut img = RgbaImage::new(w, h);
    let blobs = rng.gen_range(0..4);
    for _ in 0..blobs {
        let x = rng.gen_range(0..w);
        let y = rng.gen_range(0..h);
        img.put_pixel(x, y, Rgba([200, 10, 10, rng.gen_range(1..=255)]));
    }
    img
}

#[test]
fn trim_is_idempotent() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..300 {
        let img = random_sprite(&mut rng);
        let view = RgbaView::from_image(&img);
        let once = trim(view);
        let twice = trim(once);
        assert_eq!(once.bounds(), twice.bounds());
    }
}

#[test]
fn trim_matches_tight_bbox_when_visible() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    for _ in 0..300 {
        let img = random_sprite(&mut rng);
        let got = trim_rect(&img);
        match tight_bbox(&img) {
            Some(expected) => assert_eq!(got, expected),
            None => assert_eq!(got, Rect::new(0, 0, 1, 1)),
        }
    }
}

#[test]
fn fully_transparent_degenerates_to_one_pixel() {
    for (w, h) in [(1, 1), (1, 9), (9, 1), (64, 32)] {
        let img = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 0]));
        assert_eq!(trim_rect(&img), Rect::new(0, 0, 1, 1));
    }
}

#[test]
fn any_nonzero_alpha_stops_an_edge() {
    // Single faint pixel in the bottom-right corner of the right column.
    let mut img = RgbaImage::new(8, 8);
    img.put_pixel(7, 7, Rgba([0, 0, 0, 1]));
    img.put_pixel(2, 3, Rgba([0, 0, 0, 255]));
    assert_eq!(trim_rect(&img), Rect::new(2, 3, 6, 5));
}

#[test]
fn trimmed_view_reads_source_pixels() {
    let mut img = RgbaImage::new(5, 4);
    img.put_pixel(1, 1, Rgba([1, 2, 3, 4]));
    img.put_pixel(3, 2, Rgba([5, 6, 7, 8]));
    let t = trim(RgbaView::from_image(&img));
    assert_eq!(t.bounds(), Rect::new(1, 1, 3, 2));
    assert_eq!(t.pixel(0, 0), [1, 2, 3, 4]);
    assert_eq!(t.pixel(2, 1), [5, 6, 7, 8]);
    let copy = t.to_image();
    assert_eq!(copy.dimensions(), (3, 2));
    assert_eq!(copy.get_pixel(2, 1).0, [5, 6, 7, 8]);
}

#[test]
fn strided_buffer_matches_tight_image() {
    let mut img = RgbaImage::new(6, 5);
    img.put_pixel(2, 1, Rgba([9, 9, 9, 255]));
    img.put_pixel(4, 3, Rgba([9, 9, 9, 255]));
    // Re-lay the image with 3 extra opaque pixels per row.
    let stride = (6 + 3) * 4;
    let mut buf = vec![255u8; stride * 5];
    for y in 0..5u32 {
        for x in 0..6u32 {
            let off = x as usize * 4 + y as usize * stride;
            buf[off..off + 4].copy_from_slice(&img.get_pixel(x, y).0);
        }
    }
    let view = RgbaView::new(&buf, 6, 5, stride).expect("view");
    assert_eq!(trim(view).bounds(), trim_rect(&img));
}

//! Encoder/decoder round-trip over synthetic images.
//!
//! Everything the encoder emits must come back out of the decoder with the
//! same black/white cells, after accounting for the margin rows and the
//! protocol's default row reversal.

use image::{GrayImage, Luma, Rgb, RgbImage};
use ptouch_raster::{decode, render, Bitmap, Config, Model, TapeSize};

fn pattern_black(x: u32, y: u32) -> bool {
    (x * 7 + y * 3) % 5 == 0
}

fn gray_bitmap(width: u32, height: u32) -> Bitmap {
    let img = GrayImage::from_fn(width, height, |x, y| {
        Luma([if pattern_black(x, y) { 0u8 } else { 255u8 }])
    });
    Bitmap::from_gray(width, height, img.into_raw()).unwrap()
}

fn check_roundtrip(model: Model, tape: TapeSize, compress: bool, stripe: u32) {
    let (width, height) = (13u32, 29u32);
    let (top, bottom) = (9u32, 11u32);
    let cut_correction = model.cut_correction();

    let config = Config::new(model, tape)
        .top_margin(top)
        .bottom_margin(bottom)
        .compress(compress);
    let data = render(&[gray_bitmap(width, height)], &config).unwrap();

    let decoded = decode(&data).unwrap();
    assert_eq!(decoded.width() as u32, stripe);
    assert_eq!(decoded.height() as u32, top + width + bottom);
    assert_eq!(decoded.margin(), 0);
    assert!(!decoded.mirroring());

    // Margin rows (shifted by the cut correction) are blank.
    for y in 0..(top - cut_correction) as usize {
        assert!(decoded.rows()[y].iter().all(|&c| !c), "top margin row {}", y);
    }
    for y in (top + width) as usize..decoded.height() {
        assert!(
            decoded.rows()[y].iter().all(|&c| !c),
            "bottom margin row {}",
            y
        );
    }

    // Each image column is one decoded row, vertically flipped by the
    // default reversal; the rest of the stripe is unprinted.
    for x in 0..width {
        let row = &decoded.rows()[(top - cut_correction + x) as usize];
        for y in 0..height {
            assert_eq!(
                row[(height - 1 - y) as usize],
                pattern_black(x, y),
                "cell ({}, {})",
                x,
                y
            );
        }
        assert!(row[height as usize..].iter().all(|&c| !c));
    }
}

#[test]
fn p950nw_18mm_raw() {
    check_roundtrip(Model::P950NW, TapeSize::Tape18mm, false, 408);
}

#[test]
fn p950nw_18mm_compressed() {
    check_roundtrip(Model::P950NW, TapeSize::Tape18mm, true, 408);
}

#[test]
fn p950nw_36mm_compressed() {
    check_roundtrip(Model::P950NW, TapeSize::Tape36mm, true, 536);
}

#[test]
fn pt9800pcn_raw() {
    check_roundtrip(Model::Pt9800Pcn, TapeSize::Tape18mm, false, 312);
}

#[test]
fn pt9800pcn_compressed() {
    check_roundtrip(Model::Pt9800Pcn, TapeSize::Tape18mm, true, 312);
}

#[test]
fn multiple_images_concatenate() {
    let config = Config::new(Model::P950NW, TapeSize::Tape18mm).compress(true);
    let data = render(&[gray_bitmap(5, 20), gray_bitmap(7, 8)], &config).unwrap();

    let decoded = decode(&data).unwrap();
    // Default margins of 8 around each of the two images.
    assert_eq!(decoded.height(), (8 + 5 + 8) + (8 + 7 + 8));
    assert_eq!(decoded.width(), 408);
}

#[test]
fn rgb_images_roundtrip_through_luminance() {
    let (width, height) = (6u32, 10u32);
    let img = RgbImage::from_fn(width, height, |x, y| {
        if pattern_black(x, y) {
            Rgb([40u8, 30, 70])
        } else {
            Rgb([250u8, 240, 245])
        }
    });
    let bitmap = Bitmap::from_rgb(width, height, img.into_raw()).unwrap();

    let config = Config::new(Model::P950NW, TapeSize::Tape18mm);
    let data = render(&[bitmap], &config).unwrap();
    let decoded = decode(&data).unwrap();

    for x in 0..width {
        let row = &decoded.rows()[(8 + x) as usize];
        for y in 0..height {
            assert_eq!(row[(height - 1 - y) as usize], pattern_black(x, y));
        }
    }
}

use super::*;

fn image_from_fn(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> DecodedImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&f(x, y));
        }
    }
    crate::foundation::math::premultiply_rgba8_in_place(&mut data);
    DecodedImage::from_premul_rgba8(w, h, data).unwrap()
}

#[test]
fn quantize_rounds_to_bucket_and_clamps() {
    assert_eq!(quantize(0, 32), 0);
    assert_eq!(quantize(15, 32), 0);
    assert_eq!(quantize(16, 32), 32);
    assert_eq!(quantize(250, 32), 255);
    assert_eq!(quantize(200, 32), 192);
}

#[test]
fn red_blue_halves_yield_both_distinct_colors() {
    let img = image_from_fn(200, 100, |x, _| {
        if x < 100 {
            [255, 0, 0, 255]
        } else {
            [0, 0, 255, 255]
        }
    });
    let palette = extract_palette(&img, &ExtractOpts::default());
    let colors: Vec<Rgba8> = palette.iter().map(|e| e.color).collect();
    assert!(colors.contains(&Rgba8::rgb(255, 0, 0)));
    assert!(colors.contains(&Rgba8::rgb(0, 0, 255)));
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            assert!(distance(*a, *b) > 50.0, "{a:?} vs {b:?}");
        }
    }
    assert_eq!(palette.len(), 4);
    assert_eq!(palette[2].label, "White");
    assert_eq!(palette[3].label, "Dark");
}

#[test]
fn near_white_image_only_gets_fallbacks() {
    let img = image_from_fn(50, 50, |_, _| [250, 250, 250, 255]);
    let palette = extract_palette(&img, &ExtractOpts::default());
    let labels: Vec<&str> = palette.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["White", "Dark"]);
}

#[test]
fn similar_colors_are_merged_by_distance() {
    let img = image_from_fn(100, 100, |x, _| match x {
        0..50 => [64, 128, 192, 255],
        50..80 => [96, 128, 192, 255],
        _ => [192, 64, 0, 255],
    });
    let palette = extract_palette(&img, &ExtractOpts::default());
    let colors: Vec<Rgba8> = palette.iter().map(|e| e.color).collect();
    assert!(colors.contains(&Rgba8::rgb(64, 128, 192)));
    assert!(!colors.contains(&Rgba8::rgb(96, 128, 192)));
    assert!(colors.contains(&Rgba8::rgb(192, 64, 0)));
}

#[test]
fn transparent_pixels_are_ignored() {
    let img = image_from_fn(10, 10, |x, _| {
        if x < 9 {
            [255, 0, 0, 0]
        } else {
            [0, 160, 0, 255]
        }
    });
    let palette = extract_palette(&img, &ExtractOpts::default());
    assert_eq!(palette[0].color, Rgba8::rgb(0, 160, 0));
    assert!(!palette.iter().any(|e| e.color == Rgba8::rgb(255, 0, 0)));
}

#[test]
fn capacity_limits_palette_and_fallbacks() {
    let img = image_from_fn(8, 1, |x, _| {
        let colors = [
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
            [255, 255, 0, 255],
            [0, 255, 255, 255],
            [255, 0, 255, 255],
            [128, 64, 0, 255],
            [64, 0, 128, 255],
        ];
        colors[x as usize]
    });
    let palette = extract_palette(&img, &ExtractOpts::default());
    assert_eq!(palette.len(), 6);
    assert!(!palette.iter().any(|e| e.label == "White"));
}

#[test]
fn undecodable_bytes_give_empty_palette_and_presets_substitute() {
    assert!(extract_palette_from_bytes(b"nope", &ExtractOpts::default()).is_empty());

    let presets = suggest_palette(None, &ExtractOpts::default());
    assert_eq!(presets, preset_palette());
    assert_eq!(presets[0].label, "Ocean");
    assert_eq!(presets[0].color.to_hex_rgb(), "#0ea5e9");
    assert_eq!(presets.len(), 8);
}

#[test]
fn palette_entry_serializes_hex() {
    let json = serde_json::to_string(&preset_palette()[1]).unwrap();
    assert_eq!(json, r##"{"color":"#f97316","label":"Sunset"}"##);
}

use super::*;
use crate::render::geometry::{rect_to_cpu, rounded_rect_path};

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn over_handles_transparent_opaque_and_partial() {
    let dst = [0, 0, 200, 255];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
    assert_eq!(over(dst, [10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(over(dst, [128, 0, 0, 128]), [128, 0, 100, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
}

#[test]
fn draw_layer_composites_filled_rect() {
    let mut s = Surface::new(canvas(4, 4)).unwrap();
    s.draw_layer(|ctx| {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 0, 0, 255));
        ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, 2.0, 4.0)));
        Ok(())
    })
    .unwrap();
    let f = s.to_frame();
    assert_eq!(f.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(1, 3), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(3, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(4, 0), None);
    assert!(!f.premultiplied);
}

#[test]
fn draw_layer_propagates_errors() {
    let mut s = Surface::new(canvas(2, 2)).unwrap();
    let err = s
        .draw_layer(|_| Err(ShotError::render("boom")))
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
}

#[test]
fn to_frame_unpremultiplies() {
    let mut s = Surface::new(canvas(1, 1)).unwrap();
    s.data_mut().copy_from_slice(&[50, 0, 0, 128]);
    let f = s.to_frame();
    assert_eq!(f.data, vec![100, 0, 0, 128]);
}

#[test]
fn mask_from_path_covers_shape_and_padding() {
    let path = rounded_rect_path(10.0, 10.0, 10.0, 10.0, 0.0);
    let mask = AlphaMask::from_path(&path, 5.0, Rect::new(0.0, 0.0, 100.0, 100.0))
        .unwrap()
        .unwrap();
    assert_eq!((mask.x0, mask.y0, mask.width, mask.height), (5, 5, 20, 20));
    let at = |x: u32, y: u32| mask.data[(y * mask.width + x) as usize];
    assert_eq!(at(10, 10), 255);
    assert_eq!(at(0, 0), 0);

    let outside = AlphaMask::from_path(&path, 5.0, Rect::new(50.0, 50.0, 60.0, 60.0)).unwrap();
    assert!(outside.is_none());
}

#[test]
fn blur_spreads_and_roughly_preserves_coverage() {
    let mut mask = AlphaMask {
        x0: 1,
        y0: 0,
        width: 21,
        height: 21,
        data: vec![0; 21 * 21],
    };
    for y in 8..13 {
        for x in 8..13 {
            mask.data[y * 21 + x] = 255;
        }
    }
    let before: u32 = mask.data.iter().map(|&v| u32::from(v)).sum();
    mask.blur(2.0).unwrap();
    let after: u32 = mask.data.iter().map(|&v| u32::from(v)).sum();
    assert!(mask.data[10 * 21 + 10] < 255);
    assert!(mask.data[10 * 21 + 4] > 0);
    assert!(before.abs_diff(after) < before / 20);

    let untouched = mask.clone();
    mask.blur(0.0).unwrap();
    assert_eq!(mask, untouched);
}

#[test]
fn fill_mask_clips_to_surface_and_tints() {
    let mut s = Surface::new(canvas(2, 2)).unwrap();
    let mask = AlphaMask {
        x0: 1,
        y0: 0,
        width: 2,
        height: 2,
        data: vec![255, 128, 0, 255],
    };
    s.fill_mask(&mask, Rgba8::new(0, 0, 0, 64));
    assert_eq!(&s.data()[0..4], &[0, 0, 0, 0]);
    assert_eq!(&s.data()[4..8], &[0, 0, 0, 64]);
    assert_eq!(&s.data()[12..16], &[0, 0, 0, 0]);
}

#[test]
fn png_encoding_round_trips_dimensions() {
    let frame = FrameRGBA {
        width: 3,
        height: 2,
        data: vec![255; 3 * 2 * 4],
        premultiplied: false,
    };
    let png = frame.encode_png().unwrap();
    let back = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (3, 2));

    let bad = FrameRGBA {
        data: vec![0; 5],
        ..frame
    };
    assert!(bad.encode_png().is_err());
}


//! End-to-end rasterization scenarios.
//!
//! These exercise the full pipeline — transform, orientation, clip, format
//! conversion — by drawing into small buffers and checking exact pixels.
//!
//! Run with:   cargo test --test raster_regression

use trama::text::utf8;
use trama::{Canvas, Color, Matrix2, Orientation, PixelFormat, Recti, Vec2f};

#[test]
fn background_fill_round_trips_argb8888() {
    let mut canvas = Canvas::new(4, 4, PixelFormat::Argb8888).unwrap();
    canvas.background(Color(0xff204060));
    assert_eq!(canvas.get_pixel(1, 1), Some(Color(0xff204060)));
}

#[test]
fn grey1_pixel_lands_in_the_right_bit() {
    let mut canvas = Canvas::new(4, 4, PixelFormat::Grey1).unwrap();
    canvas.set_pixel(Color(0xffffffff), 2, 2);
    assert_eq!(canvas.get_pixel(2, 2), Some(Color(0xffffffff)));
    // Pixel (2,2) is bit index 2 + 2*4 = 10: byte 1, bit 2.
    assert_eq!(canvas.bytes()[1] & 0x04, 0x04);
}

#[test]
fn scaled_rect_covers_the_doubled_area() {
    let mut canvas = Canvas::new(10, 10, PixelFormat::Argb8888).unwrap();
    canvas.push_matrix();
    canvas.apply_matrix(Matrix2::scale(2.0, 2.0));
    canvas.draw_rect(Color::rgb(255, 0, 0), 0.0, 0.0, 2.0, 2.0);
    canvas.pop_matrix().unwrap();

    let red = Color::rgb(255, 0, 0);
    for y in 0..10 {
        for x in 0..10 {
            let expect = x < 4 && y < 4;
            assert_eq!(canvas.get_pixel(x, y) == Some(red), expect, "({x},{y})");
        }
    }
}

#[test]
fn clip_limits_a_full_buffer_rect() {
    let mut canvas = Canvas::new(10, 10, PixelFormat::Argb8888).unwrap();
    canvas.background(Color::rgb(0, 0, 255));
    canvas.set_clip(2, 2, 4, 4);
    canvas.simple_rect(Color::rgb(255, 0, 0), 0.0, 0.0, 10.0, 10.0);

    for y in 0..10 {
        for x in 0..10 {
            let inside = (2..6).contains(&x) && (2..6).contains(&y);
            let expect = if inside {
                Color::rgb(255, 0, 0)
            } else {
                Color::rgb(0, 0, 255)
            };
            assert_eq!(canvas.get_pixel(x, y), Some(expect), "({x},{y})");
        }
    }
}

#[test]
fn convex_quad_triangulates_into_two_triangles() {
    let square = [
        Vec2f::new(0.0, 0.0),
        Vec2f::new(4.0, 0.0),
        Vec2f::new(4.0, 4.0),
        Vec2f::new(0.0, 4.0),
    ];
    let tris = trama::triangulate(&square);
    assert_eq!(tris.len(), 2);
    let mut indices: Vec<usize> = tris.iter().flatten().copied().collect();
    assert_eq!(indices.len(), 6);
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn utf8_decoding_matches_the_contract() {
    assert_eq!(utf8::decode(&[0xc2, 0xa9]), (0xa9, 2));
    assert_eq!(utf8::decode(&[0xff]), (utf8::REPLACEMENT, 1));
}

#[test]
fn every_format_accepts_every_primitive() {
    for format in PixelFormat::ALL {
        let mut canvas = Canvas::new(16, 16, format).unwrap();
        let color = if format.is_palette() {
            canvas.set_palette(vec![Color::BLACK, Color::WHITE]).unwrap();
            Color(1)
        } else {
            Color::WHITE
        };
        canvas.background(Color(0));
        canvas.draw_rect(color, 1.0, 1.0, 6.0, 6.0);
        canvas.draw_tri(color, 8.0, 1.0, 15.0, 1.0, 8.0, 8.0);
        canvas.draw_line(color, 0.0, 15.0, 15.0, 0.0);
        canvas.draw_circle(color, 8.0, 8.0, 4.0);
        assert_eq!(canvas.get_pixel(2, 2), Some(Color::WHITE), "{format:?}");
    }
}

#[test]
fn orientation_rotates_the_visible_result() {
    // Draw the same L-marker under every orientation, read it back through
    // the same orientation; the user-space picture must be identical.
    let draw = |canvas: &mut Canvas| {
        canvas.background(Color::BLACK);
        canvas.simple_rect(Color::WHITE, 0.0, 0.0, 3.0, 1.0);
        canvas.simple_rect(Color::WHITE, 0.0, 0.0, 1.0, 5.0);
    };
    let mut reference = Canvas::new(12, 12, PixelFormat::Argb8888).unwrap();
    draw(&mut reference);
    let expected: Vec<Option<Color>> = (0..12 * 12)
        .map(|i| reference.get_pixel(i % 12, i / 12))
        .collect();

    for orientation in Orientation::ALL {
        let mut canvas = Canvas::new(12, 12, PixelFormat::Argb8888).unwrap();
        canvas.set_orientation(orientation);
        draw(&mut canvas);
        let got: Vec<Option<Color>> = (0..12 * 12)
            .map(|i| canvas.get_pixel(i % 12, i / 12))
            .collect();
        assert_eq!(got, expected, "{orientation:?}");
    }
}

#[test]
fn dirty_rect_tracks_a_draw_sequence() {
    let mut canvas = Canvas::new(32, 32, PixelFormat::Rgb565).unwrap();
    canvas.background(Color::BLACK);
    canvas.mark_clean();
    assert_eq!(canvas.dirty_rect(), None);

    canvas.simple_rect(Color::WHITE, 4.0, 4.0, 4.0, 4.0);
    canvas.simple_rect(Color::WHITE, 20.0, 20.0, 2.0, 2.0);
    let dirty = canvas.dirty_rect().unwrap();
    // Contains both draws.
    assert_eq!(dirty.intersect(Recti::new(4, 4, 4, 4)), Recti::new(4, 4, 4, 4));
    assert_eq!(
        dirty.intersect(Recti::new(20, 20, 2, 2)),
        Recti::new(20, 20, 2, 2)
    );
    // Pixels outside the dirty rect kept their background value.
    assert_eq!(canvas.get_pixel(30, 2), Some(Color::BLACK));
}

#[test]
fn palette_buffer_full_cycle() {
    let mut canvas = Canvas::new(8, 8, PixelFormat::Pal4).unwrap();
    canvas
        .set_palette(vec![
            Color::BLACK,
            Color::rgb(255, 0, 0),
            Color::rgb(0, 255, 0),
        ])
        .unwrap();
    canvas.background(Color(0));
    canvas.draw_rect(Color(1), 0.0, 0.0, 4.0, 8.0);
    canvas.draw_rect(Color(2), 4.0, 0.0, 4.0, 8.0);
    // Out-of-palette index draws nothing.
    canvas.draw_rect(Color(9), 0.0, 0.0, 8.0, 8.0);

    assert_eq!(canvas.get_pixel(1, 1), Some(Color::rgb(255, 0, 0)));
    assert_eq!(canvas.get_pixel(6, 6), Some(Color::rgb(0, 255, 0)));
    assert_eq!(canvas.get_pixel_raw(1, 1), Some(1));
}

#[test]
fn reversed_endianness_swaps_stored_bytes() {
    let mut straight = Canvas::new(2, 1, PixelFormat::Rgb565).unwrap();
    let mut reversed = Canvas::new(2, 1, PixelFormat::Rgb565).unwrap();
    reversed.set_reverse_endianness(true);

    straight.background(Color::rgb(0xff, 0x00, 0x80));
    reversed.background(Color::rgb(0xff, 0x00, 0x80));

    assert_eq!(straight.bytes()[0], reversed.bytes()[1]);
    assert_eq!(straight.bytes()[1], reversed.bytes()[0]);
    // Reading back goes through the same swap.
    assert_eq!(straight.get_pixel(0, 0), reversed.get_pixel(0, 0));
}

#[test]
fn transparent_draws_blend_against_the_background() {
    let mut canvas = Canvas::new(4, 4, PixelFormat::Argb8888).unwrap();
    canvas.background(Color::BLACK);
    canvas.simple_rect(Color::argb(128, 255, 255, 255), 0.0, 0.0, 4.0, 4.0);
    let mid = canvas.get_pixel(2, 2).unwrap();
    assert!(mid.is_opaque());
    assert!((mid.r() as i32 - 128).abs() <= 1, "r = {}", mid.r());
}

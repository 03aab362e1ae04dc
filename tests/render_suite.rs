use snowfall::render::{
    compose_over, AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer, Rgb,
};
use snowfall::snow::{PixelSurface, SnowConfig, SnowOverlay, Viewport};
use std::time::Instant;

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

/// Build a gradient pixel buffer (varies across x).
fn gradient_pixels(w: usize, h: usize) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            let t = (x as f32 / w.max(1) as f32 * 255.0) as u8;
            buf[i] = t;
            buf[i + 1] = 128;
            buf[i + 2] = 255 - t;
            buf[i + 3] = 255;
        }
    }
    buf
}

fn make_frame<'a>(
    cols: u16,
    visual_rows: u16,
    pw: usize,
    ph: usize,
    pixels: &'a [u8],
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 2,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        hud: "Snow: on | FPS 60",
        hud_rows: 1,
        overlay: None,
        sync_updates: sync,
    }
}

// ── ASCII renderer ──────────────────────────────────────────────────────────

#[test]
fn ascii_renders_solid_frame() {
    let cols = 10u16;
    let rows = 5u16;
    let pixels = solid_pixels(cols as usize, rows as usize, 200, 200, 200);
    let frame = make_frame(cols, rows, cols as usize, rows as usize, &pixels, false);
    let mut out = Vec::new();
    let mut renderer = AsciiRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[H"), "missing home cursor");
    assert!(s.contains("\x1b[?7l"), "missing autowrap-off");
    assert!(s.contains("\x1b[?7h"), "missing autowrap-on");
    // Should have FG color escapes for 200,200,200
    assert!(s.contains("38;2;200;200;200"), "missing FG color");
    // HUD should be present
    assert!(s.contains("FPS 60"), "HUD text missing");
}

#[test]
fn ascii_name() {
    assert_eq!(AsciiRenderer::new().name(), "ascii");
}

#[test]
fn ascii_skips_zero_size() {
    let pixels = solid_pixels(1, 1, 0, 0, 0);
    let frame = make_frame(0, 0, 0, 0, &pixels, false);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty(), "expected empty output for zero-size frame");
}

// ── HalfBlock renderer ─────────────────────────────────────────────────────

#[test]
fn halfblock_renders_gradient_frame() {
    let cols = 8u16;
    let rows = 4u16;
    let pw = cols as usize;
    let ph = (rows as usize) * 2;
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, true);
    let mut out = Vec::new();
    let mut renderer = HalfBlockRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[?2026h"), "missing sync-begin");
    assert!(s.contains("\x1b[?2026l"), "missing sync-end");
    // Should use upper-half-block character
    assert!(s.contains("\u{2580}"), "missing half-block char");
    // Should have both FG and BG colors
    assert!(s.contains("38;2;"), "missing FG escape");
    assert!(s.contains("48;2;"), "missing BG escape");
}

#[test]
fn halfblock_name() {
    assert_eq!(HalfBlockRenderer::new().name(), "halfblock");
}

#[test]
fn halfblock_skips_dimension_mismatch() {
    // pixel_height should be visual_rows*2, but give visual_rows*1
    let cols = 4u16;
    let rows = 4u16;
    let pixels = solid_pixels(4, 4, 100, 100, 100);
    let frame = make_frame(cols, rows, 4, 4, &pixels, false);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty(), "expected empty output for dimension mismatch");
}

// ── Braille renderer ────────────────────────────────────────────────────────

#[test]
fn braille_renders_gradient_frame() {
    let cols = 6u16;
    let rows = 3u16;
    let pw = (cols as usize) * 2;
    let ph = (rows as usize) * 4;
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, false);
    let mut out = Vec::new();
    let mut renderer = BrailleRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    // Braille characters are in U+2800..U+28FF range
    assert!(
        s.chars().any(|c| ('\u{2800}'..='\u{28FF}').contains(&c) || c == ' '),
        "no braille characters found"
    );
    assert!(s.contains("FPS 60"), "HUD text missing");
}

#[test]
fn braille_name() {
    assert_eq!(BrailleRenderer::new().name(), "braille");
}

// ── Overlay rendering ───────────────────────────────────────────────────────

#[test]
fn ascii_renders_overlay_popup() {
    let cols = 40u16;
    let rows = 20u16;
    let pixels = solid_pixels(cols as usize, rows as usize, 50, 50, 50);
    let mut frame = make_frame(cols, rows, cols as usize, rows as usize, &pixels, false);
    frame.term_rows = rows + 2;
    frame.overlay = Some("Test Overlay\nSecond line");
    let mut out = Vec::new();
    let mut renderer = AsciiRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("Test Overlay"), "overlay text missing");
}

// ── Multiple frames (color cache reset) ─────────────────────────────────────

#[test]
fn halfblock_resets_color_cache_each_frame() {
    let cols = 4u16;
    let rows = 2u16;
    let pw = 4;
    let ph = 4;

    // Frame 1: red
    let pixels1 = solid_pixels(pw, ph, 255, 0, 0);
    let frame1 = make_frame(cols, rows, pw, ph, &pixels1, false);
    let mut out1 = Vec::new();
    let mut renderer = HalfBlockRenderer::new();
    renderer.render(&frame1, &mut out1).unwrap();
    let s1 = String::from_utf8_lossy(&out1);
    assert!(s1.contains("38;2;255;0;0"), "first frame missing red FG");

    // Frame 2: blue - color cache should reset so new color is emitted
    let pixels2 = solid_pixels(pw, ph, 0, 0, 255);
    let frame2 = make_frame(cols, rows, pw, ph, &pixels2, false);
    let mut out2 = Vec::new();
    renderer.render(&frame2, &mut out2).unwrap();
    let s2 = String::from_utf8_lossy(&out2);
    assert!(s2.contains("38;2;0;0;255"), "second frame missing blue FG");
}

// ── HUD ─────────────────────────────────────────────────────────────────────

#[test]
fn hud_lines_are_clipped_to_terminal_width() {
    let cols = 8u16;
    let rows = 2u16;
    let pixels = solid_pixels(cols as usize, rows as usize, 0, 0, 0);
    let mut frame = make_frame(cols, rows, cols as usize, rows as usize, &pixels, false);
    frame.hud = "Snow: on | Flakes: 5000";
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("Snow: on"));
    assert!(!s.contains("Flakes"), "HUD not clipped");
}

#[test]
fn short_pixel_buffer_reports_instead_of_panicking() {
    let pixels = vec![0u8; 8];
    let frame = make_frame(4, 2, 4, 2, &pixels, false);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("pixel buffer too small"));
}

// ── Compositing ─────────────────────────────────────────────────────────────

fn px(buf: &[u8], w: usize, x: usize, y: usize) -> [u8; 4] {
    let i = (y * w + x) * 4;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn background_colour_parses_hex() {
    assert_eq!("0b1020".parse::<Rgb>().unwrap(), Rgb(0x0b, 0x10, 0x20));
    assert_eq!("#FFffFF".parse::<Rgb>().unwrap(), Rgb(255, 255, 255));
    assert_eq!(Rgb(1, 2, 255).to_string(), "0102ff");
    assert!("0b10".parse::<Rgb>().is_err());
    assert!("zzzzzz".parse::<Rgb>().is_err());
    assert!("0b1020ff".parse::<Rgb>().is_err());
}

#[test]
fn transparent_surface_composes_to_background() {
    let src = vec![0u8; 16 * 8 * 4];
    let mut out = Vec::new();
    compose_over(&src, 16, 8, 4, 4, Rgb(10, 20, 30), &mut out);
    assert_eq!(out.len(), 4 * 4 * 4);
    for p in out.chunks_exact(4) {
        assert_eq!(p, [10, 20, 30, 255]);
    }
}

#[test]
fn empty_surface_composes_to_background() {
    let mut out = vec![1, 2, 3];
    compose_over(&[], 0, 0, 3, 2, Rgb(5, 6, 7), &mut out);
    assert_eq!(out.len(), 3 * 2 * 4);
    assert!(out.chunks_exact(4).all(|p| p == [5, 6, 7, 255]));
}

#[test]
fn opaque_white_covers_background() {
    let src = vec![255u8; 4 * 4 * 4];
    let mut out = Vec::new();
    compose_over(&src, 4, 4, 2, 2, Rgb(0, 0, 64), &mut out);
    assert!(out.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
}

#[test]
fn downscale_averages_coverage() {
    // Left half of a 4x2 source is opaque white, right half clear.
    let mut src = vec![0u8; 4 * 2 * 4];
    for y in 0..2 {
        for x in 0..2 {
            let i = (y * 4 + x) * 4;
            src[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    let mut out = Vec::new();
    compose_over(&src, 4, 2, 1, 1, Rgb(0, 0, 0), &mut out);
    let p = px(&out, 1, 0, 0);
    assert!((126..=128).contains(&p[0]), "{p:?}");

    compose_over(&src, 4, 2, 2, 1, Rgb(0, 0, 0), &mut out);
    assert_eq!(px(&out, 2, 0, 0)[0], 255);
    assert_eq!(px(&out, 2, 1, 0)[0], 0);
}

#[test]
fn snow_frame_reaches_the_terminal() {
    let mut overlay = SnowOverlay::new(
        Some(PixelSurface::new()),
        Viewport::new(160.0, 96.0, 1.0),
        SnowConfig {
            base_count: 200_000,
            seed: Some(3),
            ..SnowConfig::default()
        },
    );
    overlay.start();
    assert!(overlay.tick(Instant::now()));
    let surface = overlay.surface().expect("surface");

    let (cols, rows) = (20u16, 6u16);
    let (w, h) = (cols as usize, rows as usize * 2);
    let bg = Rgb(0, 0, 0);
    let mut grid = Vec::new();
    compose_over(surface.pixels(), surface.width(), surface.height(), w, h, bg, &mut grid);
    assert!(grid.chunks_exact(4).any(|p| p[0] > 0), "no snow in composed grid");

    let frame = make_frame(cols, rows, w, h, &grid, true);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\u{2580}"));
    assert!(s.contains("Snow: on"));
}

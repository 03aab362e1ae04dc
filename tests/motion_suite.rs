use snowfall::snow::motion::step;
use snowfall::snow::paint::render;
use snowfall::snow::{
    render_x, wobble_offset, Flake, LayerTable, ParticleField, PixelSurface, SpriteAtlas, Viewport,
    RECYCLE_Y,
};
use std::f32::consts::FRAC_PI_2;

fn flake(x: f32, y: f32, speed_y: f32) -> Flake {
    Flake {
        x,
        y,
        speed_y,
        base_size: 1.0,
        time: 0.0,
        wobble_speed: 0.03,
        wobble_amp: 12.0,
        wobble_phase: 0.4,
        wobble_speed2: 0.01,
        wobble_amp2: 6.0,
        wobble_phase2: 1.1,
        layer: 2,
    }
}

fn still_flake(x: f32, y: f32, size: f32) -> Flake {
    Flake {
        base_size: size,
        wobble_amp: 0.0,
        wobble_amp2: 0.0,
        layer: 6,
        ..flake(x, y, 0.0)
    }
}

// ── Vertical drift ──────────────────────────────────────────────────────────

#[test]
fn y_advances_linearly_without_recycling() {
    let mut field = ParticleField::new();
    field.push(flake(100.0, 10.0, 2.5));
    let mut rng = fastrand::Rng::with_seed(1);
    for _ in 0..100 {
        step(&mut field, 800.0, 1.0e6, &mut rng);
    }
    let f = field.get(0).expect("one flake");
    assert!((f.y - 260.0).abs() < 1e-3, "y={}", f.y);
    assert_eq!(f.x, 100.0);
}

#[test]
fn time_advances_by_wobble_speed() {
    let mut field = ParticleField::new();
    field.push(flake(0.0, 0.0, 1.0));
    let mut rng = fastrand::Rng::with_seed(1);
    for _ in 0..10 {
        step(&mut field, 800.0, 1.0e6, &mut rng);
    }
    let f = field.get(0).expect("one flake");
    assert!((f.time - 0.3).abs() < 1e-5, "time={}", f.time);
}

// ── Recycling ───────────────────────────────────────────────────────────────

#[test]
fn flake_past_the_bottom_is_recycled_above_the_top() {
    let mut field = ParticleField::new();
    let before = flake(20.0, 99.0, 5.0);
    field.push(before);
    let mut rng = fastrand::Rng::with_seed(9);
    step(&mut field, 50.0, 100.0, &mut rng);

    let after = field.get(0).expect("one flake");
    assert_eq!(after.y, RECYCLE_Y);
    assert!(after.y < 0.0);
    assert!((0.0..50.0).contains(&after.x), "x={}", after.x);
    // Everything but position survives the trip.
    assert_eq!(after.speed_y, before.speed_y);
    assert_eq!(after.base_size, before.base_size);
    assert_eq!(after.layer, before.layer);
    assert_eq!(after.wobble_amp, before.wobble_amp);
    assert_eq!(after.wobble_phase2, before.wobble_phase2);
}

#[test]
fn flake_exactly_at_the_bottom_stays() {
    let mut field = ParticleField::new();
    field.push(flake(20.0, 95.0, 5.0));
    let mut rng = fastrand::Rng::with_seed(9);
    step(&mut field, 50.0, 100.0, &mut rng);
    assert_eq!(field.get(0).map(|f| f.y), Some(100.0));
}

#[test]
fn no_flake_stays_below_the_surface_after_a_step() {
    let table = LayerTable::default();
    let mut rng = fastrand::Rng::with_seed(42);
    let (w, h) = (300.0, 200.0);
    let mut field = ParticleField::generate(5000, w, h, &table, &mut rng);
    assert!(!field.is_empty());
    for _ in 0..400 {
        step(&mut field, w, h, &mut rng);
        assert!(field.ys().iter().all(|&y| (RECYCLE_Y..=h).contains(&y)));
        assert!(field.xs().iter().all(|&x| (0.0..w).contains(&x)));
    }
}

// ── Wobble ──────────────────────────────────────────────────────────────────

#[test]
fn render_x_sums_both_harmonics() {
    // sin(0 + pi/2) = 1, cos(0.8 * 0 + 0) = 1
    let rx = render_x(100.0, 0.0, 10.0, FRAC_PI_2, 4.0, 0.0);
    assert!((rx - 114.0).abs() < 1e-4, "rx={rx}");
}

#[test]
fn render_x_is_deterministic() {
    let args = (321.5, 77.25, 33.0, 1.3, 12.0, 4.2);
    let a = render_x(args.0, args.1, args.2, args.3, args.4, args.5);
    for _ in 0..10 {
        let b = render_x(args.0, args.1, args.2, args.3, args.4, args.5);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn secondary_harmonic_runs_at_four_fifths() {
    // Only the cosine term: cos(0.8 * t).
    let t = 2.5;
    let off = wobble_offset(t, 0.0, 0.0, 1.0, 0.0);
    assert!((off - (0.8f32 * t).cos()).abs() < 1e-6);
}

#[test]
fn render_position_is_derived_not_stored() {
    let mut field = ParticleField::new();
    field.push(flake(100.0, 50.0, 0.0));
    let (rx, ry) = field.render_pos(0);
    let f = field.get(0).expect("one flake");
    assert_eq!(ry, f.y);
    assert_eq!(rx, render_x(f.x, f.time, f.wobble_amp, f.wobble_phase, f.wobble_amp2, f.wobble_phase2));
    assert_eq!(f.x, 100.0);
}

// ── Frame renderer ──────────────────────────────────────────────────────────

#[test]
fn render_stamps_each_flake_at_its_position() {
    let atlas = SpriteAtlas::build(&LayerTable::default().opacities(), 10).expect("atlas");
    let mut surface = PixelSurface::with_viewport(Viewport::new(100.0, 50.0, 1.0), 2.0);
    let mut field = ParticleField::new();
    field.push(still_flake(50.0, 25.0, 3.0));

    render(&mut surface, &field, &atlas);
    assert!(surface.pixel(50, 25)[3] > 0);
    assert!(surface.pixel(49, 24)[3] > 0);
    assert_eq!(surface.pixel(10, 10), [0, 0, 0, 0]);
    assert_eq!(surface.pixel(60, 25), [0, 0, 0, 0]);
}

#[test]
fn render_clears_the_previous_frame() {
    let atlas = SpriteAtlas::build(&LayerTable::default().opacities(), 10).expect("atlas");
    let mut surface = PixelSurface::with_viewport(Viewport::new(100.0, 50.0, 1.0), 2.0);
    let mut field = ParticleField::new();
    field.push(still_flake(20.0, 20.0, 3.0));
    render(&mut surface, &field, &atlas);
    assert!(surface.pixel(20, 20)[3] > 0);

    render(&mut surface, &ParticleField::new(), &atlas);
    assert!(surface.is_blank());
}

#[test]
fn render_respects_device_scale() {
    let atlas = SpriteAtlas::build(&LayerTable::default().opacities(), 10).expect("atlas");
    let mut surface = PixelSurface::with_viewport(Viewport::new(100.0, 50.0, 2.0), 2.0);
    let mut field = ParticleField::new();
    field.push(still_flake(50.0, 25.0, 3.0));
    render(&mut surface, &field, &atlas);
    // Logical (50, 25) lands on device (100, 50).
    assert!(surface.pixel(100, 50)[3] > 0);
    assert_eq!(surface.pixel(50, 25), [0, 0, 0, 0]);
}

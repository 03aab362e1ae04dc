use std::time::{Duration, Instant};

use anyhow::Result;
use snowfall::snow::{PixelSurface, SnowConfig, SnowOverlay, Viewport};

struct Args {
    frames: usize,
    sizes: Vec<(f32, f32)>,
    scale: f32,
    flakes: usize,
    seed: u64,
    ci_smoke: bool,
    quick: bool,
    max_ms: f64,
}

const DEFAULT_SIZES: [(f32, f32); 3] = [(1280.0, 720.0), (1920.0, 1080.0), (3840.0, 2160.0)];

fn parse_args() -> Args {
    let mut args = Args {
        frames: 240,
        sizes: DEFAULT_SIZES.to_vec(),
        scale: 1.0,
        flakes: 5000,
        seed: 0x5eed,
        ci_smoke: false,
        quick: false,
        max_ms: 16.0,
    };
    let mut w: Option<f32> = None;
    let mut h: Option<f32> = None;

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--w", Some(x)) => {
                w = x.parse::<f32>().ok().filter(|v| *v > 0.0);
                i += 2;
            }
            ("--h", Some(x)) => {
                h = x.parse::<f32>().ok().filter(|v| *v > 0.0);
                i += 2;
            }
            ("--scale", Some(x)) => {
                if let Ok(v) = x.parse::<f32>() {
                    args.scale = v;
                }
                i += 2;
            }
            ("--flakes", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.flakes = n;
                }
                i += 2;
            }
            ("--seed", Some(x)) => {
                if let Ok(n) = x.parse::<u64>() {
                    args.seed = n;
                }
                i += 2;
            }
            ("--ci-smoke", Some(x)) if !x.starts_with("--") => {
                args.ci_smoke = parse_bool(x).unwrap_or(true);
                i += 2;
            }
            ("--ci-smoke", _) => {
                args.ci_smoke = true;
                i += 1;
            }
            ("--quick", Some(x)) if !x.starts_with("--") => {
                args.quick = parse_bool(x).unwrap_or(true);
                i += 2;
            }
            ("--quick", _) => {
                args.quick = true;
                i += 1;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = v.max(0.1);
                }
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    if let (Some(w), Some(h)) = (w, h) {
        args.sizes = vec![(w, h)];
    }
    if args.quick {
        args.frames = args.frames.min(60);
    }
    args
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct Run {
    flakes: usize,
    avg_ms: f64,
    p95_ms: f64,
    lit: usize,
}

fn bench_size(args: &Args, w: f32, h: f32) -> Run {
    let cfg = SnowConfig {
        base_count: args.flakes,
        seed: Some(args.seed),
        ..SnowConfig::default()
    };
    let mut overlay = SnowOverlay::new(Some(PixelSurface::new()), Viewport::new(w, h, args.scale), cfg);
    overlay.start();

    // Fake display clock so the benchmark does not depend on wall time.
    let t0 = Instant::now();
    let mut samples = Vec::with_capacity(args.frames);
    let mut lit = 0usize;
    for f in 0..args.frames {
        let now = t0 + Duration::from_micros(16_667 * f as u64);
        let start = Instant::now();
        overlay.tick(now);
        samples.push(start.elapsed().as_secs_f64() * 1000.0);
        if overlay.surface().is_some_and(|s| !s.is_blank()) {
            lit += 1;
        }
    }

    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let avg_ms = samples.iter().sum::<f64>() / samples.len().max(1) as f64;
    let p95_idx = ((samples.len() as f64 - 1.0) * 0.95).round() as usize;
    let p95_ms = samples.get(p95_idx).copied().unwrap_or(0.0);
    Run {
        flakes: overlay.stats().flakes,
        avg_ms,
        p95_ms,
        lit,
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    println!(
        "Snow benchmark: frames={} scale={} base_flakes={} quick={}",
        args.frames, args.scale, args.flakes, args.quick
    );

    let mut failures = Vec::new();
    for &(w, h) in &args.sizes {
        let run = bench_size(&args, w, h);
        let fps = if run.avg_ms > 0.0 { 1000.0 / run.avg_ms } else { 0.0 };
        println!(
            "{:>5.0}x{:<5.0} flakes={:>5} {:>8.3} ms/frame avg {:>8.3} p95 {:>8.1} FPS lit={}/{}",
            w, h, run.flakes, run.avg_ms, run.p95_ms, fps, run.lit, args.frames
        );
        if run.lit == 0 && run.flakes > 0 {
            failures.push(format!("{w:.0}x{h:.0}: no frame drew anything"));
        }
        if args.ci_smoke && run.avg_ms > args.max_ms {
            failures.push(format!(
                "{w:.0}x{h:.0}: {:.3} ms/frame > {:.3}",
                run.avg_ms, args.max_ms
            ));
        }
    }

    if args.ci_smoke {
        if !failures.is_empty() {
            eprintln!("CI smoke: FAIL");
            for f in failures {
                eprintln!("  {f}");
            }
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(())
}

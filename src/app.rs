use instant::Instant;

use heatfield::debug::timer::QueryPhase;
use heatfield::debug::QueryStats;
use heatfield::{engine, HeatConfig, HeatMap, MapPoint, MapRect};

/// Points in each generated dataset.
const POINT_COUNT: usize = 50_000;
/// Hot spots the points cluster around.
const CLUSTER_COUNT: usize = 12;
/// Side of the square world, in planar units.
const WORLD_EXTENT: f64 = 100_000.0;
/// Viewport size in pixels; the planar size is this divided by the scale.
const VIEWPORT_PX: (f64, f64) = (1280.0, 720.0);
/// Zoom levels visited, from zoomed out to zoomed in.
const SCALES: [f64; 5] = [0.0125, 0.05, 0.2, 0.8, 3.2];
/// Pan steps per zoom level.
const PAN_STEPS: usize = 40;
/// Swap in a fresh dataset after this many queries.
const REPLACE_EVERY: usize = 75;
/// Default RNG seed; override with `HEATFIELD_SEED`.
const DEFAULT_SEED: u64 = 0x5EED;

// ---------------------------------------------------------------------------
// Dataset generation
// ---------------------------------------------------------------------------

/// Clustered points with integer-ish event counts as weights.
fn generate_points(rng: &mut fastrand::Rng) -> Vec<(MapPoint, f64)> {
    let centers: Vec<(MapPoint, f64)> = (0..CLUSTER_COUNT)
        .map(|_| {
            let c = MapPoint::new(rng.f64() * WORLD_EXTENT, rng.f64() * WORLD_EXTENT);
            let spread = WORLD_EXTENT * (0.005 + rng.f64() * 0.04);
            (c, spread)
        })
        .collect();

    (0..POINT_COUNT)
        .map(|_| {
            let (c, spread) = centers[rng.usize(..centers.len())];
            // Sum of uniforms: cheap bell-shaped offset.
            let jitter = |rng: &mut fastrand::Rng| (rng.f64() + rng.f64() + rng.f64() - 1.5) * spread;
            let x = (c.x + jitter(rng)).clamp(0.0, WORLD_EXTENT);
            let y = (c.y + jitter(rng)).clamp(0.0, WORLD_EXTENT);
            let weight = 1.0 + rng.u32(0..20) as f64;
            (MapPoint::new(x, y), weight)
        })
        .collect()
}

fn seed_from_env() -> u64 {
    match std::env::var("HEATFIELD_SEED") {
        Ok(s) => s.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable HEATFIELD_SEED {s:?}, using default");
            DEFAULT_SEED
        }),
        Err(_) => DEFAULT_SEED,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Visible planar rect for a viewport centred on `center` at `scale`.
fn viewport(center: MapPoint, scale: f64) -> MapRect {
    let (w, h) = (VIEWPORT_PX.0 / scale, VIEWPORT_PX.1 / scale);
    MapRect::new(MapPoint::new(center.x - w * 0.5, center.y - h * 0.5), w, h)
}

/// Simulate a pan/zoom session against one overlay and log what it costs.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let seed = seed_from_env();
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut stats = QueryStats::new();

    let start = Instant::now();
    let map = HeatMap::with_config(generate_points(&mut rng), HeatConfig::default())?;
    stats.record_replace(start.elapsed().as_secs_f64() * 1_000_000.0);

    let bounds = map.bounding_rect();
    log::info!(
        "Seed {seed}: {} points, bounds {:.0}x{:.0}, centre {}",
        map.stats().count,
        bounds.width(),
        bounds.height(),
        map.center()
    );

    let mut queries = 0usize;
    for scale in SCALES {
        let bin = map.config().base_cell_size / scale;
        log::info!("Zoom scale {scale}: bin {bin:.1} units");

        let mut visible = 0usize;
        let mut peak = 0.0f64;
        for step in 0..PAN_STEPS {
            // Diagonal sweep across the data.
            let t = step as f64 / (PAN_STEPS - 1) as f64;
            let center = MapPoint::new(
                bounds.origin().x + bounds.width() * t,
                bounds.origin().y + bounds.height() * t,
            );
            let rect = viewport(center, scale);
            if !map.intersects(&rect) {
                continue;
            }
            visible += 1;

            let q = Instant::now();
            let heat = map.points_with_heat_in_rect(&rect, scale)?;
            stats.record_query(q.elapsed().as_secs_f64() * 1_000_000.0, heat.len());

            let norm = stats
                .timers
                .time(QueryPhase::Normalize, || engine::normalize(&heat));
            peak = heat.values().copied().fold(peak, f64::max);
            log::debug!("  step {step}: {} bins, {} normalized", heat.len(), norm.len());

            queries += 1;
            if queries % REPLACE_EVERY == 0 {
                let fresh = generate_points(&mut rng);
                let t = Instant::now();
                map.set_data(fresh)?;
                let us = t.elapsed().as_secs_f64() * 1_000_000.0;
                stats.record_replace(us);
                log::info!("Dataset replaced after {queries} queries ({us:.0}us)");
            }
        }
        log::info!("  {visible}/{PAN_STEPS} viewports visible, peak bin intensity {peak:.0}");
    }

    let s = stats.summary();
    log::info!(
        "Done: {} queries, {} replacements | avg {:.1}us | max {:.1}us | bins avg {:.1}",
        stats.query_count,
        stats.replace_count,
        s.latency_avg_us,
        s.latency_max_us,
        s.bins_avg
    );
    stats.log_phases();
    Ok(())
}

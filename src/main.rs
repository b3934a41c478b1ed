//! Hexfall headless runner
//!
//! Plays a session without a renderer: a fixed-step loop with a simple
//! rotating bot, logging events as they happen. Useful for soak tests and
//! for producing save files.
//!
//! Usage: `hexfall [seed] [mobile|desktop] [seconds] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use hexfall::consts::SIM_DT;
    use hexfall::sim::geometry;
    use hexfall::{GameEvent, Preset, Settings, Simulation, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args
        .first()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);
    let preset = args
        .get(1)
        .and_then(|s| Preset::parse(s))
        .unwrap_or_default();
    let seconds = args
        .get(2)
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(120.0);
    let settings = match args.get(3) {
        Some(path) => Settings::load(Path::new(path)),
        None => Settings::from_preset(preset),
    };

    log::info!(
        "Hexfall (headless) seed={} preset={} seconds={}",
        seed,
        preset.as_str(),
        seconds
    );

    let mut sim = Simulation::new(settings, seed);
    let ticks = (seconds / SIM_DT) as u64;
    // Fade animations take about a fifth of a second
    let fade_ticks = 12;

    for frame in 0..ticks {
        let now_ms = frame as f64 * SIM_DT as f64 * 1000.0;
        if frame % 45 == 0 {
            let direction = if (frame / 45) % 3 == 2 { -1 } else { 1 };
            sim.rotate(direction, now_ms);
        }

        tick(&mut sim, SIM_DT);
        if frame % fade_ticks == 0 {
            sim.complete_fades();
        }

        for event in sim.drain_events() {
            match event {
                GameEvent::Cleared {
                    lane,
                    count,
                    points,
                    combo,
                    ..
                } => log::info!(
                    "Cleared {} in lane {} for {} points (x{})",
                    count,
                    lane,
                    points,
                    combo
                ),
                GameEvent::PatternChanged { pattern } => {
                    log::debug!("Pattern -> {}", pattern.as_str())
                }
                GameEvent::GameOver { score } => log::info!("Game over, score {}", score),
                other => log::trace!("{:?}", other),
            }
        }

        if sim.is_game_over() {
            break;
        }
    }

    log::info!(
        "Finished after {:.1}s: score {}, difficulty {:.2}, {} blocks on board",
        sim.board.elapsed_time,
        sim.score,
        sim.director.difficulty,
        sim.board.block_count()
    );

    let rotation = sim.board.rotation();
    let height = sim.board.block_height;
    for (lane, index, block) in sim.board.iter_blocks() {
        let [inner_a, inner_b, outer_b, outer_a] =
            geometry::block_corners(block, true, rotation, height);
        log::debug!(
            "lane {} #{} color {}: inner {:?}..{:?} outer {:?}..{:?}",
            lane,
            index,
            block.color.0,
            inner_a,
            inner_b,
            outer_a,
            outer_b
        );
    }

    match sim.save_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize session: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}

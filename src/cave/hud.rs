//! HUD text: score, timer and lantern readouts.

use crate::cave::world::World;

/// Formats seconds as `mm:ss.cc`, truncating rather than rounding.
pub fn format_time(secs: f32) -> String {
    let secs = secs.max(0.0);
    let whole = secs.floor();
    let minutes = (whole / 60.0) as u32;
    let seconds = (whole % 60.0) as u32;
    let centis = (((secs - whole) * 100.0).floor() as u32).min(99);
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

pub fn score_line(world: &World) -> String {
    format!("Crystals: {} / {}", world.collected(), world.target())
}

pub fn battery_line(world: &World) -> String {
    format!("Lantern: {}%", world.lantern.percent())
}

pub fn lantern_status(world: &World) -> &'static str {
    if world.lantern.is_on() {
        "LANTERN ON"
    } else {
        "LANTERN OFF"
    }
}

use serde::{Deserialize, Serialize};

/// Radius of the lit area at full charge, on top of `MIN_LIGHT_RADIUS`.
pub const LIGHT_RADIUS_SPAN: f32 = 180.0;
pub const MIN_LIGHT_RADIUS: f32 = 40.0;

/// The player's lantern. `battery` always stays within `[0, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lantern {
    battery: f32,
    max: f32,
    on: bool,
}

/// What a tick did to the lantern, so callers can log transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanternEvent {
    Steady,
    Depleted,
    Recharged,
}

impl Lantern {
    pub fn new(max: f32) -> Self {
        Self { battery: max, max, on: true }
    }

    pub fn battery(&self) -> f32 {
        self.battery
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn fraction(&self) -> f32 {
        self.battery / self.max
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    pub fn light_radius(&self) -> f32 {
        LIGHT_RADIUS_SPAN * self.fraction() + MIN_LIGHT_RADIUS
    }

    /// Flips the lantern. An empty lantern refuses to light; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.on = if self.on { false } else { self.battery > 0.0 };
        self.on
    }

    pub fn tick(&mut self, dt: f32, drain: f32, recharge: f32) -> LanternEvent {
        if self.on {
            self.battery = (self.battery - drain * dt).max(0.0);
            if self.battery <= 0.0 {
                self.on = false;
                return LanternEvent::Depleted;
            }
            LanternEvent::Steady
        } else {
            let was_full = self.battery >= self.max;
            self.battery = (self.battery + recharge * dt).min(self.max);
            if !was_full && self.battery >= self.max {
                LanternEvent::Recharged
            } else {
                LanternEvent::Steady
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_while_on() {
        let mut lantern = Lantern::new(10.0);
        lantern.tick(1.0, 1.2, 0.8);
        assert!((lantern.battery() - 8.8).abs() < 1e-5);
        assert!(lantern.is_on());
    }

    #[test]
    fn switches_off_when_empty() {
        let mut lantern = Lantern::new(1.0);
        assert_eq!(lantern.tick(0.5, 1.2, 0.8), LanternEvent::Steady);
        assert_eq!(lantern.tick(0.5, 1.2, 0.8), LanternEvent::Depleted);
        assert_eq!(lantern.battery(), 0.0);
        assert!(!lantern.is_on());
    }

    #[test]
    fn recharges_while_off_up_to_max() {
        let mut lantern = Lantern::new(10.0);
        lantern.toggle();
        lantern.tick(1.0, 1.2, 0.8);
        assert_eq!(lantern.battery(), 10.0);

        let mut lantern = Lantern::new(1.0);
        lantern.tick(1.0, 1.2, 0.8);
        assert_eq!(lantern.tick(1.0, 1.2, 0.8), LanternEvent::Steady);
        assert!((lantern.battery() - 0.8).abs() < 1e-5);
        assert_eq!(lantern.tick(1.0, 1.2, 0.8), LanternEvent::Recharged);
        assert_eq!(lantern.battery(), 1.0);
    }

    #[test]
    fn empty_lantern_will_not_light() {
        let mut lantern = Lantern::new(1.0);
        lantern.tick(2.0, 1.2, 0.8);
        assert!(!lantern.toggle());
        lantern.tick(0.1, 1.2, 0.8);
        assert!(lantern.toggle());
    }

    #[test]
    fn radius_shrinks_with_charge() {
        let mut lantern = Lantern::new(10.0);
        assert_eq!(lantern.light_radius(), 220.0);
        assert_eq!(lantern.percent(), 100);
        lantern.tick(5.0, 1.0, 0.0);
        assert_eq!(lantern.light_radius(), 130.0);
        assert_eq!(lantern.percent(), 50);
    }
}

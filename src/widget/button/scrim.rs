//! Countdown overlay for one button.
//!
//! Tracks the active and recharging timers and, while recharging, a
//! clockwise pie reveal plus the seconds left. The owning bar calls `tick`
//! once per frame.
use crate::engine::{Clock, Rect, Renderer};
use crate::event_bus::EventBus;
use serde::Deserialize;
use std::rc::Rc;

/// Just past half a turn, so the first half never lines up with the second.
const HALF_TURN: f64 = 180.001;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Active,
    Recharging,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrimEvent {
    ActiveComplete,
    Recharged,
}

impl ScrimEvent {
    pub fn name(self) -> &'static str {
        match self {
            ScrimEvent::ActiveComplete => "activeComplete",
            ScrimEvent::Recharged => "recharged",
        }
    }
}

/// Rotation of the two half discs, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Reveal {
    pub first: f64,
    pub second: f64,
}

impl Reveal {
    pub fn sweep(&self) -> f64 {
        self.first + self.second
    }
}

/// Split a 0-360° sweep over two half discs.
pub fn rotate(deg: f64) -> Reveal {
    if deg >= 180.0 {
        Reveal {
            first: HALF_TURN,
            second: -(HALF_TURN - deg),
        }
    } else {
        Reveal {
            first: deg,
            second: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrimOptions {
    pub size: f64,
    pub background_color: String,
}

impl Default for ScrimOptions {
    fn default() -> Self {
        ScrimOptions {
            size: 50.0,
            background_color: String::from("#000"),
        }
    }
}

pub struct Scrim {
    options: ScrimOptions,
    clock: Rc<dyn Clock>,
    active_ms: f64,
    recharging_ms: f64,
    phase: Option<Phase>,
    total_ms: f64,
    // None is idle
    remaining: Option<f64>,
    last_tick: f64,
    reveal: Reveal,
    label: String,
    events: EventBus<ScrimEvent>,
}

impl Scrim {
    pub fn new(options: ScrimOptions, clock: Rc<dyn Clock>) -> Self {
        Scrim {
            options,
            clock,
            active_ms: 0.0,
            recharging_ms: 0.0,
            phase: None,
            total_ms: 0.0,
            remaining: None,
            last_tick: 0.0,
            reveal: Reveal::default(),
            label: String::new(),
            events: EventBus::new(),
        }
    }

    pub fn events(&self) -> &EventBus<ScrimEvent> {
        &self.events
    }

    pub fn set_active_time(&mut self, seconds: f64) {
        self.active_ms = seconds.max(0.0) * 1000.0;
    }

    pub fn set_recharging_time(&mut self, seconds: f64) {
        self.recharging_ms = seconds.max(0.0) * 1000.0;
    }

    pub fn active_ms(&self) -> f64 {
        self.active_ms
    }

    pub fn recharging_ms(&self) -> f64 {
        self.recharging_ms
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn remaining_ms(&self) -> Option<f64> {
        self.remaining
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    pub fn reveal(&self) -> Reveal {
        self.reveal
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// Arm the timer for `phase`. Calling it again while running restarts
    /// from the new remaining time.
    pub fn set_countdown(&mut self, phase: Phase, remaining_seconds: Option<f64>) {
        let mut total = match phase {
            Phase::Active => self.active_ms,
            Phase::Recharging => self.recharging_ms,
        };
        let remaining = remaining_seconds
            .map(|seconds| (seconds * 1000.0).max(0.0))
            .unwrap_or(total);
        // an override longer than the configured time stretches the sweep
        if remaining > total {
            if total > 0.0 {
                log::warn!(
                    "scrim: {}ms remaining exceeds the {}ms {:?} time",
                    remaining, total, phase
                );
            }
            total = remaining;
        }

        self.phase = Some(phase);
        self.total_ms = total;
        self.remaining = Some(remaining);
        self.last_tick = self.clock.now();
        if phase == Phase::Recharging {
            self.update_reveal(remaining);
        }
    }

    /// Back to idle without a completion event.
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Advance the countdown. Returns the completion event on the tick the
    /// timer runs out, and only then.
    pub fn tick(&mut self) -> Option<ScrimEvent> {
        let mut remaining = self.remaining?;
        if remaining > 0.0 {
            let now = self.clock.now();
            let elapsed = (now - self.last_tick).max(0.0);
            remaining = (remaining - elapsed).max(0.0);

            if self.phase == Some(Phase::Recharging) {
                self.update_reveal(remaining);
            }

            self.last_tick = now;
            self.remaining = Some(remaining);
        }

        if remaining > 0.0 {
            return None;
        }

        self.remaining = None;
        let event = match self.phase {
            Some(Phase::Recharging) => ScrimEvent::Recharged,
            _ => ScrimEvent::ActiveComplete,
        };
        self.events.emit(event.name(), &event);
        Some(event)
    }

    fn update_reveal(&mut self, remaining: f64) {
        let deg = if self.total_ms > 0.0 {
            360.0 - (remaining / self.total_ms) * 360.0
        } else {
            360.0
        };
        self.reveal = rotate((deg * 1000.0).round() / 1000.0);
        self.label = format!("{:.1}", remaining / 1000.0);
    }

    /// Draw the unrevealed part of the pie and the seconds left over `cell`.
    pub fn render(&self, renderer: &Renderer, cell: &Rect) {
        if self.phase != Some(Phase::Recharging) || !self.is_running() {
            return;
        }
        let center = cell.center();
        let radius = self.options.size.min(cell.width()).min(cell.height()) * std::f64::consts::SQRT_2 / 2.0;
        renderer.with_alpha(0.6, |renderer| {
            renderer.fill_wedge(
                center,
                radius,
                self.reveal.sweep(),
                360.0,
                &self.options.background_color,
            );
        });
        let font = format!("bold {}px sans-serif", (self.options.size * 0.3).round());
        renderer.fill_text(&self.label, center, &font, "#fff");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;
    use approx::assert_relative_eq;

    fn scrim(active: f64, recharging: f64) -> (ManualClock, Scrim) {
        let clock = ManualClock::new(1_000.0);
        let mut scrim = Scrim::new(ScrimOptions::default(), Rc::new(clock.clone()));
        scrim.set_active_time(active);
        scrim.set_recharging_time(recharging);
        (clock, scrim)
    }

    #[test]
    fn rotate_pins_the_first_half_past_180() {
        assert_eq!(rotate(90.0), Reveal { first: 90.0, second: 0.0 });
        let late = rotate(270.0);
        assert_relative_eq!(late.first, 180.001);
        assert_relative_eq!(late.second, 89.999, epsilon = 1e-9);
        assert_relative_eq!(late.sweep(), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn active_countdown_completes_exactly_once() {
        let (clock, mut scrim) = scrim(2.0, 5.0);
        scrim.set_countdown(Phase::Active, None);
        assert_eq!(scrim.remaining_ms(), Some(2_000.0));

        clock.advance(1_500.0);
        assert_eq!(scrim.tick(), None);
        assert_eq!(scrim.remaining_ms(), Some(500.0));
        // no visual update while active
        assert_eq!(scrim.reveal(), Reveal::default());

        clock.advance(900.0);
        assert_eq!(scrim.tick(), Some(ScrimEvent::ActiveComplete));
        assert_eq!(scrim.remaining_ms(), None);

        clock.advance(900.0);
        assert_eq!(scrim.tick(), None);
    }

    #[test]
    fn recharging_updates_reveal_and_label() {
        let (clock, mut scrim) = scrim(1.0, 4.0);
        scrim.set_countdown(Phase::Recharging, None);

        clock.advance(1_000.0);
        assert_eq!(scrim.tick(), None);
        assert_relative_eq!(scrim.reveal().sweep(), 90.0);
        assert_eq!(scrim.label(), "3.0");

        clock.advance(2_500.0);
        scrim.tick();
        assert_relative_eq!(scrim.reveal().sweep(), 315.0, epsilon = 1e-9);
        assert_eq!(scrim.label(), "0.5");

        clock.advance(500.0);
        assert_eq!(scrim.tick(), Some(ScrimEvent::Recharged));
    }

    #[test]
    fn override_sets_remaining_seconds() {
        let (clock, mut scrim) = scrim(10.0, 10.0);
        scrim.set_countdown(Phase::Recharging, Some(2.5));
        assert_eq!(scrim.remaining_ms(), Some(2_500.0));
        assert_relative_eq!(scrim.reveal().sweep(), 270.0, epsilon = 1e-9);

        clock.advance(2_500.0);
        assert_eq!(scrim.tick(), Some(ScrimEvent::Recharged));
    }

    #[test]
    fn override_longer_than_the_configured_time_is_kept() {
        let (clock, mut scrim) = scrim(1.0, 0.0);
        scrim.set_countdown(Phase::Recharging, Some(4.5));
        assert_eq!(scrim.remaining_ms(), Some(4_500.0));
        assert_eq!(scrim.total_ms(), 4_500.0);
        assert_eq!(scrim.label(), "4.5");

        clock.advance(16.0);
        assert_eq!(scrim.tick(), None);
        assert!(scrim.is_running());

        scrim.set_countdown(Phase::Active, Some(3.0));
        assert_eq!(scrim.remaining_ms(), Some(3_000.0));
        clock.advance(2_000.0);
        assert_eq!(scrim.tick(), None);
        clock.advance(1_000.0);
        assert_eq!(scrim.tick(), Some(ScrimEvent::ActiveComplete));
    }

    #[test]
    fn zero_duration_completes_on_the_next_tick() {
        let (_clock, mut scrim) = scrim(0.0, 0.0);
        scrim.set_countdown(Phase::Active, None);
        assert_eq!(scrim.tick(), Some(ScrimEvent::ActiveComplete));
    }

    #[test]
    fn cancel_goes_idle_silently() {
        let (clock, mut scrim) = scrim(1.0, 1.0);
        scrim.set_countdown(Phase::Active, None);
        scrim.cancel();
        clock.advance(5_000.0);
        assert_eq!(scrim.tick(), None);
        assert!(!scrim.is_running());
    }

    #[test]
    fn completion_is_published_on_the_bus() {
        let (clock, mut scrim) = scrim(1.0, 1.0);
        let heard = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = heard.clone();
        scrim.events().on(
            "activeComplete recharged",
            crate::event_bus::listener(move |name: &str, _: &ScrimEvent| sink.borrow_mut().push(name.to_owned())),
        );

        scrim.set_countdown(Phase::Active, None);
        clock.advance(1_000.0);
        scrim.tick();
        scrim.set_countdown(Phase::Recharging, None);
        clock.advance(1_000.0);
        scrim.tick();

        assert_eq!(*heard.borrow(), vec!["activeComplete", "recharged"]);
    }
}

//! Time interpolated value bar, for experience bars, progress bars and the
//! activation indicator under a button bar.
use crate::engine::{Clock, Point, Rect, Renderer, Size, Tick};
use crate::event_bus::EventBus;
use crate::widget::{Anchor, Edge, Placement, Widget};
use serde::Deserialize;
use std::rc::Rc;

const DEFAULT_TRANSITION_MS: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillBarOptions {
    pub x: Anchor,
    pub y: Anchor,
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
    pub max: f64,
    pub value: f64,
    pub target_value: f64,
    /// seconds
    pub duration: f64,
    pub border_color: String,
    pub fill_color: String,
}

impl Default for FillBarOptions {
    fn default() -> Self {
        FillBarOptions {
            x: Anchor::Edge(Edge::Middle),
            y: Anchor::Edge(Edge::Middle),
            offset_x: 0.0,
            offset_y: 0.0,
            width: 100.0,
            height: 20.0,
            max: 100.0,
            value: 0.0,
            target_value: 100.0,
            duration: 2.0,
            border_color: String::from("#ccc"),
            fill_color: String::from("rgb(245, 245, 220)"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FillEvent {
    /// the value caught up with the target
    Reached { value: f64 },
}

impl FillEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FillEvent::Reached { .. } => "reached",
        }
    }
}

pub struct FillBar {
    placement: Placement,
    max: f64,
    value: f64,
    target_value: f64,
    duration_ms: f64,
    last_tick: f64,
    alpha: f64,
    changed: bool,
    border_color: String,
    fill_color: String,
    clock: Rc<dyn Clock>,
    events: EventBus<FillEvent>,
}

impl FillBar {
    pub fn new(options: FillBarOptions, clock: Rc<dyn Clock>) -> Self {
        let max = if options.max > 0.0 {
            options.max
        } else {
            log::warn!("fill bar max must be positive, got {}", options.max);
            100.0
        };
        FillBar {
            placement: Placement::new(
                options.x,
                options.y,
                Point::new(options.offset_x, options.offset_y),
                Size::new(options.width, options.height),
            ),
            max,
            value: options.value.clamp(0.0, max),
            target_value: options.target_value.clamp(0.0, max),
            duration_ms: options.duration * 1000.0,
            last_tick: clock.now(),
            alpha: 1.0,
            changed: false,
            border_color: options.border_color,
            fill_color: options.fill_color,
            clock,
            events: EventBus::new(),
        }
    }

    pub fn events(&self) -> &EventBus<FillEvent> {
        &self.events
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Aim for `value` over `duration_ms` (1000 ms when missing or zero)
    /// and fade the bar in.
    pub fn set_target_value(&mut self, value: f64, duration_ms: Option<f64>) {
        self.last_tick = self.clock.now();
        self.target_value = value.clamp(0.0, self.max);
        if self.target_value != self.value {
            self.duration_ms = duration_ms
                .filter(|ms| *ms > 0.0)
                .unwrap_or(DEFAULT_TRANSITION_MS);
            self.alpha = 1.0;
        }
    }

    /// Jump straight to `value`, target included.
    pub fn reset(&mut self, value: f64) {
        self.value = value.clamp(0.0, self.max);
        self.target_value = self.value;
        self.last_tick = self.clock.now();
    }

    fn fill_rect(&self) -> Rect {
        let bounds = self.placement.bounds();
        let inner = bounds.inset(2.0);
        Rect::new(
            inner.position,
            Size::new(inner.width() / self.max * self.value, inner.height()),
        )
    }
}

impl Tick for FillBar {
    fn tick(&mut self) {
        let now = self.clock.now();
        let elapsed = (now - self.last_tick).max(0.0);
        let step = if self.duration_ms > 0.0 {
            elapsed / self.duration_ms * self.max
        } else {
            f64::INFINITY
        };
        let previous = self.value;

        if self.value > self.target_value {
            self.value = (self.value - step).max(self.target_value);
        } else if self.value < self.target_value {
            self.value = (self.value + step).min(self.target_value);
        }
        self.last_tick = now;

        self.changed = self.value != previous;
        if self.changed && self.value == self.target_value {
            let event = FillEvent::Reached { value: self.value };
            self.events.emit(event.name(), &event);
        }
    }
}

impl Widget for FillBar {
    fn render(&self, renderer: &Renderer) {
        if self.alpha <= 0.0 {
            return;
        }
        renderer.with_alpha(self.alpha, |renderer| {
            renderer.fill_rounded_rect(&self.placement.bounds(), 4.0, &self.border_color);
            let fill = self.fill_rect();
            if fill.width() > 0.0 {
                renderer.fill_rounded_rect(&fill, 2.0, &self.fill_color);
            }
        });
    }

    fn reposition(&mut self, offset: Point, container: Size) {
        self.placement.reposition(offset, container);
    }

    /// Whether the last tick moved the value.
    fn is_dirty(&self) -> bool {
        self.changed
    }
}

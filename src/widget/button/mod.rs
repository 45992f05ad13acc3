pub mod scrim;
pub mod state;

pub use scrim::{Phase, Scrim, ScrimEvent, ScrimOptions};
pub use state::ButtonState;

use self::state::{Event, Transition};
use crate::engine::{Clock, Point, Rect, Renderer, Size};
use crate::event_bus::EventBus;
use crate::sprite::SpriteSheet;
use crate::widget::grid::Position;
use serde::Deserialize;
use std::rc::Rc;

const CLASS: &str = "golem-button";
const ACTIVE_COLOR: &str = "#ffd700";
const QUEUED_COLOR: &str = "#4fc3f7";

/// Everything a button publishes. The owning bar reacts to the ones
/// returned from `click`/`tick`/`set_state`; anyone else can listen on
/// `Button::events`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonEvent {
    Click,
    Waiting,
    Active,
    Recharging,
    ActiveComplete,
    Recharged,
    DoubleClick,
    MouseDown,
    MouseUp,
    MouseOver,
    MouseOut,
}

impl ButtonEvent {
    pub fn name(self) -> &'static str {
        match self {
            ButtonEvent::Click => "click",
            ButtonEvent::Waiting => "waiting",
            ButtonEvent::Active => "active",
            ButtonEvent::Recharging => "recharging",
            ButtonEvent::ActiveComplete => "activeComplete",
            ButtonEvent::Recharged => "recharged",
            ButtonEvent::DoubleClick => "dblclick",
            ButtonEvent::MouseDown => "mousedown",
            ButtonEvent::MouseUp => "mouseup",
            ButtonEvent::MouseOver => "mouseover",
            ButtonEvent::MouseOut => "mouseout",
        }
    }
}

/// Per button settings. Every field is optional so the same type works as
/// a patch over a button's current values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonOptions {
    /// sprite frame
    pub index: Option<usize>,
    pub state: Option<ButtonState>,
    pub active_time: Option<f64>,
    pub recharging_time: Option<f64>,
    pub active_time_remaining: Option<f64>,
    pub recharge_time_remaining: Option<f64>,
}

impl ButtonOptions {
    /// Fill the gaps of this patch from `current`. Remaining times only
    /// carry over while the state stays the same.
    pub fn merged_over(self, current: ButtonOptions) -> ButtonOptions {
        let keeps_state = self.state.is_none() || self.state == current.state;
        let carried = |patch: Option<f64>, current: Option<f64>| {
            patch.or(if keeps_state { current } else { None })
        };
        ButtonOptions {
            index: self.index.or(current.index),
            state: self.state.or(current.state),
            active_time: self.active_time.or(current.active_time),
            recharging_time: self.recharging_time.or(current.recharging_time),
            active_time_remaining: carried(self.active_time_remaining, current.active_time_remaining),
            recharge_time_remaining: carried(
                self.recharge_time_remaining,
                current.recharge_time_remaining,
            ),
        }
    }

    /// Remaining time override that applies to the merged state.
    pub fn remaining_for_state(&self) -> Option<f64> {
        match self.state {
            Some(ButtonState::Active) => self.active_time_remaining,
            Some(ButtonState::Recharging) => self.recharge_time_remaining,
            _ => None,
        }
    }
}

pub struct Button {
    state: ButtonState,
    sprite_index: usize,
    // seconds
    active_time: f64,
    recharging_time: f64,
    queued: bool,
    scrim: Scrim,
    sheet: Rc<SpriteSheet>,
    events: EventBus<ButtonEvent>,
}

impl Button {
    pub fn new(sheet: Rc<SpriteSheet>, scrim: ScrimOptions, clock: Rc<dyn Clock>) -> Self {
        Button {
            state: ButtonState::Off,
            sprite_index: 0,
            active_time: 0.0,
            recharging_time: 0.0,
            queued: false,
            scrim: Scrim::new(scrim, clock),
            sheet,
            events: EventBus::new(),
        }
    }

    pub fn events(&self) -> &EventBus<ButtonEvent> {
        &self.events
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn sprite_index(&self) -> usize {
        self.sprite_index
    }

    pub fn active_time(&self) -> f64 {
        self.active_time
    }

    pub fn recharging_time(&self) -> f64 {
        self.recharging_time
    }

    pub fn scrim(&self) -> &Scrim {
        &self.scrim
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    pub fn set_queued(&mut self, queued: bool) {
        self.queued = queued;
    }

    pub fn set_index(&mut self, index: usize) {
        if index >= self.sheet.len() && !self.sheet.is_empty() {
            log::warn!("sprite frame {} is past the end of the sheet", index);
        }
        self.sprite_index = index;
    }

    pub fn set_active_time(&mut self, seconds: f64) {
        self.active_time = seconds.max(0.0);
        self.scrim.set_active_time(self.active_time);
    }

    pub fn set_recharging_time(&mut self, seconds: f64) {
        self.recharging_time = seconds.max(0.0);
        self.scrim.set_recharging_time(self.recharging_time);
    }

    /// Seconds left on the active countdown, while it runs.
    pub fn active_time_remaining(&self) -> Option<f64> {
        self.remaining_in(Phase::Active)
    }

    /// Seconds left on the recharge countdown, while it runs.
    pub fn recharge_time_remaining(&self) -> Option<f64> {
        self.remaining_in(Phase::Recharging)
    }

    fn remaining_in(&self, phase: Phase) -> Option<f64> {
        if self.scrim.phase() == Some(phase) {
            self.scrim.remaining_ms().map(|ms| ms / 1000.0)
        } else {
            None
        }
    }

    /// Current values in patch form.
    pub fn options(&self) -> ButtonOptions {
        ButtonOptions {
            index: Some(self.sprite_index),
            state: Some(self.state),
            active_time: Some(self.active_time),
            recharging_time: Some(self.recharging_time),
            active_time_remaining: self.active_time_remaining(),
            recharge_time_remaining: self.recharge_time_remaining(),
        }
    }

    /// Change state; `remaining` (seconds) overrides the countdown of a
    /// timed state. Returns what was emitted.
    pub fn set_state(&mut self, state: impl Into<ButtonState>, remaining: Option<f64>) -> Vec<ButtonEvent> {
        let mut emitted = Vec::new();
        self.apply_state(state.into(), remaining, &mut emitted);
        emitted
    }

    pub fn click(&mut self, sibling_active: bool) -> Vec<ButtonEvent> {
        let mut emitted = Vec::new();
        self.publish(ButtonEvent::Click, &mut emitted);
        match self.state.transition(Event::Click { sibling_active }) {
            Transition::To(next) => self.apply_state(next, None, &mut emitted),
            Transition::Wait => self.publish(ButtonEvent::Waiting, &mut emitted),
            Transition::Stay => {}
        }
        emitted
    }

    /// Advance the scrim; a finished countdown moves the state machine on.
    pub fn tick(&mut self) -> Vec<ButtonEvent> {
        let mut emitted = Vec::new();
        let Some(done) = self.scrim.tick() else {
            return emitted;
        };
        let (event, signal) = match done {
            ScrimEvent::ActiveComplete => (ButtonEvent::ActiveComplete, Event::ActiveComplete),
            ScrimEvent::Recharged => (ButtonEvent::Recharged, Event::Recharged),
        };
        self.publish(event, &mut emitted);
        if let Transition::To(next) = self.state.transition(signal) {
            self.apply_state(next, None, &mut emitted);
        }
        emitted
    }

    /// Mouse notifications with no effect on the state machine.
    pub fn notify(&self, event: ButtonEvent) {
        self.events.emit(event.name(), &event);
    }

    fn apply_state(&mut self, state: ButtonState, remaining: Option<f64>, emitted: &mut Vec<ButtonEvent>) {
        self.state = state;
        match state {
            ButtonState::Active => {
                self.publish(ButtonEvent::Active, emitted);
                self.scrim.set_countdown(Phase::Active, remaining);
            }
            ButtonState::Recharging => {
                self.publish(ButtonEvent::Recharging, emitted);
                self.scrim.set_countdown(Phase::Recharging, remaining);
            }
            _ => self.scrim.cancel(),
        }
    }

    fn publish(&self, event: ButtonEvent, emitted: &mut Vec<ButtonEvent>) {
        emitted.push(event);
        self.events.emit(event.name(), &event);
    }

    /// Visual identity of the current state, e.g.
    /// `["golem-button", "golem-button-recharging", "queued"]`.
    pub fn class_list(&self) -> Vec<String> {
        let mut classes = vec![CLASS.to_owned(), format!("{}-{}", CLASS, self.state)];
        if self.queued {
            classes.push("queued".to_owned());
        }
        classes
    }

    pub fn frame_size(&self) -> Size {
        self.sheet.frame_size()
    }

    /// Cell of a button at `position` in a bar whose top left is `origin`.
    pub fn cell(&self, origin: Point, position: Position) -> Rect {
        let size = self.frame_size();
        Rect::new(
            Point::new(
                origin.x + (position.column as f64 - 1.0) * size.width,
                origin.y + (position.row as f64 - 1.0) * size.height,
            ),
            size,
        )
    }

    pub fn render(&self, renderer: &Renderer, cell: &Rect) {
        if self.state != ButtonState::Off {
            if let Some(sprite) = self.sheet.frame(self.sprite_index) {
                if let Some(image) = sprite.image {
                    renderer.draw_image(image, &sprite.rect.into(), cell);
                }
            }
        }

        match self.state {
            ButtonState::Disabled | ButtonState::MouseDown => {
                renderer.with_alpha(0.5, |renderer| renderer.fill_rect(cell, "#000"));
            }
            ButtonState::Active => renderer.stroke_rect(&cell.inset(1.0), ACTIVE_COLOR, 2.0),
            ButtonState::Recharging => self.scrim.render(renderer, cell),
            ButtonState::On | ButtonState::Off => {}
        }

        if self.queued {
            renderer.stroke_rect(&cell.inset(3.0), QUEUED_COLOR, 2.0);
        }
    }
}

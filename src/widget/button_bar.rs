//! A grid of skill buttons that share one active slot and a one deep click
//! queue.
//!
//! Only one button may be active bar wide. Clicking another ready button
//! meanwhile (or one that is still recharging) queues it, replacing whatever
//! was queued before. The queue is released when the active button
//! completes, or when the queued button itself finishes recharging.
use crate::engine::input::{PointerEvent, PointerKind};
use crate::engine::{Clock, Point, Rect, Renderer, Size, Tick};
use crate::sprite::SpriteSheet;
use crate::widget::button::{Button, ButtonEvent, ButtonOptions, ButtonState, ScrimOptions};
use crate::widget::fill_bar::{FillBar, FillBarOptions};
use crate::widget::grid::{AddOutcome, Grid, Slot};
use crate::widget::{Anchor, Edge, Placement, Widget};
use serde::Deserialize;
use std::rc::Rc;

const FILL_BAR_GAP: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonBarOptions {
    pub rows: usize,
    pub columns: usize,
    /// name of a registered sprite sheet
    pub sprite_sheet: String,
    /// patches, by slot index
    pub buttons: Vec<ButtonOptions>,
    pub x: Anchor,
    pub y: Anchor,
    pub offset_x: f64,
    pub offset_y: f64,
    pub classes: Vec<String>,
    pub class_name: Option<String>,
    pub scrim: ScrimOptions,
}

impl Default for ButtonBarOptions {
    fn default() -> Self {
        ButtonBarOptions {
            rows: 1,
            columns: 4,
            sprite_sheet: String::new(),
            buttons: Vec::new(),
            x: Anchor::Edge(Edge::Middle),
            y: Anchor::Edge(Edge::Bottom),
            offset_x: 0.0,
            offset_y: 0.0,
            classes: vec![
                String::from("golem-container"),
                String::from("golem-button-bar"),
            ],
            class_name: None,
            scrim: ScrimOptions::default(),
        }
    }
}

pub struct ButtonBar {
    placement: Placement,
    grid: Grid<Button>,
    queued: Option<usize>,
    hovered: Option<usize>,
    fill_bar: FillBar,
    classes: Vec<String>,
    // something visible changed since the tick before last
    dirty: bool,
}

impl ButtonBar {
    pub fn new(options: ButtonBarOptions, sheet: Rc<SpriteSheet>, clock: Rc<dyn Clock>) -> Self {
        let mut grid = Grid::new(options.rows, options.columns);
        for index in 0..grid.capacity() {
            let button = Button::new(sheet.clone(), options.scrim.clone(), clock.clone());
            if let AddOutcome::OutOfBounds(_) = grid.add(button, Some(Slot::Index(index))) {
                log::warn!("ButtonBar: slot {} is out of bounds", index);
            }
        }

        let (rows, columns) = grid.dimensions();
        let frame = sheet.frame_size();
        let size = Size::new(frame.width * columns as f64, frame.height * rows as f64);

        let mut fill_bar = FillBar::new(
            FillBarOptions {
                x: options.x,
                y: options.y,
                width: size.width / 2.0,
                target_value: 0.0,
                offset_y: size.height + FILL_BAR_GAP,
                ..FillBarOptions::default()
            },
            clock,
        );
        fill_bar.set_alpha(0.0);

        let mut classes = options.classes;
        if let Some(class_name) = options.class_name {
            classes.extend(class_name.split_whitespace().map(str::to_owned));
        }

        let mut bar = ButtonBar {
            placement: Placement::new(
                options.x,
                options.y,
                Point::new(options.offset_x, options.offset_y),
                size,
            ),
            grid,
            queued: None,
            hovered: None,
            fill_bar,
            classes,
            dirty: true,
        };

        let capacity = bar.grid.capacity();
        if options.buttons.len() > capacity {
            log::warn!(
                "ButtonBar: {} button options for {} slots, the rest are ignored",
                options.buttons.len(),
                capacity
            );
        }
        for (index, patch) in options.buttons.into_iter().take(capacity).enumerate() {
            bar.update_button(index, patch);
        }
        bar
    }

    pub fn button(&self, index: usize) -> Option<&Button> {
        self.grid.get(index)
    }

    pub fn grid(&self) -> &Grid<Button> {
        &self.grid
    }

    pub fn queued(&self) -> Option<usize> {
        self.queued
    }

    pub fn fill_bar(&self) -> &FillBar {
        &self.fill_bar
    }

    pub fn class_list(&self) -> &[String] {
        &self.classes
    }

    pub fn bounds(&self) -> Rect {
        self.placement.bounds()
    }

    /// Merge `patch` over the button's current settings and apply it.
    pub fn update_button(&mut self, index: usize, patch: ButtonOptions) {
        let Some(button) = self.grid.get_mut(index) else {
            log::warn!("ButtonBar: no button at {}", index);
            return;
        };
        let options = patch.merged_over(button.options());
        
        if let Some(sprite) = options.index {
            button.set_index(sprite);
        }
        button.set_active_time(options.active_time.unwrap_or_default());
        button.set_recharging_time(options.recharging_time.unwrap_or_default());
        let events = button.set_state(options.state.unwrap_or_default(), options.remaining_for_state());
        self.dirty = true;
        self.dispatch(index, events);
    }

    /// Click the button in slot `index`, as the pointer would.
    pub fn click(&mut self, index: usize) -> Vec<ButtonEvent> {
        let sibling_active = self
            .grid
            .iter()
            .any(|(other, button)| other != index && button.state() == ButtonState::Active);
        let Some(button) = self.grid.get_mut(index) else {
            return Vec::new();
        };
        let events = button.click(sibling_active);
        self.dispatch(index, events.clone());
        events
    }

    // depth first: a synthesized click is fully handled before the rest of
    // the triggering button's events
    fn dispatch(&mut self, index: usize, events: Vec<ButtonEvent>) {
        self.dirty |= !events.is_empty();
        for event in events {
            match event {
                ButtonEvent::Waiting => self.update_queue(index),
                ButtonEvent::ActiveComplete => self.dequeue(),
                ButtonEvent::Recharged => self.dequeue_if_matching(index),
                ButtonEvent::Active => self.on_active(index),
                _ => {}
            }
        }
    }

    fn update_queue(&mut self, index: usize) {
        if let Some(previous) = self.queued.take() {
            self.set_queued_flag(previous, false);
        }
        self.queued = Some(index);
        self.set_queued_flag(index, true);
    }

    fn dequeue(&mut self) {
        if let Some(index) = self.queued.take() {
            self.set_queued_flag(index, false);
            self.click(index);
        }
    }

    fn dequeue_if_matching(&mut self, index: usize) {
        if self.queued == Some(index) {
            self.dequeue();
        }
    }

    /// Forget the queued button without clicking it.
    pub fn dump_queue(&mut self) {
        if let Some(index) = self.queued.take() {
            self.set_queued_flag(index, false);
        }
    }

    fn set_queued_flag(&mut self, index: usize, queued: bool) {
        if let Some(button) = self.grid.get_mut(index) {
            button.set_queued(queued);
        }
    }

    fn on_active(&mut self, index: usize) {
        self.dump_queue();
        let active_ms = self
            .grid
            .get(index)
            .map(|button| button.scrim().active_ms())
            .unwrap_or_default();
        if active_ms > 0.0 {
            self.fill_bar.reset(0.0);
            self.fill_bar.set_target_value(100.0, Some(active_ms));
        }
    }

    fn hit_test(&self, point: Point) -> Option<usize> {
        let origin = self.placement.bounds().position;
        self.grid
            .iter()
            .find(|(index, button)| button.cell(origin, self.grid.position_of(*index)).contains(point))
            .map(|(index, _)| index)
    }

    fn notify(&self, index: usize, event: ButtonEvent) {
        if let Some(button) = self.grid.get(index) {
            button.notify(event);
        }
    }

    fn update_hover(&mut self, hit: Option<usize>) {
        if hit == self.hovered {
            return;
        }
        self.dirty = true;
        if let Some(previous) = self.hovered {
            self.notify(previous, ButtonEvent::MouseOut);
        }
        if let Some(current) = hit {
            self.notify(current, ButtonEvent::MouseOver);
        }
        self.hovered = hit;
    }
}

impl Tick for ButtonBar {
    fn tick(&mut self) {
        // changes made between frames count for this tick only
        let touched = std::mem::replace(&mut self.dirty, false);
        for index in 0..self.grid.capacity() {
            let events = match self.grid.get_mut(index) {
                Some(button) => button.tick(),
                None => continue,
            };
            self.dispatch(index, events);
        }
        self.fill_bar.tick();

        let counting_down = self.grid.iter().any(|(_, button)| button.scrim().is_running());
        self.dirty |= touched || counting_down || self.fill_bar.is_dirty();
    }
}

impl Widget for ButtonBar {
    fn render(&self, renderer: &Renderer) {
        let origin = self.placement.bounds().position;
        for (index, button) in self.grid.iter() {
            button.render(renderer, &button.cell(origin, self.grid.position_of(index)));
        }
        self.fill_bar.render(renderer);
    }

    fn reposition(&mut self, offset: Point, container: Size) {
        self.placement.reposition(offset, container);
        self.fill_bar.reposition(offset, container);
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let hit = self.hit_test(event.position);
        match event.kind {
            PointerKind::Move => self.update_hover(hit),
            PointerKind::Click => {
                if let Some(index) = hit {
                    self.click(index);
                }
            }
            PointerKind::DoubleClick => {
                if let Some(index) = hit {
                    self.notify(index, ButtonEvent::DoubleClick);
                }
            }
            PointerKind::Down => {
                if let Some(index) = hit {
                    self.notify(index, ButtonEvent::MouseDown);
                }
            }
            PointerKind::Up => {
                if let Some(index) = hit {
                    self.notify(index, ButtonEvent::MouseUp);
                }
            }
        }
        hit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;
    use crate::event_bus::listener;
    use crate::sprite::SheetRect;
    use std::cell::RefCell;

    fn sheet() -> Rc<SpriteSheet> {
        Rc::new(SpriteSheet::new(vec![SheetRect { x: 0.0, y: 0.0, w: 50.0, h: 50.0 }; 4]))
    }

    fn ready(active_time: f64, recharging_time: f64) -> ButtonOptions {
        ButtonOptions {
            state: Some(ButtonState::On),
            active_time: Some(active_time),
            recharging_time: Some(recharging_time),
            ..ButtonOptions::default()
        }
    }

    fn bar(buttons: Vec<ButtonOptions>) -> (ManualClock, ButtonBar) {
        let clock = ManualClock::new(0.0);
        let options = ButtonBarOptions {
            buttons,
            ..ButtonBarOptions::default()
        };
        let bar = ButtonBar::new(options, sheet(), Rc::new(clock.clone()));
        (clock, bar)
    }

    fn state(bar: &ButtonBar, index: usize) -> ButtonState {
        bar.button(index).unwrap().state()
    }

    #[test]
    fn fills_every_slot_and_applies_patches() {
        let (_clock, bar) = bar(vec![ready(1.0, 2.0), ButtonOptions::default(), ready(3.0, 4.0)]);

        assert_eq!(bar.grid().iter().count(), 4);
        assert_eq!(state(&bar, 0), ButtonState::On);
        assert_eq!(state(&bar, 1), ButtonState::Off);
        assert_eq!(state(&bar, 3), ButtonState::Off);
        assert_eq!(bar.button(2).unwrap().recharging_time(), 4.0);
        assert_eq!(bar.bounds().size, Size::new(200.0, 50.0));
        assert_eq!(bar.fill_bar().alpha(), 0.0);
        assert_eq!(bar.class_list(), ["golem-container", "golem-button-bar"]);
    }

    #[test]
    fn queued_button_activates_when_the_active_one_completes() {
        let (clock, mut bar) = bar(vec![ready(1.0, 5.0), ready(1.0, 5.0)]);

        bar.click(0);
        assert_eq!(state(&bar, 0), ButtonState::Active);

        assert_eq!(bar.click(1), vec![ButtonEvent::Click, ButtonEvent::Waiting]);
        assert_eq!(bar.queued(), Some(1));
        assert!(bar.button(1).unwrap().is_queued());
        assert_eq!(state(&bar, 1), ButtonState::On);

        clock.advance(1_000.0);
        bar.tick();

        assert_eq!(state(&bar, 0), ButtonState::Recharging);
        assert_eq!(state(&bar, 1), ButtonState::Active);
        assert_eq!(bar.queued(), None);
        assert!(!bar.button(1).unwrap().is_queued());
    }

    #[test]
    fn only_the_latest_waiting_button_is_queued() {
        let (_clock, mut bar) = bar(vec![ready(1.0, 1.0), ready(1.0, 1.0), ready(1.0, 1.0)]);
        bar.click(0);
        bar.click(1);
        bar.click(2);

        assert_eq!(bar.queued(), Some(2));
        assert!(!bar.button(1).unwrap().is_queued());
        assert!(bar.button(2).unwrap().is_queued());
    }

    #[test]
    fn recharging_button_is_clicked_again_once_recharged() {
        let (clock, mut bar) = bar(vec![ready(1.0, 2.0)]);
        bar.click(0);
        clock.advance(1_000.0);
        bar.tick();
        assert_eq!(state(&bar, 0), ButtonState::Recharging);

        bar.click(0);
        assert_eq!(bar.queued(), Some(0));

        clock.advance(2_000.0);
        bar.tick();
        assert_eq!(state(&bar, 0), ButtonState::Active);
        assert_eq!(bar.queued(), None);
    }

    #[test]
    fn activating_another_button_dumps_the_queue() {
        let (_clock, mut bar) = bar(vec![ready(1.0, 1.0), ready(1.0, 1.0)]);
        bar.click(0);
        bar.click(1);
        assert_eq!(bar.queued(), Some(1));

        // force a different activation through an options patch
        bar.update_button(
            2,
            ButtonOptions {
                state: Some(ButtonState::Active),
                active_time: Some(1.0),
                ..ButtonOptions::default()
            },
        );

        assert_eq!(bar.queued(), None);
        assert!(!bar.button(1).unwrap().is_queued());
    }

    #[test]
    fn activation_drives_the_fill_bar_over_the_active_time() {
        let (clock, mut bar) = bar(vec![ready(2.0, 1.0), ready(0.0, 1.0)]);

        bar.click(0);
        assert_eq!(bar.fill_bar().alpha(), 1.0);
        assert_eq!(bar.fill_bar().target_value(), 100.0);
        assert_eq!(bar.fill_bar().duration_ms(), 2_000.0);

        clock.advance(1_000.0);
        bar.tick();
        assert_eq!(bar.fill_bar().value(), 50.0);

        clock.advance(1_000.0);
        bar.tick();
        bar.tick();
        assert_eq!(bar.fill_bar().value(), 100.0);

        // zero length activations leave the bar alone
        clock.advance(1_000.0);
        bar.tick();
        bar.click(1);
        assert_eq!(state(&bar, 1), ButtonState::Active);
        assert_eq!(bar.fill_bar().value(), 100.0);
    }

    #[test]
    fn update_button_keeps_unpatched_values_and_remaining_time() {
        let (clock, mut bar) = bar(vec![ready(4.0, 6.0)]);
        bar.click(0);
        clock.advance(1_000.0);
        bar.tick();

        bar.update_button(
            0,
            ButtonOptions {
                index: Some(3),
                ..ButtonOptions::default()
            },
        );

        let button = bar.button(0).unwrap();
        assert_eq!(button.sprite_index(), 3);
        assert_eq!(button.active_time(), 4.0);
        assert_eq!(button.state(), ButtonState::Active);
        assert_eq!(button.active_time_remaining(), Some(3.0));
    }

    #[test]
    fn recharge_override_longer_than_recharging_time_holds() {
        let (clock, mut bar) = bar(vec![ready(1.0, 0.0)]);
        bar.update_button(
            0,
            ButtonOptions {
                state: Some(ButtonState::Recharging),
                recharge_time_remaining: Some(4.5),
                ..ButtonOptions::default()
            },
        );

        clock.advance(16.0);
        bar.tick();
        let button = bar.button(0).unwrap();
        assert_eq!(button.state(), ButtonState::Recharging);
        assert_eq!(button.scrim().remaining_ms(), Some(4_484.0));

        clock.advance(4_484.0);
        bar.tick();
        assert_eq!(state(&bar, 0), ButtonState::On);
    }

    #[test]
    fn idle_bar_stops_asking_for_redraws() {
        let (clock, mut bar) = bar(vec![ready(1.0, 1.0)]);
        bar.tick();
        assert!(bar.is_dirty());
        bar.tick();
        assert!(!bar.is_dirty());

        bar.click(0);
        clock.advance(500.0);
        bar.tick();
        assert!(bar.is_dirty());

        // active, then recharging, then idle again
        clock.advance(500.0);
        bar.tick();
        clock.advance(1_000.0);
        bar.tick();
        assert!(bar.is_dirty());
        bar.tick();
        assert!(!bar.is_dirty());
    }

    #[test]
    fn pointer_events_hit_test_cells() {
        let (_clock, mut bar) = bar(vec![ready(1.0, 1.0), ready(1.0, 1.0)]);
        bar.reposition(Point::default(), Size::new(400.0, 300.0));
        // 200x50 bar, centered at the bottom
        assert_eq!(bar.bounds().position, Point::new(100.0, 250.0));

        let heard = Rc::new(RefCell::new(Vec::new()));
        let sink = heard.clone();
        bar.button(1).unwrap().events().on(
            "mouseover mouseout click",
            listener(move |name: &str, _: &ButtonEvent| sink.borrow_mut().push(name.to_owned())),
        );

        assert!(bar.handle_pointer(&PointerEvent::new(PointerKind::Move, 160.0, 260.0)));
        assert!(bar.handle_pointer(&PointerEvent::new(PointerKind::Click, 160.0, 260.0)));
        assert!(!bar.handle_pointer(&PointerEvent::new(PointerKind::Move, 10.0, 10.0)));
        assert!(!bar.handle_pointer(&PointerEvent::new(PointerKind::Click, 10.0, 10.0)));

        assert_eq!(state(&bar, 1), ButtonState::Active);
        assert_eq!(state(&bar, 0), ButtonState::On);
        assert_eq!(*heard.borrow(), vec!["mouseover", "click", "mouseout"]);
    }

    #[test]
    fn fill_bar_sits_below_the_bar_anchors() {
        let (_clock, mut bar) = bar(Vec::new());
        bar.reposition(Point::default(), Size::new(400.0, 300.0));
        let fill = bar.fill_bar().placement().bounds();
        assert_eq!(fill.size, Size::new(100.0, 20.0));
        // bottom anchored, lifted by the bar height plus the gap
        assert_eq!(fill.position, Point::new(150.0, 210.0));
    }

    #[test]
    fn class_name_adds_classes() {
        let options = ButtonBarOptions {
            class_name: Some(String::from("skills  primary")),
            ..ButtonBarOptions::default()
        };
        let bar = ButtonBar::new(options, sheet(), Rc::new(ManualClock::new(0.0)));
        assert_eq!(
            bar.class_list(),
            ["golem-container", "golem-button-bar", "skills", "primary"]
        );
    }
}

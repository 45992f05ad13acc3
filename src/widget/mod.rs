//! Positioned things drawn on the stage.
use crate::assets::AssetRegistry;
use crate::engine::input::PointerEvent;
use crate::engine::{Clock, ListenerId, Point, Rect, Renderer, Size, Tick, Ticker};
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

pub mod button;
pub mod button_bar;
pub mod fill_bar;
pub mod grid;

pub use button_bar::{ButtonBar, ButtonBarOptions};
pub use fill_bar::{FillBar, FillBarOptions};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Left,
    Middle,
    Right,
    Bottom,
}

/// Where a widget sits along one axis: a fixed coordinate or an edge of the
/// container.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Anchor {
    Value(f64),
    Edge(Edge),
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Edge(Edge::Top)
    }
}

pub fn resolve_position(anchor: Anchor, size: f64, container: f64, offset: f64) -> f64 {
    let position = match anchor {
        Anchor::Value(value) => value,
        Anchor::Edge(Edge::Top | Edge::Left) => offset,
        Anchor::Edge(Edge::Middle) => (container - size) / 2.0 + offset,
        Anchor::Edge(Edge::Right | Edge::Bottom) => container - size - offset,
    };
    position.trunc()
}

/// Anchors plus the last resolved screen rect of a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    x: Anchor,
    y: Anchor,
    offset: Point,
    size: Size,
    position: Point,
}

impl Placement {
    pub fn new(x: Anchor, y: Anchor, offset: Point, size: Size) -> Self {
        Placement {
            x,
            y,
            offset,
            size,
            position: Point::default(),
        }
    }

    pub fn normalized_x(&self, container: Size) -> f64 {
        resolve_position(self.x, self.size.width, container.width, self.offset.x)
    }

    pub fn normalized_y(&self, container: Size) -> f64 {
        resolve_position(self.y, self.size.height, container.height, self.offset.y)
    }

    /// Re-anchor inside `container`, shifted by `offset`.
    pub fn reposition(&mut self, offset: Point, container: Size) {
        self.position =
            Point::new(self.normalized_x(container), self.normalized_y(container)).offset(offset);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}

pub trait Widget: Tick {
    fn render(&self, renderer: &Renderer);
    fn reposition(&mut self, offset: Point, container: Size);
    /// Returns true when the event landed on this widget.
    fn handle_pointer(&mut self, _event: &PointerEvent) -> bool {
        false
    }
    /// Whether the last tick changed anything worth redrawing.
    fn is_dirty(&self) -> bool {
        true
    }
}

/// Widget configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetOptions {
    ButtonBar(ButtonBarOptions),
    FillBar(FillBarOptions),
}

impl WidgetOptions {
    pub fn type_name(&self) -> &'static str {
        match self {
            WidgetOptions::ButtonBar(_) => "ButtonBar",
            WidgetOptions::FillBar(_) => "FillBar",
        }
    }

    /// Sprite sheets that must be registered before this widget can be built.
    pub fn required_sheets(&self) -> Vec<&str> {
        match self {
            WidgetOptions::ButtonBar(options) => vec![options.sprite_sheet.as_str()],
            WidgetOptions::FillBar(_) => Vec::new(),
        }
    }
}

/// Services a widget needs to be built.
pub struct WidgetContext<'a> {
    pub assets: &'a AssetRegistry,
    pub clock: Rc<dyn Clock>,
}

/// A built widget and its place on the ticker.
pub struct Mounted {
    pub widget: Rc<RefCell<dyn Widget>>,
    pub listener: ListenerId,
}

pub fn build_widget(
    options: WidgetOptions,
    context: &WidgetContext,
    ticker: &mut Ticker,
) -> Result<Mounted> {
    log::debug!("building {}", options.type_name());
    match options {
        WidgetOptions::ButtonBar(options) => {
            let sheet = context
                .assets
                .sheet(&options.sprite_sheet)
                .ok_or_else(|| anyhow!("ButtonBar: sprite sheet '{}' is undefined", options.sprite_sheet))?;
            Ok(mount(ButtonBar::new(options, sheet, context.clock.clone()), ticker))
        }
        WidgetOptions::FillBar(options) => Ok(mount(FillBar::new(options, context.clock.clone()), ticker)),
    }
}

fn mount<W: Widget + 'static>(widget: W, ticker: &mut Ticker) -> Mounted {
    let widget = Rc::new(RefCell::new(widget));
    let listener = ticker.add_listener(&widget);
    Mounted { widget, listener }
}

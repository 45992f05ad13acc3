use crate::engine::input::{PointerEvent, PointerKind};
use crate::engine::{Point, Rect, Renderer, Size, Ticker};
use crate::widget::{build_widget, Mounted, WidgetContext, WidgetOptions};
use anyhow::{Context, Result};
use std::cell::Cell;

/// Where the canvas goes inside the viewport, in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasLayout {
    pub left: f64,
    pub top: f64,
    pub size: Size,
}

/// Largest `aspect_ratio` canvas that fits `viewport_ratio` of the
/// viewport, centered.
pub fn fit_canvas(viewport: Size, aspect_ratio: f64, viewport_ratio: f64) -> CanvasLayout {
    let size = if viewport.width / viewport.height <= aspect_ratio {
        let width = viewport.width * viewport_ratio;
        Size::new(width, width / aspect_ratio)
    } else {
        let height = viewport.height * viewport_ratio;
        Size::new(height * aspect_ratio, height)
    };
    CanvasLayout {
        left: ((viewport.width - size.width) / 2.0).round(),
        top: ((viewport.height - size.height) / 2.0).round(),
        size,
    }
}

/// The canvas and everything drawn on it.
pub struct Stage {
    aspect_ratio: f64,
    viewport_ratio: f64,
    size: Size,
    widgets: Vec<Mounted>,
    ticker: Ticker,
    needs_draw: Cell<bool>,
}

impl Stage {
    pub fn new(aspect_ratio: f64, viewport_ratio: f64) -> Self {
        Stage {
            aspect_ratio,
            viewport_ratio,
            size: Size::default(),
            widgets: Vec::new(),
            ticker: Ticker::new(),
            needs_draw: Cell::new(true),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Whether the next `draw` repaints the canvas.
    pub fn needs_draw(&self) -> bool {
        self.needs_draw.get()
    }

    /// Build a widget, put it on the ticker and place it. Returns its index.
    pub fn add_widget(&mut self, options: WidgetOptions, context: &WidgetContext) -> Result<usize> {
        let type_name = options.type_name();
        let mounted = build_widget(options, context, &mut self.ticker)
            .with_context(|| format!("Could not build {} #{}", type_name, self.widgets.len()))?;
        mounted.widget.borrow_mut().reposition(Point::default(), self.size);
        self.widgets.push(mounted);
        self.needs_draw.set(true);
        Ok(self.widgets.len() - 1)
    }

    /// Add every widget whose sprite sheets are registered. The others are
    /// logged and skipped. Returns how many were added.
    pub fn add_widgets(
        &mut self,
        widgets: impl IntoIterator<Item = WidgetOptions>,
        context: &WidgetContext,
    ) -> Result<usize> {
        let mut added = 0;
        for (position, options) in widgets.into_iter().enumerate() {
            if !context.assets.check_exists(&options.required_sheets(), false) {
                log::warn!("skipping {} #{}", options.type_name(), position);
                continue;
            }
            self.add_widget(options, context)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn remove_widget(&mut self, index: usize) -> bool {
        if index >= self.widgets.len() {
            return false;
        }
        let mounted = self.widgets.remove(index);
        self.needs_draw.set(true);
        self.ticker.remove_listener(mounted.listener)
    }

    /// Refit the canvas to `viewport` and move every widget along.
    pub fn resize(&mut self, viewport: Size) -> CanvasLayout {
        let layout = fit_canvas(viewport, self.aspect_ratio, self.viewport_ratio);
        self.size = layout.size;
        self.reposition_widgets();
        self.needs_draw.set(true);
        log::debug!("stage resized to {}x{}", layout.size.width, layout.size.height);
        layout
    }

    pub fn reposition_widgets(&mut self) {
        for mounted in &self.widgets {
            mounted.widget.borrow_mut().reposition(Point::default(), self.size);
        }
    }

    pub fn update(&mut self) {
        self.ticker.tick();
        if self.widgets.iter().any(|mounted| mounted.widget.borrow().is_dirty()) {
            self.needs_draw.set(true);
        }
    }

    /// Moves reach every widget so hovers can end. Anything else stops at
    /// the topmost widget it hits.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let mut handled = false;
        for mounted in self.widgets.iter().rev() {
            handled |= mounted.widget.borrow_mut().handle_pointer(event);
            if handled && event.kind != PointerKind::Move {
                break;
            }
        }
        if handled {
            self.needs_draw.set(true);
        }
        handled
    }

    /// Repaint, unless nothing changed since the last repaint.
    pub fn draw(&self, renderer: &Renderer) {
        if !self.needs_draw.replace(false) {
            return;
        }
        renderer.clear(&Rect::new(Point::default(), self.size));
        for mounted in &self.widgets {
            mounted.widget.borrow().render(renderer);
        }
    }
}

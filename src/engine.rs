use crate::browser;
use anyhow::{anyhow, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - because we control the closure creation and specify the expected type,
    // in principle this should be generally safe (unsafe) code
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

pub mod clock;
pub mod input;
pub mod ticker;

pub use clock::{Clock, ManualClock, PerformanceClock};
pub use ticker::{ListenerId, Tick, Ticker};

/// Anything the loop can drive: a UI that loads itself, then updates and
/// draws once per frame.
#[async_trait(?Send)]
pub trait Interface {
    async fn initialize(&self) -> Result<Box<dyn Interface>>;
    fn update(&mut self);
    fn draw(&self, renderer: &Renderer);
}

// ==================== Geometry ====================
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn offset(self, by: Point) -> Point {
        Point {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x() + self.width() * 0.5,
            y: self.y() + self.height() * 0.5,
        }
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring rect.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x()
            && point.y >= self.y()
            && point.x < self.x() + self.width()
            && point.y < self.y() + self.height()
    }

    pub fn inset(&self, by: f64) -> Rect {
        Rect {
            position: Point::new(self.x() + by, self.y() + by),
            size: Size::new(
                (self.width() - by * 2.0).max(0.0),
                (self.height() - by * 2.0).max(0.0),
            ),
        }
    }
}

// ==================== Loop ====================
// default length of a frame in milliseconds
const FRAME_SIZE: f64 = 1.0 / 60.0 * 1000.0;

pub struct UiLoop {
    last_frame: f64,
    accumulated_delta: f64,
    frame_size: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl UiLoop {
    /// Initialize `ui`, then update it at `fps` and draw it on every
    /// animation frame into the canvas with id `canvas_id`.
    pub async fn start(ui: impl Interface + 'static, canvas_id: &str, fps: f64) -> Result<()> {
        let mut ui = ui.initialize().await?;
        let mut ui_loop = UiLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
            frame_size: if fps > 0.0 { 1000.0 / fps } else { FRAME_SIZE },
        };
        let renderer = Renderer {
            context: browser::context(&browser::canvas(canvas_id)?)?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            ui_loop.accumulated_delta += perf - ui_loop.last_frame;
            while ui_loop.accumulated_delta > ui_loop.frame_size {
                ui.update();
                ui_loop.accumulated_delta -= ui_loop.frame_size;
            }
            ui_loop.last_frame = perf;
            ui.draw(&renderer);
            if let Some(next) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next) {
                    log::error!("UiLoop: could not schedule frame : {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("UiLoop: Loop is None"))?,
        )?;

        log::debug!("ui loop started at {} fps", fps);
        Ok(())
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }

    pub fn clear(&self, rect: &Rect) {
        self.context
            .clear_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x(),
                frame.y(),
                frame.width(),
                frame.height(),
                destination.x(),
                destination.y(),
                destination.width(),
                destination.height(),
            )
        {
            log::warn!("draw_image failed : {:#?}", err);
        }
    }

    /// Run `draw` with the global alpha temporarily set to `alpha`.
    pub fn with_alpha(&self, alpha: f64, draw: impl FnOnce(&Renderer)) {
        self.context.save();
        self.context.set_global_alpha(alpha);
        draw(self);
        self.context.restore();
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context
            .fill_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    pub fn stroke_rect(&self, rect: &Rect, color: &str, line_width: f64) {
        self.context.set_stroke_style_str(color);
        self.context.set_line_width(line_width);
        self.context
            .stroke_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    pub fn fill_rounded_rect(&self, rect: &Rect, radius: f64, color: &str) {
        let radius = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
        let (x, y, w, h) = (rect.x(), rect.y(), rect.width(), rect.height());
        let context = &self.context;
        context.set_fill_style_str(color);
        context.begin_path();
        context.move_to(x + radius, y);
        // arc_to only fails on a negative radius, which is clamped above
        let _ = context.arc_to(x + w, y, x + w, y + h, radius);
        let _ = context.arc_to(x + w, y + h, x, y + h, radius);
        let _ = context.arc_to(x, y + h, x, y, radius);
        let _ = context.arc_to(x, y, x + w, y, radius);
        context.close_path();
        context.fill();
    }

    /// Fill a pie slice, angles in degrees clockwise from 12 o'clock.
    pub fn fill_wedge(&self, center: Point, radius: f64, from_deg: f64, to_deg: f64, color: &str) {
        if to_deg <= from_deg {
            return;
        }
        let start = (from_deg - 90.0) * PI / 180.0;
        let end = (to_deg - 90.0) * PI / 180.0;
        let context = &self.context;
        context.set_fill_style_str(color);
        context.begin_path();
        context.move_to(center.x, center.y);
        if let Err(err) = context.arc(center.x, center.y, radius, start, end) {
            log::warn!("fill_wedge failed : {:#?}", err);
            return;
        }
        context.close_path();
        context.fill();
    }

    pub fn fill_text(&self, text: &str, center: Point, font: &str, color: &str) {
        let context = &self.context;
        context.set_font(font);
        context.set_text_align("center");
        context.set_text_baseline("middle");
        context.set_fill_style_str(color);
        if let Err(err) = context.fill_text(text, center.x, center.y) {
            log::warn!("fill_text failed : {:#?}", err);
        }
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - double unwrap because Result<Result<(), Error>, oneshot::Canceled>
    rx.await??;

    Ok(image)
}

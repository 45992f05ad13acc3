use crate::assets::AssetRegistry;
use crate::browser;
use crate::config::UiOptions;
use crate::engine::input::{self, UiInput};
use crate::engine::{self, Clock, Interface, PerformanceClock, Renderer, Size};
use crate::sprite::{SpriteSheet, SpriteSheetOptions};
use crate::stage::Stage;
use crate::widget::WidgetContext;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::channel::mpsc::UnboundedReceiver;
use futures::future::try_join_all;
use std::rc::Rc;
use web_sys::HtmlCanvasElement;

/// TABLE
/// ┌──────────────────────── Frame Flow ──────────────────────────────┐
/// │  UiLoop  ──update──►  GolemUi::Loaded                            │
/// │                        ├─► drain input: pointer → Stage, resize  │
/// │                        └─► Stage::update → Ticker → widgets      │
/// │  UiLoop  ──draw────►  Stage::draw → clear + render each widget   │
/// └──────────────────────────────────────────────────────────────────┘
pub enum GolemUi {
    /// Options read, sprite sheets not loaded yet
    Loading(UiOptions),

    /// Stage built and listening to input
    Loaded(Golem),
}

pub struct Golem {
    stage: Stage,
    canvas: HtmlCanvasElement,
    input: UnboundedReceiver<UiInput>,
}

impl GolemUi {
    pub fn new(options: UiOptions) -> Self {
        GolemUi::Loading(options)
    }

    async fn load_sheet(name: &str, options: &SpriteSheetOptions) -> Result<(String, SpriteSheet)> {
        let image = engine::load_image(&options.image).await.with_context(|| {
            format!("Failed to load sprite sheet '{}' from : {}", name, options.image)
        })?;
        let image_size = Size::new(image.natural_width().into(), image.natural_height().into());
        let sheet = SpriteSheet::from_options(options, image_size).with_image(image);
        log::debug!("sprite sheet '{}' has {} frames", name, sheet.len());
        Ok((name.to_owned(), sheet))
    }
}

#[async_trait(?Send)]
impl Interface for GolemUi {
    async fn initialize(&self) -> Result<Box<dyn Interface>> {
        match self {
            GolemUi::Loading(options) => {
                let canvas = browser::canvas(&options.canvas_id)?;
                browser::prepare_canvas(&canvas);

                // every sheet loads at once, the slowest one sets the pace
                let sheets = try_join_all(
                    options
                        .sprite_sheets
                        .iter()
                        .map(|(name, sheet)| Self::load_sheet(name, sheet)),
                )
                .await?;
                let mut assets = AssetRegistry::new();
                for (name, sheet) in sheets {
                    assets.insert(name, sheet);
                }

                let clock: Rc<dyn Clock> = Rc::new(PerformanceClock::new()?);
                let context = WidgetContext {
                    assets: &assets,
                    clock,
                };

                let mut stage = Stage::new(options.aspect_ratio, options.viewport_ratio);
                let layout = stage.resize(browser::viewport_size()?);
                browser::apply_canvas_layout(&canvas, &layout)?;
                let total = options.widgets.len();
                let added = stage.add_widgets(options.widgets.iter().cloned(), &context)?;
                if added < total {
                    log::warn!("{} of {} widgets were skipped", total - added, total);
                }

                let input = input::prepare_input(&canvas)?;
                log::info!("golem ui loaded with {} widgets", stage.len());
                Ok(Box::new(GolemUi::Loaded(Golem {
                    stage,
                    canvas,
                    input,
                })))
            }
            GolemUi::Loaded(_) => Err(anyhow!("Ui is already initialized")),
        }
    }

    fn update(&mut self) {
        if let GolemUi::Loaded(golem) = self {
            for pending in input::drain(&mut golem.input) {
                match pending {
                    UiInput::Pointer(event) => {
                        golem.stage.handle_pointer(&event);
                    }
                    UiInput::Resize => {
                        if let Err(err) = golem.resize() {
                            log::error!("Could not resize stage : {:#}", err);
                        }
                    }
                }
            }
            golem.stage.update();
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let GolemUi::Loaded(golem) = self {
            golem.stage.draw(renderer);
        }
    }
}

impl Golem {
    fn resize(&mut self) -> Result<()> {
        let layout = self.stage.resize(browser::viewport_size()?);
        browser::apply_canvas_layout(&self.canvas, &layout)
    }
}

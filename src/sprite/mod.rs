// TABLE:
// ┌───────────────────────────────────────────────────────────────────────┐
// │                    Sprite sheet → button frames                       │
// ├──────────────────────┬────────────────────────────────────────────────┤
// │ SpriteSheetOptions   │ what golem.json says: image path + frames      │
// │ FrameLayout::Grid    │ fixed cell size, frames cut row by row         │
// │ FrameLayout::List    │ explicit {x, y, w, h} per frame                │
// │ SpriteSheet          │ loaded frames (+ image), looked up by index    │
// │ Sprite               │ one lookup result: image + source rect         │
// └──────────────────────┴────────────────────────────────────────────────┘
use crate::engine::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use web_sys::HtmlImageElement;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct SheetRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl From<SheetRect> for Rect {
    fn from(rect: SheetRect) -> Self {
        Rect::new(Point::new(rect.x, rect.y), Size::new(rect.w, rect.h))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FrameLayout {
    Grid {
        width: f64,
        height: f64,
        #[serde(default)]
        count: Option<usize>,
    },
    List(Vec<SheetRect>),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSheetOptions {
    pub image: String,
    pub frames: FrameLayout,
}

/// Result of a frame lookup.
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    pub image: Option<&'a HtmlImageElement>,
    pub rect: SheetRect,
}

#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    frames: Vec<SheetRect>,
    frame_size: Size,
    image: Option<HtmlImageElement>,
}

impl SpriteSheet {
    /// Frame size is taken from the first frame.
    pub fn new(frames: Vec<SheetRect>) -> Self {
        let frame_size = frames
            .first()
            .map(|frame| Size::new(frame.w, frame.h))
            .unwrap_or_default();
        SpriteSheet {
            frames,
            frame_size,
            image: None,
        }
    }

    /// Cut `image_size` into `frame` sized cells, left to right then top to
    /// bottom, stopping after `count` frames when given.
    pub fn from_grid(frame: Size, image_size: Size, count: Option<usize>) -> Self {
        let mut frames = Vec::new();
        if frame.width > 0.0 && frame.height > 0.0 {
            let columns = (image_size.width / frame.width).floor() as usize;
            let rows = (image_size.height / frame.height).floor() as usize;
            let limit = count.unwrap_or(columns * rows).min(columns * rows);
            frames = (0..limit)
                .map(|i| SheetRect {
                    x: (i % columns) as f64 * frame.width,
                    y: (i / columns) as f64 * frame.height,
                    w: frame.width,
                    h: frame.height,
                })
                .collect();
        } else {
            log::warn!("sprite sheet frame size must be positive, got {:?}", frame);
        }
        SpriteSheet {
            frames,
            frame_size: frame,
            image: None,
        }
    }

    pub fn from_options(options: &SpriteSheetOptions, image_size: Size) -> Self {
        match &options.frames {
            FrameLayout::Grid {
                width,
                height,
                count,
            } => Self::from_grid(Size::new(*width, *height), image_size, *count),
            FrameLayout::List(frames) => Self::new(frames.clone()),
        }
    }

    pub fn with_image(mut self, image: HtmlImageElement) -> Self {
        self.image = Some(image);
        self
    }

    pub fn frame(&self, index: usize) -> Option<Sprite<'_>> {
        self.frames.get(index).map(|rect| Sprite {
            image: self.image.as_ref(),
            rect: *rect,
        })
    }

    pub fn frame_size(&self) -> Size {
        self.frame_size
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

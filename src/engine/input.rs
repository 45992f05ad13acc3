use crate::browser;
use crate::engine::Point;
use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent};

/// Canvas level pointer actions. Widgets turn `Move` into their own
/// over/out notifications.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerKind {
    Click,
    DoubleClick,
    Down,
    Up,
    Move,
}

impl PointerKind {
    pub const ALL: [PointerKind; 5] = [
        PointerKind::Click,
        PointerKind::DoubleClick,
        PointerKind::Down,
        PointerKind::Up,
        PointerKind::Move,
    ];

    /// DOM event type this kind is read from.
    pub fn dom_event(self) -> &'static str {
        match self {
            PointerKind::Click => "click",
            PointerKind::DoubleClick => "dblclick",
            PointerKind::Down => "mousedown",
            PointerKind::Up => "mouseup",
            PointerKind::Move => "mousemove",
        }
    }
}

/// `position` is in canvas pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        PointerEvent {
            kind,
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UiInput {
    Pointer(PointerEvent),
    Resize,
}

/// Forward canvas mouse events and window resizes into a channel the
/// update step drains once per frame.
pub fn prepare_input(canvas: &HtmlCanvasElement) -> Result<UnboundedReceiver<UiInput>> {
    let (sender, receiver) = unbounded();

    for kind in PointerKind::ALL {
        listen_pointer(canvas, kind, sender.clone())?;
    }

    let resize_sender = sender;
    let on_resize = browser::closure_wrap(Box::new(move |_: web_sys::Event| {
        let _ = resize_sender.unbounded_send(UiInput::Resize);
    }) as Box<dyn FnMut(web_sys::Event)>);
    browser::window()?
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen to resize : {:#?}", err))?;
    on_resize.forget();

    Ok(receiver)
}

fn listen_pointer(
    canvas: &HtmlCanvasElement,
    kind: PointerKind,
    sender: UnboundedSender<UiInput>,
) -> Result<()> {
    let callback = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        let pointer = PointerEvent::new(kind, event.offset_x().into(), event.offset_y().into());
        let _ = sender.unbounded_send(UiInput::Pointer(pointer));
    }) as Box<dyn FnMut(MouseEvent)>);

    canvas
        .add_event_listener_with_callback(kind.dom_event(), callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen to {} : {:#?}", kind.dom_event(), err))?;
    // the canvas lives as long as the page, so does the listener
    callback.forget();
    Ok(())
}

/// Everything queued since the last frame, oldest first.
pub fn drain(receiver: &mut UnboundedReceiver<UiInput>) -> Vec<UiInput> {
    let mut pending = Vec::new();
    while let Ok(Some(input)) = receiver.try_next() {
        pending.push(input);
    }
    pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_queued_inputs_in_order() {
        let (sender, mut receiver) = unbounded();
        sender
            .unbounded_send(UiInput::Pointer(PointerEvent::new(PointerKind::Down, 1.0, 2.0)))
            .unwrap();
        sender.unbounded_send(UiInput::Resize).unwrap();

        let pending = drain(&mut receiver);

        assert_eq!(
            pending,
            vec![
                UiInput::Pointer(PointerEvent::new(PointerKind::Down, 1.0, 2.0)),
                UiInput::Resize
            ]
        );
        assert!(drain(&mut receiver).is_empty());
    }
}

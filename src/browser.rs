use crate::engine::Size;
use crate::stage::CanvasLayout;
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure, WasmClosureFnOnce};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlImageElement,
    Performance,
    Response,
};

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CONTEXT_2D: &str = "2d";
    pub const STAGE_CLASS: &str = "golem-stage";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn new_image() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

pub fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - map error(JsValue) to Error (anyhow)
        // - map the None case to an Error as well
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

/// Canvas with the given id, or a new one appended to the body.
pub fn canvas(id: &str) -> Result<HtmlCanvasElement> {
    let document = document()?;
    match document.get_element_by_id(id) {
        Some(element) => element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element)),
        None => create_canvas(&document, id),
    }
}

fn create_canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement> {
    let canvas = document
        .create_element("canvas")
        .map_err(|err| anyhow!("Could not create canvas : {:#?}", err))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))?;
    canvas.set_id(id);
    document
        .body()
        .ok_or_else(|| anyhow!("No body found"))?
        .append_child(&canvas)
        .map_err(|err| anyhow!("Could not append canvas : {:#?}", err))?;
    log::debug!("created canvas #{}", id);
    Ok(canvas)
}

/// Tag the canvas as the UI stage.
pub fn prepare_canvas(canvas: &HtmlCanvasElement) {
    let classes = canvas.class_name();
    if !classes.split_whitespace().any(|class| class == html::STAGE_CLASS) {
        canvas.set_class_name(format!("{} {}", classes, html::STAGE_CLASS).trim());
    }
}

/// Pin the canvas at the layout's offset and give it the layout's size.
pub fn apply_canvas_layout(canvas: &HtmlCanvasElement, layout: &CanvasLayout) -> Result<()> {
    let style = canvas.style();
    let px = |value: f64| format!("{}px", value);
    style
        .set_property("position", "fixed")
        .and_then(|_| style.set_property("left", &px(layout.left)))
        .and_then(|_| style.set_property("top", &px(layout.top)))
        .map_err(|err| anyhow!("Could not style canvas : {:#?}", err))?;
    canvas.set_width(layout.size.width as u32);
    canvas.set_height(layout.size.height as u32);
    Ok(())
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn viewport_size() -> Result<Size> {
    let window = window()?;
    let read = |value: std::result::Result<JsValue, JsValue>, name: &str| {
        value
            .map_err(|err| anyhow!("Could not read {} : {:#?}", name, err))?
            .as_f64()
            .ok_or_else(|| anyhow!("{} is not a number", name))
    };
    Ok(Size {
        width: read(window.inner_width(), "innerWidth")?,
        height: read(window.inner_height(), "innerHeight")?,
    })
}

pub fn performance() -> Result<Performance> {
    window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))
}

pub fn now() -> Result<f64> {
    Ok(performance()?.now())
}

pub fn closure_once<T, F, A, R>(f: F) -> Closure<T>
where
    T: WasmClosure + ?Sized,
    F: 'static + WasmClosureFnOnce<T, A, R> + wasm_bindgen::__rt::marker::MaybeUnwindSafe,
{
    Closure::once(f)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f))
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame {:#?}", err))
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}

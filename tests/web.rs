//! Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use golem_ui::browser;
use golem_ui::config::UiOptions;
use golem_ui::engine::input::{self, PointerKind, UiInput};
use golem_ui::engine::{Clock, PerformanceClock, Renderer, Size};
use golem_ui::stage::Stage;
use golem_ui::widget::{FillBarOptions, WidgetContext, WidgetOptions};
use golem_ui::{assets::AssetRegistry, widget::Widget};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn performance_clock_moves_forward() {
    let clock = PerformanceClock::new().unwrap();
    let first = clock.now();
    let second = clock.now();
    assert!(second >= first);
}

#[wasm_bindgen_test]
fn canvas_is_created_and_laid_out() {
    let canvas = browser::canvas("golem-test-layout").unwrap();
    browser::prepare_canvas(&canvas);
    browser::prepare_canvas(&canvas);
    assert_eq!(canvas.class_name(), "golem-stage");

    let mut stage = Stage::new(8.0 / 6.0, 0.98);
    let layout = stage.resize(Size::new(1000.0, 500.0));
    browser::apply_canvas_layout(&canvas, &layout).unwrap();
    assert_eq!(canvas.height(), 490);
    assert_eq!(canvas.style().get_property_value("left").unwrap(), "173px");
}

#[wasm_bindgen_test]
fn stage_draws_widgets() {
    let canvas = browser::canvas("golem-test-draw").unwrap();
    let renderer = Renderer::new(browser::context(&canvas).unwrap());
    let assets = AssetRegistry::new();
    let context = WidgetContext {
        assets: &assets,
        clock: Rc::new(PerformanceClock::new().unwrap()),
    };

    let mut stage = Stage::new(8.0 / 6.0, 0.98);
    stage.resize(Size::new(800.0, 600.0));
    stage
        .add_widget(
            WidgetOptions::FillBar(FillBarOptions {
                value: 50.0,
                ..FillBarOptions::default()
            }),
            &context,
        )
        .unwrap();
    stage.update();
    stage.draw(&renderer);

    let fill = golem_ui::widget::FillBar::new(FillBarOptions::default(), context.clock.clone());
    fill.render(&renderer);
}

#[wasm_bindgen_test]
fn canvas_clicks_reach_the_input_channel() {
    let canvas = browser::canvas("golem-test-input").unwrap();
    let mut receiver = input::prepare_input(&canvas).unwrap();

    let click = web_sys::MouseEvent::new("click").unwrap();
    canvas
        .unchecked_ref::<web_sys::EventTarget>()
        .dispatch_event(&click)
        .unwrap();

    let pending = input::drain(&mut receiver);
    assert!(matches!(
        pending.as_slice(),
        [UiInput::Pointer(event)] if event.kind == PointerKind::Click
    ));
}

#[wasm_bindgen_test]
fn options_deserialize_from_js_values() {
    let value = js_sys::JSON::parse(
        r#"{
            "spriteSheets": { "skills": { "image": "s.png", "frames": { "width": 50, "height": 50 } } },
            "widgets": [ { "type": "ButtonBar", "spriteSheet": "skills", "rows": 2, "x": 10 } ]
        }"#,
    )
    .unwrap();
    let options: UiOptions = serde_wasm_bindgen::from_value(value).unwrap();
    options.validate().unwrap();
    let WidgetOptions::ButtonBar(bar) = &options.widgets[0] else {
        panic!("expected a ButtonBar");
    };
    assert_eq!(bar.rows, 2);
}

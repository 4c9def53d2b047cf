#![cfg(target_arch = "wasm32")]
use sonar_core::{ControllerConfig, NearestObject, SimulationController};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod audio;
mod dom;
mod frame;
mod input;
mod markers;

use audio::{BrowserHaptics, WebAudioDevice};

pub(crate) type Controller = SimulationController<WebAudioDevice, BrowserHaptics>;
pub(crate) type Shared = Rc<RefCell<Controller>>;

thread_local! {
    static CONTROLLER: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sonar-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

/// Host page needs `#sound-field` (positioned container for the markers) and
/// the `#add-source` / `#remove-source` buttons.
fn init() -> anyhow::Result<()> {
    let document = dom::document()?;
    let field: web::HtmlElement = document
        .get_element_by_id("sound-field")
        .ok_or_else(|| anyhow::anyhow!("missing #sound-field"))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let config = ControllerConfig::from_query(&dom::location_search());
    log::info!(
        "[config] mode={:?} volume_max={:.2} tempo={:.1}-{:.1}Hz",
        config.source_mode,
        config.sonification.volume_max,
        config.sonification.tempo_min,
        config.sonification.tempo_max
    );
    let device = WebAudioDevice::new()?;
    let shared: Shared = Rc::new(RefCell::new(SimulationController::with_haptics(
        device,
        BrowserHaptics,
        config,
    )));

    // The context may come up suspended; the first pointerdown resumes it.
    if let Err(e) = shared.borrow_mut().start_audio() {
        log::error!("[audio] {}", e);
    }

    {
        let shared = shared.clone();
        dom::on_button(&document, "add-source", move || {
            let mut c = shared.borrow_mut();
            c.device().resume();
            c.add_source();
        });
    }
    {
        let shared = shared.clone();
        dom::on_button(&document, "remove-source", move || {
            shared.borrow_mut().remove_last_source();
        });
    }

    input::install_drag(&field, shared.clone());
    frame::run_loop(frame::FrameContext {
        shared: shared.clone(),
        markers: markers::MarkerLayer::new(document, field),
    });

    CONTROLLER.with(|c| *c.borrow_mut() = Some(shared));
    Ok(())
}

fn with_controller(f: impl FnOnce(&mut Controller)) {
    CONTROLLER.with(|c| {
        if let Some(shared) = c.borrow().as_ref() {
            f(&mut shared.borrow_mut());
        } else {
            log::warn!("[api] controller not ready");
        }
    });
}

/// Feed the nearest detected object. `x` and `y` are normalized field
/// coordinates; `kind` is an optional detector label such as "person".
#[wasm_bindgen]
pub fn set_nearest_object(distance: f32, x: f32, y: f32, kind: Option<String>) {
    let mut object = NearestObject::new(distance, glam::Vec2::new(x, y));
    if let Some(kind) = kind {
        object = object.with_kind(kind);
    }
    with_controller(|c| c.set_nearest_object(Some(object)));
}

#[wasm_bindgen]
pub fn clear_nearest_object() {
    with_controller(|c| c.set_nearest_object(None));
}

#[wasm_bindgen]
pub fn shutdown() {
    with_controller(|c| c.shutdown());
}

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn document() -> anyhow::Result<web::Document> {
    web::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow::anyhow!("no document"))
}

/// Attach `handler` to `event` on `target` for the life of the page. Events
/// that are not an `E` are skipped.
pub fn listen<E: JsCast + 'static>(
    target: &web::EventTarget,
    event: &str,
    mut handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(web::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("[dom] {} listener rejected: {:?}", event, e);
    }
    closure.forget();
}

/// Listen on the window, so pointer events keep arriving once the pointer
/// leaves the field mid-drag.
pub fn listen_window<E: JsCast + 'static>(event: &str, handler: impl FnMut(E) + 'static) {
    if let Some(w) = web::window() {
        listen(&w, event, handler);
    }
}

/// Run `action` on clicks of the button `#id`; a missing button is logged.
pub fn on_button(document: &web::Document, id: &str, mut action: impl FnMut() + 'static) {
    match document.get_element_by_id(id) {
        Some(button) => listen(&button, "click", move |_: web::MouseEvent| action()),
        None => log::warn!("[dom] missing #{}", id),
    }
}

#[inline]
pub fn now_ms() -> f64 {
    web::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Query string of the page, including the leading `?`.
pub fn location_search() -> String {
    web::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

use crate::markers::MarkerLayer;
use crate::{dom, Shared};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub shared: Shared,
    pub markers: MarkerLayer,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = dom::now_ms();
        let mut controller = self.shared.borrow_mut();
        controller.tick(now);
        self.markers.sync(controller.state());
    }
}

/// Drive `ctx.frame()` from requestAnimationFrame for the life of the page.
pub fn run_loop(ctx: FrameContext) {
    let ctx = Rc::new(RefCell::new(ctx));
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

use crate::markers::marker_source_id;
use crate::{dom, Shared};
use sonar_core::{DragSession, SurfaceRect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn field_rect(field: &web::HtmlElement) -> SurfaceRect {
    let rect = field.get_bounding_client_rect();
    SurfaceRect {
        left: rect.left() as f32,
        top: rect.top() as f32,
        width: rect.width() as f32,
        height: rect.height() as f32,
    }
}

/// Wire marker dragging. Pointer down is caught on the field; move and up are
/// caught on the window so a drag survives the pointer leaving the field.
pub fn install_drag(field: &web::HtmlElement, shared: Shared) {
    let session: Rc<RefCell<Option<DragSession>>> = Rc::new(RefCell::new(None));

    {
        let session = session.clone();
        let shared = shared.clone();
        dom::listen(field, "pointerdown", move |ev: web::PointerEvent| {
            // Any gesture on the field may be the one the browser needs to
            // unlock audio.
            shared.borrow().device().resume();
            let Some(target) = ev.target().and_then(|t| t.dyn_into::<web::Element>().ok())
            else {
                return;
            };
            let Some(id) = marker_source_id(&target) else {
                return;
            };
            ev.prevent_default();
            *session.borrow_mut() = Some(DragSession::begin(id, ev.pointer_id()));
            shared.borrow_mut().begin_drag(id);
        });
    }

    {
        let session = session.clone();
        let shared = shared.clone();
        let field = field.clone();
        dom::listen_window("pointermove", move |ev: web::PointerEvent| {
            let Some(active) = *session.borrow() else {
                return;
            };
            if !active.owns(ev.pointer_id()) {
                return;
            }
            let uv = sonar_core::surface_uv(
                ev.client_x() as f32,
                ev.client_y() as f32,
                field_rect(&field),
            );
            shared.borrow_mut().dispatch(sonar_core::Action::MoveSource(active.move_to(uv)));
        });
    }

    for event in ["pointerup", "pointercancel"] {
        let session = session.clone();
        let shared = shared.clone();
        dom::listen_window(event, move |ev: web::PointerEvent| {
            let owned = session
                .borrow()
                .is_some_and(|active| active.owns(ev.pointer_id()));
            if owned {
                session.borrow_mut().take();
                shared.borrow_mut().end_drag();
            }
        });
    }

    // Losing focus mid-drag never delivers a pointerup.
    dom::listen_window("blur", move |_: web::Event| {
        if session.borrow_mut().take().is_some() {
            shared.borrow_mut().end_drag();
        }
    });
}

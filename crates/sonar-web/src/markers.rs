use sonar_core::{NearestObject, SimulationState, SoundSource, SourceId};
use wasm_bindgen::JsCast;
use web_sys as web;

const SOURCE_ID_ATTR: &str = "data-source-id";

/// Absolutely positioned DOM markers mirroring the sources on the field.
pub struct MarkerLayer {
    document: web::Document,
    field: web::HtmlElement,
    sources: Vec<(SourceId, web::HtmlElement)>,
    nearest: Option<web::HtmlElement>,
    rendered: Option<SimulationState>,
}

impl MarkerLayer {
    pub fn new(document: web::Document, field: web::HtmlElement) -> Self {
        Self {
            document,
            field,
            sources: Vec::new(),
            nearest: None,
            rendered: None,
        }
    }

    pub fn sync(&mut self, state: &SimulationState) {
        if self.rendered.as_ref() == Some(state) {
            return;
        }
        while self.sources.len() > state.sources.len() {
            if let Some((_, el)) = self.sources.pop() {
                el.remove();
            }
        }
        for (i, source) in state.sources.iter().enumerate() {
            match self.sources.get(i) {
                Some((id, _)) if *id == source.id => {}
                Some(_) => {
                    let (_, stale) = self.sources.remove(i);
                    stale.remove();
                    self.insert_marker(i, source);
                }
                None => self.insert_marker(i, source),
            }
            if let Some((_, el)) = self.sources.get(i) {
                place(el, source.position.x, source.position.y);
            }
        }
        self.sync_nearest(state.nearest_object.as_ref());
        self.rendered = Some(state.clone());
    }

    fn insert_marker(&mut self, index: usize, source: &SoundSource) {
        let Some(el) = self.create_marker("source-marker") else {
            return;
        };
        let _ = el.set_attribute(SOURCE_ID_ATTR, &source.id.0.to_string());
        let _ = el.style().set_property("background-color", source.color);
        self.sources.insert(index, (source.id, el));
    }

    fn sync_nearest(&mut self, object: Option<&NearestObject>) {
        match object {
            Some(obj) => {
                if self.nearest.is_none() {
                    self.nearest = self.create_marker("nearest-marker");
                }
                if let Some(el) = &self.nearest {
                    place(el, obj.position.x, obj.position.y);
                    let label = obj.kind.as_deref().unwrap_or("");
                    el.set_title(&format!("{} {:.2}", label, obj.distance));
                }
            }
            None => {
                if let Some(el) = self.nearest.take() {
                    el.remove();
                }
            }
        }
    }

    fn create_marker(&self, class: &str) -> Option<web::HtmlElement> {
        let el = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<web::HtmlElement>()
            .ok()?;
        el.set_class_name(class);
        self.field.append_child(&el).ok()?;
        Some(el)
    }
}

/// Source id of the marker under an event target, if any.
pub fn marker_source_id(target: &web::Element) -> Option<SourceId> {
    let marker = target.closest(&format!("[{}]", SOURCE_ID_ATTR)).ok()??;
    let raw = marker.get_attribute(SOURCE_ID_ATTR)?;
    raw.parse().ok().map(SourceId)
}

fn place(el: &web::HtmlElement, u: f32, v: f32) {
    let style = el.style();
    let _ = style.set_property("left", &format!("{:.2}%", u * 100.0));
    let _ = style.set_property("top", &format!("{:.2}%", v * 100.0));
}

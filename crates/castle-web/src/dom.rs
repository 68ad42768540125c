use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn add_listener<E: JsCast + 'static>(
    target: &web::EventTarget,
    name: &str,
    mut handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(web::Event)>);
    let callback = closure.as_ref().unchecked_ref();
    if let Err(e) = target.add_event_listener_with_callback(name, callback) {
        log::warn!("could not listen for {name}: {e:?}");
    }
    closure.forget();
}

/// Fires `name` on `window` with an optional string detail.
pub fn dispatch(name: &str, detail: Option<&str>) {
    let Some(w) = web::window() else { return };
    let init = web::CustomEventInit::new();
    init.set_detail(&detail.map(JsValue::from_str).unwrap_or(JsValue::NULL));
    match web::CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(ev) => {
            let _ = w.dispatch_event(&ev);
        }
        Err(e) => log::warn!("could not create {name}: {e:?}"),
    }
}

/// Current scroll fraction of the document.
pub fn scroll_fraction() -> f32 {
    let Some(w) = web::window() else { return 0.0 };
    let Some(root) = window_document().and_then(|d| d.document_element()) else {
        return 0.0;
    };
    let scroll_y = w.scroll_y().unwrap_or(0.0);
    let viewport = w
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    crate::input::scroll_fraction(scroll_y, root.scroll_height() as f64, viewport)
}

pub fn viewport_size() -> (f64, f64) {
    let Some(w) = web::window() else {
        return (0.0, 0.0);
    };
    let get = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (get(w.inner_width()), get(w.inner_height()))
}

//! Small page helpers used by dialogs: Escape to close, scroll lock, focus.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, KeyboardEvent};

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Calls back on every Escape keydown until dropped.
pub struct EscapeKeyListener {
    document: Document,
    handler: Closure<dyn FnMut(KeyboardEvent)>,
}

impl EscapeKeyListener {
    pub fn new(on_escape: impl Fn() + 'static) -> Result<Self, JsValue> {
        let document = document()?;
        let handler = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() == "Escape" {
                on_escape();
            }
        });

        document.add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())?;

        Ok(EscapeKeyListener { document, handler })
    }
}

impl Drop for EscapeKeyListener {
    fn drop(&mut self) {
        let _ = self
            .document
            .remove_event_listener_with_callback("keydown", self.handler.as_ref().unchecked_ref());
    }
}

/// Locks or releases page scrolling behind an open dialog.
pub fn set_body_scroll_locked(locked: bool) -> Result<(), JsValue> {
    let body = document()?
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;
    let overflow = if locked { "hidden" } else { "auto" };

    body.style().set_property("overflow", overflow)
}

/// Missing elements are ignored.
pub fn focus_element(element_id: &str) -> Result<(), JsValue> {
    let element = match document()?.get_element_by_id(element_id) {
        Some(element) => element,
        None => return Ok(()),
    };

    match element.dyn_ref::<HtmlElement>() {
        Some(element) => element.focus(),
        None => Ok(()),
    }
}

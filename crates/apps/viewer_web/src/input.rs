//! Scoped DOM event listeners.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// One listener, removed from its target on drop.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(target: &EventTarget, kind: &'static str, handler: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }

    /// Non-passive, so the handler may call `prevent_default`.
    pub fn active(target: &EventTarget, kind: &'static str, handler: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Document-level `mousemove`/`mouseup` pair held for the length of a drag,
/// so the drag keeps tracking when the pointer leaves the canvas.
pub struct DragListeners {
    _move: Listener,
    _up: Listener,
}

impl DragListeners {
    pub fn attach(
        document: &EventTarget,
        on_move: impl FnMut(Event) + 'static,
        on_up: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        Ok(Self {
            _move: Listener::new(document, "mousemove", on_move)?,
            _up: Listener::new(document, "mouseup", on_up)?,
        })
    }
}

//! Owned `requestAnimationFrame` loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Runs a callback on every display frame until dropped.
///
/// The closure only holds a weak reference to itself, so dropping the handle
/// frees it and the pending frame is cancelled.
pub struct AnimationHandle {
    callback: Rc<RefCell<Option<FrameCallback>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl AnimationHandle {
    pub fn start(mut on_frame: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&callback);
        let next = pending.clone();
        let closure = Closure::<dyn FnMut(f64)>::new(move |_timestamp_ms: f64| {
            next.set(None);
            on_frame();
            let Some(callback) = weak.upgrade() else {
                return;
            };
            if let Some(cb) = callback.borrow().as_ref() {
                next.set(request_frame(cb).ok());
            }
        });
        pending.set(Some(request_frame(&closure)?));
        *callback.borrow_mut() = Some(closure);
        Ok(Self { callback, pending })
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}

//! Browser host for the globe views.
//!
//! Each mounted view is owned by a thread-local registry entry together with
//! its canvas, listeners and animation loop. Unmounting drops the entry,
//! which cancels the loop and detaches every listener.

use console_error_panic_hook::set_once;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::str::FromStr;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, WheelEvent};

use formats::{TravelStatus, parse_destinations, parse_travel_status};
use foundation::bounds::Aabb2;
use foundation::ids::MarkerId;
use foundation::math::Vec2;
use foundation::time::Time;
use layers::{MarkerSet, RegionIndex};
use scene::{
    ClientRect, GlobeView, HoverTarget, PlanetView, SolarSystemView, View, ViewConfig, ViewEvent,
    client_to_surface,
};
use serde::Serialize;
use streaming::{LoadError, LoadToken, load_region_index};
use tracing::{Level, debug, info, warn};

mod animation;
mod canvas2d;
mod fetch;
mod input;
mod logging;

use animation::AnimationHandle;
use canvas2d::WebCanvas;
use fetch::HttpBoundarySource;
use input::{DragListeners, Listener};

enum Mounted {
    Globe(GlobeView),
    Planet(PlanetView),
    Solar(SolarSystemView),
}

impl Mounted {
    fn view(&self) -> &dyn View {
        match self {
            Mounted::Globe(v) => v,
            Mounted::Planet(v) => v,
            Mounted::Solar(v) => v,
        }
    }

    fn view_mut(&mut self) -> &mut dyn View {
        match self {
            Mounted::Globe(v) => v,
            Mounted::Planet(v) => v,
            Mounted::Solar(v) => v,
        }
    }

    fn begin_load(&mut self) -> Option<LoadToken> {
        match self {
            Mounted::Globe(v) => Some(v.begin_load()),
            Mounted::Planet(v) => v.begin_load(),
            Mounted::Solar(v) => Some(v.begin_load()),
        }
    }

    fn finish_load(&mut self, token: LoadToken, result: Result<RegionIndex, LoadError>) -> bool {
        match self {
            Mounted::Globe(v) => v.finish_load(token, result),
            Mounted::Planet(v) => v.finish_load(token, result),
            Mounted::Solar(v) => v.finish_load(token, result),
        }
    }

    fn globe_mut(&mut self) -> Result<&mut GlobeView, JsValue> {
        match self {
            Mounted::Globe(v) => Ok(v),
            _ => Err(JsValue::from_str("not a globe view")),
        }
    }
}

// Field order is drop order: listeners go before the view they feed.
struct Mount {
    listeners: Vec<Listener>,
    drag: Option<DragListeners>,
    animation: Option<AnimationHandle>,
    on_event: Option<js_sys::Function>,
    source: Option<HttpBoundarySource>,
    canvas: HtmlCanvasElement,
    surface: WebCanvas,
    css_size: (f64, f64),
    dpr: f64,
    view: Mounted,
}

impl Mount {
    /// Matches the backing store to the element's CSS size and pixel ratio.
    fn fit(&mut self) {
        let dpr = device_pixel_ratio();
        let css = css_size(&self.canvas);
        if css == self.css_size && dpr == self.dpr {
            return;
        }
        self.css_size = css;
        self.dpr = dpr;
        self.canvas.set_width((css.0 * dpr).round() as u32);
        self.canvas.set_height((css.1 * dpr).round() as u32);
        self.view.view_mut().resize(Aabb2::from_size(css.0, css.1));
        debug!(width = css.0, height = css.1, dpr, "canvas resized");
    }

    fn surface_point(&self, event: &MouseEvent) -> Vec2 {
        let r = self.canvas.get_bounding_client_rect();
        client_to_surface(
            Vec2::new(event.client_x() as f64, event.client_y() as f64),
            ClientRect {
                left: r.left(),
                top: r.top(),
                width: r.width(),
                height: r.height(),
            },
            (self.canvas.width() as f64, self.canvas.height() as f64),
            self.dpr,
        )
    }

    fn apply_cursor(&self) {
        let css = self.view.view().cursor().as_css();
        let _ = self.canvas.style().set_property("cursor", css);
    }
}

thread_local! {
    static MOUNTS: RefCell<BTreeMap<u32, Mount>> = RefCell::new(BTreeMap::new());
    static NEXT_HANDLE: Cell<u32> = const { Cell::new(1) };
}

/// Runs `f` on a mounted view. Returns `None` when the handle is gone or the
/// registry is already borrowed (a re-entrant call from a JS callback).
fn with_mount<R>(handle: u32, f: impl FnOnce(&mut Mount) -> R) -> Option<R> {
    MOUNTS
        .try_with(|mounts| {
            let mut mounts = mounts.try_borrow_mut().ok()?;
            let mount = mounts.get_mut(&handle)?;
            Some(f(mount))
        })
        .ok()
        .flatten()
}

fn now() -> Time {
    Time::from_millis(js_sys::Date::now())
}

fn device_pixel_ratio() -> f64 {
    web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
}

fn css_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
    (canvas.client_width() as f64, canvas.client_height() as f64)
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[derive(Serialize)]
struct EventPayload<'a> {
    frame: u64,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
}

impl<'a> EventPayload<'a> {
    fn new(frame: u64, kind: &'static str) -> Self {
        Self {
            frame,
            kind,
            target: None,
            id: None,
            name: None,
            detail: None,
            x: None,
            y: None,
        }
    }

    fn with_target(mut self, target: &HoverTarget) -> Self {
        let (kind, id) = match target {
            HoverTarget::None => (None, None),
            HoverTarget::Region { id, .. } => (Some("region"), Some(id.0.to_string())),
            HoverTarget::Marker { id, .. } => (Some("marker"), Some(id.to_string())),
            HoverTarget::Body { id, .. } => (Some("body"), Some(id.to_string())),
        };
        self.target = kind;
        self.id = id;
        self.with_anchor(target.anchor())
    }

    fn with_anchor(mut self, anchor: Option<Vec2>) -> Self {
        self.x = anchor.map(|a| a.x);
        self.y = anchor.map(|a| a.y);
        self
    }
}

fn event_json(frame: u64, event: &ViewEvent) -> Result<String, serde_json::Error> {
    let payload = match event {
        ViewEvent::HoverChanged { target, name, detail } => {
            let mut p = EventPayload::new(frame, "hover").with_target(target);
            p.name = Some(name.as_str());
            p.detail = Some(detail.as_str());
            p
        }
        ViewEvent::HoverMoved { anchor } => EventPayload::new(frame, "move").with_anchor(Some(*anchor)),
        ViewEvent::HoverCleared => EventPayload::new(frame, "clear"),
        ViewEvent::Selected(target) => EventPayload::new(frame, "select").with_target(target),
    };
    serde_json::to_string(&payload)
}

/// Hands drained view events to the JS callback, outside the registry borrow
/// so the callback may call back into this module.
fn flush_events(handle: u32) {
    let Some((callback, events)) = with_mount(handle, |m| (m.on_event.clone(), m.view.view_mut().drain_events()))
    else {
        return;
    };
    let Some(callback) = callback else {
        return;
    };
    for event in events {
        match event_json(event.frame_index, &event.payload) {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    warn!(error = ?e, "view event callback threw");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode view event"),
        }
    }
}

fn on_frame(handle: u32) {
    with_mount(handle, |m| {
        m.fit();
        m.surface.begin_frame(m.dpr);
        m.view.view_mut().frame(now(), &mut m.surface);
    });
    flush_events(handle);
}

fn on_drag_move(handle: u32, event: Event) {
    let Some(event) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    with_mount(handle, |m| {
        let p = m.surface_point(event);
        m.view.view_mut().pointer_move(p);
        m.apply_cursor();
    });
    flush_events(handle);
}

fn on_drag_end(handle: u32) {
    with_mount(handle, |m| {
        m.view.view_mut().pointer_up(now());
        m.drag = None;
        m.apply_cursor();
    });
}

fn on_pointer_down(handle: u32, event: Event) {
    let Some(event) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    with_mount(handle, |m| {
        let p = m.surface_point(event);
        if !m.view.view_mut().pointer_down(p) {
            return;
        }
        event.prevent_default();
        let drag = DragListeners::attach(
            &document,
            move |e| on_drag_move(handle, e),
            move |_| on_drag_end(handle),
        );
        match drag {
            Ok(drag) => m.drag = Some(drag),
            Err(e) => warn!(error = ?e, "failed to attach drag listeners"),
        }
        m.apply_cursor();
    });
}

fn on_pointer_move(handle: u32, event: Event) {
    let Some(event) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let handled = with_mount(handle, |m| {
        // The document listeners own the pointer during a drag.
        if m.drag.is_some() {
            return false;
        }
        let p = m.surface_point(event);
        m.view.view_mut().pointer_move(p);
        m.apply_cursor();
        true
    });
    if handled == Some(true) {
        flush_events(handle);
    }
}

fn on_pointer_leave(handle: u32) {
    with_mount(handle, |m| {
        let view = m.view.view_mut();
        view.pointer_leave(now());
        if !view.is_dragging() {
            m.drag = None;
        }
        m.apply_cursor();
    });
    flush_events(handle);
}

fn on_wheel(handle: u32, event: Event) {
    let Some(event) = event.dyn_ref::<WheelEvent>() else {
        return;
    };
    with_mount(handle, |m| {
        let p = m.surface_point(event);
        if m.view.view_mut().wheel(p, event.delta_y()) {
            event.prevent_default();
        }
    });
}

fn on_click(handle: u32, event: Event, double: bool) {
    let Some(event) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    with_mount(handle, |m| {
        let p = m.surface_point(event);
        let view = m.view.view_mut();
        if double {
            view.double_click(p);
        } else {
            view.click(p);
        }
    });
    flush_events(handle);
}

fn attach_listeners(handle: u32, canvas: &HtmlCanvasElement) -> Result<Vec<Listener>, JsValue> {
    let target: &web_sys::EventTarget = canvas.as_ref();
    Ok(vec![
        Listener::new(target, "mousedown", move |e| on_pointer_down(handle, e))?,
        Listener::new(target, "mousemove", move |e| on_pointer_move(handle, e))?,
        Listener::new(target, "mouseleave", move |_| on_pointer_leave(handle))?,
        Listener::active(target, "wheel", move |e| on_wheel(handle, e))?,
        Listener::new(target, "click", move |e| on_click(handle, e, false))?,
        Listener::new(target, "dblclick", move |e| on_click(handle, e, true))?,
    ])
}

fn canvas_by_id(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))
}

fn mount(
    canvas: HtmlCanvasElement,
    build: impl FnOnce(Aabb2) -> Mounted,
    source: Option<HttpBoundarySource>,
) -> Result<u32, JsValue> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let css = css_size(&canvas);
    let handle = NEXT_HANDLE.with(|n| {
        let h = n.get();
        n.set(h.wrapping_add(1));
        h
    });

    let mut entry = Mount {
        listeners: attach_listeners(handle, &canvas)?,
        drag: None,
        animation: None,
        on_event: None,
        source,
        surface: WebCanvas::new(ctx),
        css_size: (0.0, 0.0),
        dpr: 0.0,
        view: build(Aabb2::from_size(css.0, css.1)),
        canvas,
    };
    entry.fit();
    MOUNTS.with(|m| m.borrow_mut().insert(handle, entry));

    let animation = AnimationHandle::start(move || on_frame(handle))?;
    with_mount(handle, |m| m.animation = Some(animation));
    start_load(handle);
    info!(handle, "view mounted");
    Ok(handle)
}

fn start_load(handle: u32) {
    let Some((Some(token), Some(source))) = with_mount(handle, |m| {
        let source = m.source.clone();
        (source.is_some().then(|| m.view.begin_load()).flatten(), source)
    }) else {
        return;
    };
    spawn_local(async move {
        let result = load_region_index(&source, None).await;
        with_mount(handle, |m| m.view.finish_load(token, result));
        flush_events(handle);
    });
}

fn boundary_source(boundaries_url: Option<String>, names_url: Option<String>) -> Option<HttpBoundarySource> {
    Some(HttpBoundarySource {
        boundaries_url: boundaries_url?,
        names_url: names_url?,
    })
}

#[wasm_bindgen(start)]
pub fn start() {
    set_once();
    logging::init(Level::INFO);
}

/// Raises or lowers console verbosity. Only effective before the first
/// `start`; afterwards the installed subscriber keeps its level.
#[wasm_bindgen]
pub fn init_logging(level: &str) -> Result<(), JsValue> {
    let level = Level::from_str(level).map_err(js_err)?;
    logging::init(level);
    Ok(())
}

/// Mounts the Earth globe. `config_json` overlays the Earth preset.
#[wasm_bindgen]
pub fn mount_globe(
    canvas_id: &str,
    boundaries_url: Option<String>,
    names_url: Option<String>,
    config_json: Option<String>,
) -> Result<u32, JsValue> {
    let canvas = canvas_by_id(canvas_id)?;
    let config = ViewConfig::from_json_or(config_json.as_deref(), ViewConfig::earth());
    mount(
        canvas,
        |viewport| Mounted::Globe(GlobeView::new(config, viewport)),
        boundary_source(boundaries_url, names_url),
    )
}

/// Mounts a single catalogue body. Earth also needs the boundary URLs.
#[wasm_bindgen]
pub fn mount_planet(
    canvas_id: &str,
    body_id: &str,
    boundaries_url: Option<String>,
    names_url: Option<String>,
    config_json: Option<String>,
) -> Result<u32, JsValue> {
    let spec = scene::body(body_id).ok_or_else(|| JsValue::from_str(&format!("unknown body {body_id}")))?;
    let canvas = canvas_by_id(canvas_id)?;
    let config = ViewConfig::from_json_or(config_json.as_deref(), ViewConfig::planet(spec));
    mount(
        canvas,
        |viewport| Mounted::Planet(PlanetView::new(spec, config, viewport)),
        boundary_source(boundaries_url, names_url),
    )
}

#[wasm_bindgen]
pub fn mount_solar_system(
    canvas_id: &str,
    boundaries_url: Option<String>,
    names_url: Option<String>,
    config_json: Option<String>,
) -> Result<u32, JsValue> {
    let canvas = canvas_by_id(canvas_id)?;
    let config = ViewConfig::from_json_or(config_json.as_deref(), ViewConfig::default());
    mount(
        canvas,
        |viewport| Mounted::Solar(SolarSystemView::new(config, viewport)),
        boundary_source(boundaries_url, names_url),
    )
}

/// Tears a view down. Returns `false` for an unknown handle.
#[wasm_bindgen]
pub fn unmount(handle: u32) -> bool {
    let removed = MOUNTS
        .try_with(|m| m.try_borrow_mut().ok().and_then(|mut m| m.remove(&handle)))
        .ok()
        .flatten();
    // Dropped outside the borrow: this cancels the loop and detaches listeners.
    let found = removed.is_some();
    drop(removed);
    if found {
        info!(handle, "view unmounted");
    }
    found
}

/// Restarts the boundary load. A load still in flight becomes stale.
#[wasm_bindgen]
pub fn reload_boundaries(handle: u32) {
    start_load(handle);
}

/// Registers `callback(json)` for hover and selection events.
#[wasm_bindgen]
pub fn on_view_event(handle: u32, callback: js_sys::Function) -> bool {
    with_mount(handle, |m| m.on_event = Some(callback)).is_some()
}

#[wasm_bindgen]
pub fn set_destinations(handle: u32, destinations_json: &str, statuses_json: Option<String>) -> Result<(), JsValue> {
    let destinations = parse_destinations(destinations_json).map_err(js_err)?;
    let statuses: BTreeMap<String, TravelStatus> = match statuses_json {
        Some(json) => parse_travel_status(&json).map_err(js_err)?,
        None => BTreeMap::new(),
    };
    let markers = MarkerSet::new(&destinations, &statuses);
    with_mount(handle, |m| {
        m.view.globe_mut()?.set_markers(markers);
        Ok(())
    })
    .unwrap_or_else(|| Err(JsValue::from_str("unknown view")))
}

#[wasm_bindgen]
pub fn set_travel_status(handle: u32, statuses_json: &str) -> Result<(), JsValue> {
    let statuses = parse_travel_status(statuses_json).map_err(js_err)?;
    with_mount(handle, |m| {
        m.view.globe_mut()?.set_statuses(&statuses);
        Ok(())
    })
    .unwrap_or_else(|| Err(JsValue::from_str("unknown view")))
}

#[wasm_bindgen]
pub fn set_show_markers(handle: u32, show: bool) -> Result<(), JsValue> {
    with_mount(handle, |m| {
        m.view.globe_mut()?.set_show_markers(show);
        Ok(())
    })
    .unwrap_or_else(|| Err(JsValue::from_str("unknown view")))?;
    flush_events(handle);
    Ok(())
}

/// Emphasises a destination and holds auto-rotation; `None` releases it.
#[wasm_bindgen]
pub fn highlight_destination(handle: u32, id: Option<String>) -> Result<(), JsValue> {
    with_mount(handle, |m| {
        m.view.globe_mut()?.highlight(id.map(MarkerId::new));
        Ok(())
    })
    .unwrap_or_else(|| Err(JsValue::from_str("unknown view")))
}

/// Counters and gauges of a view as JSON.
#[wasm_bindgen]
pub fn view_metrics(handle: u32) -> Option<String> {
    with_mount(handle, |m| {
        let snapshot = m.view.view().metrics().snapshot();
        let counters: BTreeMap<&str, u64> = snapshot.counters.into_iter().collect();
        let gauges: BTreeMap<&str, i64> = snapshot.gauges.into_iter().collect();
        serde_json::json!({ "counters": counters, "gauges": gauges }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::event_json;
    use foundation::ids::{BodyId, RegionId};
    use foundation::math::Vec2;
    use scene::{HoverTarget, ViewEvent};

    #[test]
    fn hover_event_carries_target_and_names() {
        let event = ViewEvent::HoverChanged {
            target: HoverTarget::Region {
                id: RegionId(250),
                anchor: Vec2::new(10.0, 20.0),
            },
            name: "France".to_string(),
            detail: "FR".to_string(),
        };
        let json = event_json(3, &event).unwrap();
        assert_eq!(
            json,
            r#"{"frame":3,"kind":"hover","target":"region","id":"250","name":"France","detail":"FR","x":10.0,"y":20.0}"#
        );
    }

    #[test]
    fn clear_and_select_events() {
        assert_eq!(event_json(0, &ViewEvent::HoverCleared).unwrap(), r#"{"frame":0,"kind":"clear"}"#);
        let select = ViewEvent::Selected(HoverTarget::Body {
            id: BodyId::SUN,
            anchor: Vec2::new(1.0, 2.0),
        });
        assert_eq!(
            event_json(1, &select).unwrap(),
            r#"{"frame":1,"kind":"select","target":"body","id":"sun","x":1.0,"y":2.0}"#
        );
    }
}

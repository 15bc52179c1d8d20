use std::cell::RefCell;

use barrage_core::{Director, ManualClock, OverlayOptions, Stage};
use barrage_protocol::{Comment, Viewport};
use wasm_bindgen::prelude::*;

/// One overlay driven from JS. JS owns the clock: every call that observes
/// time takes the host's `performance.now()` reading.
struct Overlay {
    clock: ManualClock,
    director: Director<Stage<ManualClock>, ManualClock>,
}

/// Handle-indexed storage. A destroyed overlay frees its slot for reuse.
struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Slots<T> {
    const fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn insert(&mut self, item: T) -> usize {
        if let Some(handle) = self.items.iter().position(Option::is_none) {
            self.items[handle] = Some(item);
            handle
        } else {
            self.items.push(Some(item));
            self.items.len() - 1
        }
    }

    fn get(&self, handle: usize) -> Option<&T> {
        self.items.get(handle).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.items.get_mut(handle).and_then(Option::as_mut)
    }

    fn remove(&mut self, handle: usize) -> Option<T> {
        let item = self.items.get_mut(handle).and_then(Option::take);
        while matches!(self.items.last(), Some(None)) {
            self.items.pop();
        }
        item
    }
}

thread_local! {
    static OVERLAYS: RefCell<Slots<Overlay>> = const { RefCell::new(Slots::new()) };
}

fn with_overlay<T>(
    handle: usize,
    now_ms: f64,
    f: impl FnOnce(&mut Overlay) -> Result<T, JsError>,
) -> Result<T, JsError> {
    OVERLAYS.with_borrow_mut(|overlays| {
        let overlay = overlays
            .get_mut(handle)
            .ok_or_else(|| JsError::new("invalid overlay handle"))?;
        overlay.clock.set(now_ms);
        f(overlay)
    })
}

/// Create an overlay from JSON options. Returns a handle for later calls.
///
/// `container_size` is `[width, height]` of the element the JS side resolved
/// for `options.container`, or `undefined` if it found none.
#[wasm_bindgen]
pub fn create_overlay(
    options_json: &str,
    container_size: Option<Box<[f64]>>,
    glyph_width: f64,
    line_height: f64,
    now_ms: f64,
) -> Result<usize, JsError> {
    let options =
        OverlayOptions::from_json(options_json).map_err(|e| JsError::new(&e.to_string()))?;
    let clock = ManualClock::new(now_ms);

    let stage_clock = clock.clone();
    let mut host = |_: &str| match container_size.as_deref() {
        Some(&[width, height]) => Some(
            Stage::new(stage_clock.clone(), width, height)
                .with_glyph_size(glyph_width, line_height),
        ),
        _ => None,
    };
    let director = Director::new(&mut host, options, clock.clone())
        .map_err(|e| JsError::new(&e.to_string()))?;

    Ok(OVERLAYS.with_borrow_mut(|overlays| overlays.insert(Overlay { clock, director })))
}

/// Tear down an overlay together with its surface and queued comments.
/// The handle is invalid afterwards.
#[wasm_bindgen]
pub fn destroy_overlay(handle: usize) -> Result<(), JsError> {
    OVERLAYS
        .with_borrow_mut(|overlays| overlays.remove(handle))
        .map(drop)
        .ok_or_else(|| JsError::new("invalid overlay handle"))
}

/// Queue comments given as a JSON array.
#[wasm_bindgen]
pub fn push_comments(handle: usize, comments_json: &str, now_ms: f64) -> Result<(), JsError> {
    let comments: Vec<Comment> =
        serde_json::from_str(comments_json).map_err(|e| JsError::new(&e.to_string()))?;
    with_overlay(handle, now_ms, |o| {
        o.director.push_comments(comments);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn pause(handle: usize, now_ms: f64) -> Result<(), JsError> {
    with_overlay(handle, now_ms, |o| {
        o.director.pause();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn start(handle: usize, now_ms: f64) -> Result<(), JsError> {
    with_overlay(handle, now_ms, |o| {
        o.director.start();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn show(handle: usize, now_ms: f64) -> Result<(), JsError> {
    with_overlay(handle, now_ms, |o| {
        o.director.show();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn hide(handle: usize, now_ms: f64) -> Result<(), JsError> {
    with_overlay(handle, now_ms, |o| {
        o.director.hide();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn resize(handle: usize, width: f64, height: f64, now_ms: f64) -> Result<(), JsError> {
    with_overlay(handle, now_ms, |o| {
        o.director.surface_mut().resize(width, height);
        Ok(())
    })
}

/// Fire due lane timers and return the frame's render commands as JSON.
#[wasm_bindgen]
pub fn tick(handle: usize, now_ms: f64) -> Result<String, JsError> {
    with_overlay(handle, now_ms, |o| {
        o.director.tick();
        let stage = o.director.surface_mut();
        let viewport = Viewport::new(stage.width(), stage.height());
        let commands = stage.render(&viewport);
        serde_json::to_string(&commands).map_err(|e| JsError::new(&e.to_string()))
    })
}

/// Earliest pending lane deadline, for scheduling the next `tick`.
#[wasm_bindgen]
pub fn next_deadline(handle: usize) -> Result<Option<f64>, JsError> {
    OVERLAYS.with_borrow(|overlays| {
        overlays
            .get(handle)
            .map(|o| o.director.next_deadline())
            .ok_or_else(|| JsError::new("invalid overlay handle"))
    })
}

use std::cell::RefCell;

use scrollspy_core::{Page, PageMut, PageSession, SpyConfig, StaticPage};
use scrollspy_protocol::Viewport;
use serde::Serialize;
use wasm_bindgen::prelude::*;

thread_local! {
    /// Mounted sessions; a handle is an index into this table. Unmounting
    /// leaves a hole so later handles stay valid.
    static SESSIONS: RefCell<Vec<Option<PageSession<StaticPage>>>> = const { RefCell::new(Vec::new()) };
}

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

fn with_session<R>(
    handle: usize,
    f: impl FnOnce(&mut PageSession<StaticPage>) -> Result<R, JsError>,
) -> Result<R, JsError> {
    SESSIONS.with_borrow_mut(|sessions| {
        let session = sessions
            .get_mut(handle)
            .and_then(Option::as_mut)
            .ok_or_else(|| JsError::new("invalid page handle"))?;
        f(session)
    })
}

/// Mount a page layout (JSON) with an optional config (JSON). Returns a
/// handle for later calls.
#[wasm_bindgen]
pub fn mount_page(layout_json: &str, config_json: Option<String>) -> Result<usize, JsError> {
    let page = StaticPage::from_json(layout_json).map_err(js_err)?;
    let config = match config_json.as_deref() {
        Some(json) => SpyConfig::from_json(json).map_err(js_err)?,
        None => SpyConfig::default(),
    };
    let session = PageSession::mount(page, &config);
    Ok(SESSIONS.with_borrow_mut(|sessions| {
        sessions.push(Some(session));
        sessions.len() - 1
    }))
}

/// Scroll to `scroll_y` and run one frame. Returns the frame report as JSON.
#[wasm_bindgen]
pub fn scroll_page(handle: usize, scroll_y: f64) -> Result<String, JsError> {
    with_session(handle, |session| to_json(&session.scroll_to(scroll_y)))
}

/// Report a new viewport size and run one frame.
#[wasm_bindgen]
pub fn resize_page(handle: usize, width: f64, height: f64) -> Result<String, JsError> {
    with_session(handle, |session| {
        let current = session.page().viewport();
        let viewport = Viewport {
            width,
            height,
            ..current
        };
        to_json(&session.set_viewport(viewport))
    })
}

/// Scroll section `id` into view. Returns the frame report, or `null` when
/// the section is not on the page.
#[wasm_bindgen]
pub fn navigate(handle: usize, id: &str) -> Result<String, JsError> {
    with_session(handle, |session| to_json(&session.navigate(id)))
}

#[wasm_bindgen]
pub fn active_section(handle: usize) -> Result<Option<String>, JsError> {
    with_session(handle, |session| {
        Ok(session.active().map(|id| id.as_str().to_owned()))
    })
}

/// Navigation links with their highlight state, as JSON.
#[wasm_bindgen]
pub fn nav_links(handle: usize) -> Result<String, JsError> {
    with_session(handle, |session| to_json(&session.nav_links()))
}

/// The reveal stylesheet installed for this page.
#[wasm_bindgen]
pub fn stylesheet(handle: usize) -> Result<String, JsError> {
    with_session(handle, |session| {
        let styles = session.page().styles();
        Ok(styles.get(session.stylesheet_key()).unwrap_or_default())
    })
}

/// Stop observing and drop the page. Returns the final layout as JSON, with
/// revealed classes in place; mounting it again clears them.
#[wasm_bindgen]
pub fn unmount_page(handle: usize) -> Result<String, JsError> {
    let session = SESSIONS.with_borrow_mut(|sessions| {
        sessions
            .get_mut(handle)
            .and_then(Option::take)
            .ok_or_else(|| JsError::new("invalid page handle"))
    })?;
    let page = session.unmount();
    to_json(&page.layout())
}

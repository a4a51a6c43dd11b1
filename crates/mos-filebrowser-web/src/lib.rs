#![cfg(target_arch = "wasm32")]
//! # MOS FileBrowser Web
//!
//! Browser host for the MOS FileBrowser loader. Binds the engine's host
//! traits to the page through `web-sys` and starts the loader when the
//! module is instantiated.
//!
//! The page may configure the loader before loading the module:
//!
//! - `window.__MOS_FILEBROWSER_CONFIG__`: configuration object, same shape
//!   as the TOML configuration
//! - `window.__MOS_FILEBROWSER_LOG__`: tracing filter
//! - `window.__MOS_ROUTER__`: router with a `push(url)` method

mod document;
mod logging;
mod platform;

use std::cell::RefCell;
use std::rc::Rc;

use mos_filebrowser_config::{Config, ConfigLoader, ConfigValidator};
use mos_filebrowser_core::host::{MutationRecord, Router};
use mos_filebrowser_core::{FileBrowserLoader, NavigationKind, NavigationTargets};
use tracing::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, MutationObserver, MutationObserverInit, Window};

pub use document::WebDocument;
pub use logging::{ConsoleWriter, LOG_FILTER_GLOBAL};
pub use platform::{
    ROUTER_GLOBAL, TimerHandler, WebLocation, WebSessionStore, WebTimers, WindowEvents,
    WindowRouter,
};

/// Global the page may put a configuration object under.
pub const CONFIG_GLOBAL: &str = "__MOS_FILEBROWSER_CONFIG__";

type WebLoader = FileBrowserLoader<WebDocument, WebTimers>;
type SharedLoader = Rc<RefCell<WebLoader>>;

/// Read the page-provided configuration, falling back to defaults.
fn load_config(window: &Window) -> Config {
    let value = match js_sys::Reflect::get(window, &CONFIG_GLOBAL.into()) {
        Ok(value) if !value.is_undefined() && !value.is_null() => value,
        _ => return Config::default(),
    };
    let json = match js_sys::JSON::stringify(&value) {
        Ok(json) => String::from(json),
        Err(e) => {
            warn!("{} is not serializable: {:?}; using defaults", CONFIG_GLOBAL, e);
            return Config::default();
        }
    };
    match ConfigLoader::load_json(&json) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid {}: {}; using defaults", CONFIG_GLOBAL, e);
            Config::default()
        }
    }
}

fn report_validation(config: &Config) {
    let Ok(result) = ConfigValidator::validate(config) else {
        return;
    };
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        error!("Config {}: {}", error.path, error.message);
    }
}

/// Convert a DOM mutation batch into engine records.
fn convert_records(records: &js_sys::Array) -> Vec<MutationRecord<Element>> {
    records
        .iter()
        .filter_map(|record| record.dyn_into::<web_sys::MutationRecord>().ok())
        .map(|record| {
            let added = record.added_nodes();
            let added_elements = (0..added.length())
                .filter_map(|i| added.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect();
            MutationRecord {
                added_elements,
                added_count: added.length() as usize,
                removed_count: record.removed_nodes().length() as usize,
            }
        })
        .collect()
}

/// Start observing the body once the loader is running.
fn observe_body(window: &Window, loader: &SharedLoader) -> Result<(), JsValue> {
    let body = window
        .document()
        .and_then(|d| d.body())
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let callback = Closure::wrap(Box::new({
        let loader = Rc::downgrade(loader);
        move |records: js_sys::Array, _observer: MutationObserver| {
            let Some(loader) = loader.upgrade() else {
                return;
            };
            let batch = convert_records(&records);
            with_loader(&loader, "mutation records", |l| l.on_mutations(&batch));
        }
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)?;

    // Observation lasts for the page's lifetime.
    callback.forget();
    Ok(())
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
    listener.forget();
    Ok(())
}

/// Run `f` on the loader unless a callback is already inside it.
fn with_loader<R>(
    loader: &SharedLoader,
    what: &str,
    f: impl FnOnce(&mut WebLoader) -> R,
) -> Option<R> {
    match loader.try_borrow_mut() {
        Ok(mut loader) => Some(f(&mut loader)),
        Err(_) => {
            warn!("Loader busy, dropping {}", what);
            None
        }
    }
}

/// Module entry point.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    logging::init(&window);

    let config = load_config(&window);
    report_validation(&config);

    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let timers = WebTimers::new(window.clone());
    let router = WindowRouter::resolve(&window).map(|r| Rc::new(r) as Rc<dyn Router>);
    if router.is_some() {
        info!("Using {} for navigation", ROUTER_GLOBAL);
    }
    let targets = NavigationTargets {
        events: Rc::new(WindowEvents::new(window.clone())),
        router,
        session: Rc::new(WebSessionStore::new(window.clone())),
        location: Rc::new(WebLocation::new(window.clone())),
    };

    let loader = FileBrowserLoader::new(
        &config,
        WebDocument::new(document),
        timers.clone(),
        targets,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let loader: SharedLoader = Rc::new(RefCell::new(loader));

    timers.set_handler({
        let loader = Rc::downgrade(&loader);
        Rc::new(move |id, task| {
            if let Some(loader) = loader.upgrade() {
                with_loader(&loader, "timer", |l| l.on_timer(id, task));
            }
        })
    });

    for kind in NavigationKind::ALL {
        let loader = loader.clone();
        listen(&window, kind.event_name(), move |_| {
            with_loader(&loader, kind.event_name(), |l| l.on_navigation(kind));
        })?;
    }

    let started = loader.borrow_mut().boot().is_some();
    if started {
        observe_body(&window, &loader)?;
    } else {
        let page = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let window = window.clone();
        let loader = loader.clone();
        listen(&page, "DOMContentLoaded", move |_| {
            let started = with_loader(&loader, "DOMContentLoaded", |l| l.on_document_ready())
                .flatten()
                .is_some();
            if started {
                if let Err(e) = observe_body(&window, &loader) {
                    error!("Cannot observe document changes: {:?}", e);
                }
            }
        })?;
    }

    Ok(())
}

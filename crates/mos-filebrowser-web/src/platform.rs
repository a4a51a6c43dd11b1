//! Window-backed timers and navigation channels.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use mos_filebrowser_core::host::{EventChannel, LocationFragment, Router, SessionStore, TimerHost};
use mos_filebrowser_core::{EngineTask, HostError, NavigationIntent, TimerId};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Window};

use crate::document::js_error;

/// Global the host application may expose its router under.
pub const ROUTER_GLOBAL: &str = "__MOS_ROUTER__";

/// Receives fired timers.
pub type TimerHandler = Rc<dyn Fn(TimerId, EngineTask)>;

struct ScheduledTimer {
    handle: i32,
    fired: Rc<Cell<bool>>,
    _callback: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct TimerState {
    next_id: Cell<u64>,
    handler: RefCell<Option<TimerHandler>>,
    scheduled: RefCell<HashMap<TimerId, ScheduledTimer>>,
}

/// `setTimeout` timers carrying engine tasks.
///
/// Fired timers are handed to the handler installed with
/// [`WebTimers::set_handler`]; timers firing before that are dropped.
#[derive(Clone)]
pub struct WebTimers {
    window: Window,
    state: Rc<TimerState>,
}

impl WebTimers {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            state: Rc::new(TimerState::default()),
        }
    }

    pub fn set_handler(&self, handler: TimerHandler) {
        *self.state.handler.borrow_mut() = Some(handler);
    }

    /// Release callbacks of timers that already fired.
    fn prune(&self) {
        self.state
            .scheduled
            .borrow_mut()
            .retain(|_, timer| !timer.fired.get());
    }
}

impl TimerHost for WebTimers {
    fn set_timeout(&self, delay: Duration, task: EngineTask) -> Result<TimerId, HostError> {
        self.prune();

        let id = TimerId(self.state.next_id.get());
        self.state.next_id.set(id.0 + 1);

        let fired = Rc::new(Cell::new(false));
        let callback = Closure::wrap(Box::new({
            let fired = fired.clone();
            let state = Rc::downgrade(&self.state);
            move || {
                fired.set(true);
                let Some(state) = state.upgrade() else {
                    return;
                };
                let handler = state.handler.borrow().clone();
                match handler {
                    Some(handler) => handler(id, task),
                    None => debug!("Dropping {} fired before the loader was ready", id),
                }
            }
        }) as Box<dyn FnMut()>);

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(|e| HostError::Timer(js_error(&e)))?;

        self.state.scheduled.borrow_mut().insert(
            id,
            ScheduledTimer {
                handle,
                fired,
                _callback: callback,
            },
        );
        Ok(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(timer) = self.state.scheduled.borrow_mut().remove(&id) {
            if !timer.fired.get() {
                self.window.clear_timeout_with_handle(timer.handle);
            }
        }
    }
}

/// Dispatches notifications as `CustomEvent`s on the window.
#[derive(Clone)]
pub struct WindowEvents {
    window: Window,
}

impl WindowEvents {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl EventChannel for WindowEvents {
    fn emit(&self, event_name: &str, intent: &NavigationIntent) -> Result<(), HostError> {
        let event_error = |e: JsValue| HostError::Event(js_error(&e));

        let detail = js_sys::Object::new();
        js_sys::Reflect::set(&detail, &"path".into(), &intent.path.as_str().into())
            .map_err(event_error)?;

        let init = CustomEventInit::new();
        init.set_detail(&detail);
        let event =
            CustomEvent::new_with_event_init_dict(event_name, &init).map_err(event_error)?;
        self.window.dispatch_event(&event).map_err(event_error)?;
        Ok(())
    }
}

/// The host application's router, found on the window.
pub struct WindowRouter {
    router: JsValue,
    push: js_sys::Function,
}

impl WindowRouter {
    /// Look up the router global. `None` when absent or without `push`.
    pub fn resolve(window: &Window) -> Option<Self> {
        let router = js_sys::Reflect::get(window, &ROUTER_GLOBAL.into()).ok()?;
        if router.is_undefined() || router.is_null() {
            return None;
        }
        let push = js_sys::Reflect::get(&router, &"push".into()).ok()?;
        match push.dyn_into::<js_sys::Function>() {
            Ok(push) => Some(Self { router, push }),
            Err(_) => {
                warn!("{} has no push function, ignoring it", ROUTER_GLOBAL);
                None
            }
        }
    }
}

impl Router for WindowRouter {
    fn navigate(&self, url: &str) -> Result<(), HostError> {
        self.push
            .call1(&self.router, &url.into())
            .map(|_| ())
            .map_err(|e| HostError::Navigation(js_error(&e)))
    }
}

/// The window's `sessionStorage`.
pub struct WebSessionStore {
    window: Window,
}

impl WebSessionStore {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl SessionStore for WebSessionStore {
    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        let storage = self
            .window
            .session_storage()
            .map_err(|e| HostError::Storage(js_error(&e)))?
            .ok_or_else(|| HostError::Storage("sessionStorage unavailable".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| HostError::Storage(js_error(&e)))
    }
}

/// The window's location fragment.
pub struct WebLocation {
    window: Window,
}

impl WebLocation {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl LocationFragment for WebLocation {
    fn set_hash(&self, fragment: &str) -> Result<(), HostError> {
        self.window
            .location()
            .set_hash(fragment)
            .map_err(|e| HostError::Navigation(js_error(&e)))
    }
}

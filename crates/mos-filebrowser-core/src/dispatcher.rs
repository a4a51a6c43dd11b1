//! Navigation dispatch.
//!
//! Opening a path is a best-effort broadcast over every channel the host may
//! listen on: a notification event, then a fallback route through the router
//! when one is available, or through session storage and the location
//! fragment otherwise. A failing channel is logged and never stops the rest.

use std::fmt;
use std::rc::Rc;

use mos_filebrowser_config::Config;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::host::{EventChannel, LocationFragment, Router, SessionStore};

/// Characters `encodeURIComponent` leaves untouched, besides alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a URI component the way browsers' `encodeURIComponent` does.
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Fallback URL of the plugin page for `path`.
pub fn plugin_url(plugin_name: &str, path: &str) -> String {
    format!("/plugins/{}?path={}", plugin_name, encode_uri_component(path))
}

/// Payload of the open-file-browser notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub path: String,
}

impl NavigationIntent {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Where the fallback navigation went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackRoute {
    /// Pushed through the host router.
    Router(String),
    /// Path persisted to session storage and mirrored into the fragment.
    Location(String),
}

impl FallbackRoute {
    pub fn url(&self) -> &str {
        match self {
            FallbackRoute::Router(url) | FallbackRoute::Location(url) => url,
        }
    }
}

/// Names used on the navigation channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub plugin_name: String,
    pub event_name: String,
    pub storage_key: String,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            plugin_name: config.plugin.name.clone(),
            event_name: config.loader.event_name.clone(),
            storage_key: config.loader.storage_key.clone(),
        }
    }
}

/// Host channels a navigation intent is delivered on.
///
/// The router is optional: its presence alone decides which fallback runs.
#[derive(Clone)]
pub struct NavigationTargets {
    pub events: Rc<dyn EventChannel>,
    pub router: Option<Rc<dyn Router>>,
    pub session: Rc<dyn SessionStore>,
    pub location: Rc<dyn LocationFragment>,
}

impl fmt::Debug for NavigationTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationTargets")
            .field("router", &self.router.is_some())
            .finish_non_exhaustive()
    }
}

/// Delivers navigation intents for activated controls.
#[derive(Debug)]
pub struct NavigationDispatcher {
    settings: DispatchSettings,
    targets: NavigationTargets,
}

impl NavigationDispatcher {
    pub fn new(settings: DispatchSettings, targets: NavigationTargets) -> Self {
        Self { settings, targets }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn has_router(&self) -> bool {
        self.targets.router.is_some()
    }

    /// Ask the host to open a file browser at `path`.
    pub fn open(&self, path: &str) -> FallbackRoute {
        info!("Opening file browser at {}", path);

        let intent = NavigationIntent::new(path);
        if let Err(e) = self.targets.events.emit(&self.settings.event_name, &intent) {
            warn!("Failed to emit {}: {}", self.settings.event_name, e);
        }

        let url = plugin_url(&self.settings.plugin_name, path);
        match &self.targets.router {
            Some(router) => {
                match router.navigate(&url) {
                    Ok(()) => debug!("Routed to {}", url),
                    Err(e) => warn!("Router navigation to {} failed: {}", url, e),
                }
                FallbackRoute::Router(url)
            }
            None => {
                if let Err(e) = self.targets.session.set_item(&self.settings.storage_key, path) {
                    warn!("Failed to persist {}: {}", self.settings.storage_key, e);
                }
                if let Err(e) = self.targets.location.set_hash(&url) {
                    warn!("Failed to set location fragment: {}", e);
                }
                debug!("Set location fragment to {}", url);
                FallbackRoute::Location(url)
            }
        }
    }
}

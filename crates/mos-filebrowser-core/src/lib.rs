//! # MOS FileBrowser Core
//!
//! Row detection and control injection engine for the MOS FileBrowser
//! loader.
//!
//! ## Components
//!
//! - [`PathExtractor`] - Infers the path of a disk, share or pool row
//! - [`ControlFactory`] - Builds browse controls bound to a path
//! - [`NavigationDispatcher`] - Delivers navigation intents to the host
//! - [`InjectionEngine`] - Removes and re-injects controls on every scan
//! - [`ChangeObserver`] - Debounces rescans on document changes
//! - [`FileBrowserLoader`] - Boot sequence and host callback entry point
//!
//! The engine talks to its host only through the traits in [`host`]. The
//! in-memory [`dom::Document`] and the [`host::memory`] implementations
//! back the CLI and the tests.

pub mod control;
pub mod dispatcher;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod host;
pub mod injector;
pub mod lifecycle;
pub mod observer;
pub mod scheduler;

pub use control::{ActivationEvent, BrowseControl, ControlFactory, ControlVisual};
pub use dispatcher::{
    DispatchSettings, FallbackRoute, NavigationDispatcher, NavigationIntent, NavigationTargets,
    encode_uri_component, plugin_url,
};
pub use error::{EngineError, HostError};
pub use extractor::{CategoryRules, ExtractedPath, PathExtractor, PathSource};
pub use injector::{InjectedRow, InjectionEngine, ScanReport};
pub use lifecycle::{BootState, FileBrowserLoader, NavigationKind};
pub use observer::ChangeObserver;
pub use scheduler::{DebounceSlot, EngineTask, ScanReason, TimerId};

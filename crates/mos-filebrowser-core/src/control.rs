//! Browse controls.
//!
//! A [`BrowseControl`] is the host-independent half of an injected button:
//! its bound path, tooltip, marker class and hover state, plus the activation
//! behavior. Hosts materialize it (see
//! [`HostDocument::append_control`](crate::host::HostDocument::append_control))
//! and forward pointer and click events to it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use mos_filebrowser_config::LoaderConfig;
use tracing::debug;

use crate::dispatcher::NavigationDispatcher;

/// Path data of the folder icon, on a 24x24 view box.
pub const FOLDER_ICON_PATH: &str = "M10 4H4c-1.1 0-1.99.9-1.99 2L2 18c0 1.1.9 2 2 2h16c1.1 0 2-.9 2-2V8c0-1.1-.9-2-2-2h-8l-2-2z";

/// Inline presentation shared by both visual states.
const BASE_STYLE: &str = "background: transparent; border: none; cursor: pointer; \
    padding: 4px; margin-left: 8px; color: #4fc3f7; \
    transition: opacity 0.2s, transform 0.2s; vertical-align: middle; \
    display: inline-flex; align-items: center;";

/// Folder icon as SVG markup.
pub fn folder_icon_svg() -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="20" height="20" fill="currentColor"><path d="{}"/></svg>"#,
        FOLDER_ICON_PATH
    )
}

/// Hover state of a control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlVisual {
    #[default]
    Resting,
    Hovered,
}

impl ControlVisual {
    pub fn opacity(&self) -> &'static str {
        match self {
            ControlVisual::Resting => "0.7",
            ControlVisual::Hovered => "1",
        }
    }

    pub fn transform(&self) -> &'static str {
        match self {
            ControlVisual::Resting => "scale(1)",
            ControlVisual::Hovered => "scale(1.1)",
        }
    }
}

/// The host event that activated a control.
pub trait ActivationEvent {
    fn prevent_default(&mut self);
    fn stop_propagation(&mut self);
}

/// One injected control, bound to a path for its whole life.
pub struct BrowseControl {
    path: String,
    title: String,
    marker_class: String,
    visual: Cell<ControlVisual>,
    dispatcher: Rc<NavigationDispatcher>,
}

impl fmt::Debug for BrowseControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowseControl")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("visual", &self.visual.get())
            .finish()
    }
}

impl BrowseControl {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    pub fn visual(&self) -> ControlVisual {
        self.visual.get()
    }

    /// Inline style for the current visual state.
    pub fn style(&self) -> String {
        let visual = self.visual.get();
        format!(
            "{} opacity: {}; transform: {};",
            BASE_STYLE,
            visual.opacity(),
            visual.transform()
        )
    }

    pub fn pointer_enter(&self) -> ControlVisual {
        self.visual.set(ControlVisual::Hovered);
        ControlVisual::Hovered
    }

    pub fn pointer_leave(&self) -> ControlVisual {
        self.visual.set(ControlVisual::Resting);
        ControlVisual::Resting
    }

    /// Handle a click or tap.
    ///
    /// Rows are often clickable themselves, so the event is stopped here
    /// before the path is handed to the dispatcher.
    pub fn activate(&self, event: &mut dyn ActivationEvent) {
        event.prevent_default();
        event.stop_propagation();
        debug!("Control for {} activated", self.path);
        self.dispatcher.open(&self.path);
    }
}

/// Builds [`BrowseControl`]s sharing one dispatcher.
#[derive(Debug, Clone)]
pub struct ControlFactory {
    dispatcher: Rc<NavigationDispatcher>,
    marker_class: String,
    default_title: String,
}

impl ControlFactory {
    pub fn new(dispatcher: Rc<NavigationDispatcher>, loader: &LoaderConfig) -> Self {
        Self {
            dispatcher,
            marker_class: loader.marker_class.clone(),
            default_title: loader.default_title.clone(),
        }
    }

    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    /// Build an unmounted control. A missing or empty title falls back to
    /// the default tooltip.
    pub fn build(&self, path: &str, title: Option<&str>) -> BrowseControl {
        let title = match title {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self.default_title.clone(),
        };
        BrowseControl {
            path: path.to_string(),
            title,
            marker_class: self.marker_class.clone(),
            visual: Cell::new(ControlVisual::Resting),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{DispatchSettings, NavigationTargets};
    use crate::dom::RecordedActivation;
    use crate::host::memory::{
        BroadcastEvents, MemoryLocation, MemorySessionStore, RecordingRouter,
    };
    use mos_filebrowser_config::Config;

    fn factory(router: Rc<RecordingRouter>) -> ControlFactory {
        let config = Config::default();
        let dispatcher = NavigationDispatcher::new(
            DispatchSettings::from_config(&config),
            NavigationTargets {
                events: Rc::new(BroadcastEvents::default()),
                router: Some(router),
                session: Rc::new(MemorySessionStore::new()),
                location: Rc::new(MemoryLocation::new()),
            },
        );
        ControlFactory::new(Rc::new(dispatcher), &config.loader)
    }

    #[test]
    fn test_build_titles() {
        let factory = factory(Rc::new(RecordingRouter::new()));

        let titled = factory.build("/mnt/disk1", Some("Browse /mnt/disk1"));
        assert_eq!(titled.title(), "Browse /mnt/disk1");
        assert_eq!(titled.path(), "/mnt/disk1");
        assert_eq!(titled.marker_class(), "mos-filebrowser-icon");

        assert_eq!(factory.build("/mnt/a", None).title(), "Browse files");
        assert_eq!(factory.build("/mnt/a", Some("")).title(), "Browse files");
    }

    #[test]
    fn test_hover_toggles_visual() {
        let control = factory(Rc::new(RecordingRouter::new())).build("/mnt/a", None);
        assert_eq!(control.visual(), ControlVisual::Resting);
        assert!(control.style().contains("opacity: 0.7; transform: scale(1);"));

        assert_eq!(control.pointer_enter(), ControlVisual::Hovered);
        assert!(control.style().contains("opacity: 1; transform: scale(1.1);"));

        assert_eq!(control.pointer_leave(), ControlVisual::Resting);
        assert_eq!(control.visual(), ControlVisual::Resting);
    }

    #[test]
    fn test_activate_stops_event_and_dispatches() {
        let router = Rc::new(RecordingRouter::new());
        let control = factory(router.clone()).build("/mnt/disk1", None);

        let mut event = RecordedActivation::default();
        control.activate(&mut event);

        assert!(event.default_prevented);
        assert!(event.propagation_stopped);
        assert_eq!(
            router.visited(),
            vec!["/plugins/mos-file-browser?path=%2Fmnt%2Fdisk1"]
        );
    }

    #[test]
    fn test_folder_icon_svg() {
        let svg = folder_icon_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(FOLDER_ICON_PATH));
    }
}

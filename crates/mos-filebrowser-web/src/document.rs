//! `HostDocument` over the live DOM.

use std::rc::Rc;

use mos_filebrowser_core::control::folder_icon_svg;
use mos_filebrowser_core::host::{HostDocument, ReadyState};
use mos_filebrowser_core::{ActivationEvent, BrowseControl, HostError};
use tracing::trace;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event};

/// Render a JS exception for logs.
pub(crate) fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// A DOM event seen through the engine's activation interface.
struct DomEvent<'a>(&'a Event);

impl ActivationEvent for DomEvent<'_> {
    fn prevent_default(&mut self) {
        self.0.prevent_default();
    }

    fn stop_propagation(&mut self) {
        self.0.stop_propagation();
    }
}

type Listener = Closure<dyn FnMut(Event)>;

/// A mounted control and the listeners keeping it interactive.
struct MountedControl {
    element: Element,
    listeners: Vec<(&'static str, Listener)>,
}

impl MountedControl {
    fn detach_listeners(&self) {
        for (event, listener) in &self.listeners {
            let _ = self
                .element
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
    }
}

/// The page's document.
///
/// Listener closures live here, one set per mounted control, and are
/// released when the control is removed or found detached.
pub struct WebDocument {
    document: Document,
    mounted: Vec<MountedControl>,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            mounted: Vec::new(),
        }
    }

    pub fn inner(&self) -> &Document {
        &self.document
    }

    /// Number of controls still holding listeners.
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    fn prune(&mut self, removed: Option<&Element>) {
        self.mounted.retain(|m| {
            let keep = m.element.is_connected() && Some(&m.element) != removed;
            if !keep {
                m.detach_listeners();
            }
            keep
        });
    }

    fn build_button(&self, control: &BrowseControl) -> Result<Element, HostError> {
        let dom = |e: JsValue| HostError::Dom(js_error(&e));
        let button = self.document.create_element("button").map_err(dom)?;
        button.set_class_name(control.marker_class());
        button.set_attribute("type", "button").map_err(dom)?;
        button.set_attribute("title", control.title()).map_err(dom)?;
        button.set_attribute("style", &control.style()).map_err(dom)?;
        button.set_inner_html(&folder_icon_svg());
        Ok(button)
    }
}

fn listen(
    element: &Element,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(&'static str, Listener), HostError> {
    let listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    element
        .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
        .map_err(|e| HostError::Dom(js_error(&e)))?;
    Ok((event, listener))
}

impl HostDocument for WebDocument {
    type Node = Element;

    fn ready_state(&self) -> ReadyState {
        ReadyState::parse(&self.document.ready_state())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, HostError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| HostError::selector(selector, js_error(&e)))?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn query_first(&self, scope: &Element, selector: &str) -> Result<Option<Element>, HostError> {
        scope
            .query_selector(selector)
            .map_err(|e| HostError::selector(selector, js_error(&e)))
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn append_control(
        &mut self,
        target: &Element,
        control: BrowseControl,
    ) -> Result<Element, HostError> {
        self.prune(None);

        let button = self.build_button(&control)?;
        let control = Rc::new(control);

        let listeners = vec![
            listen(&button, "mouseenter", {
                let (control, button) = (control.clone(), button.clone());
                move |_| {
                    control.pointer_enter();
                    let _ = button.set_attribute("style", &control.style());
                }
            })?,
            listen(&button, "mouseleave", {
                let (control, button) = (control.clone(), button.clone());
                move |_| {
                    control.pointer_leave();
                    let _ = button.set_attribute("style", &control.style());
                }
            })?,
            listen(&button, "click", {
                let control = control.clone();
                move |event: Event| control.activate(&mut DomEvent(&event))
            })?,
        ];

        target
            .append_child(&button)
            .map_err(|e| HostError::Dom(js_error(&e)))?;
        trace!("Mounted control for {}", control.path());

        self.mounted.push(MountedControl {
            element: button.clone(),
            listeners,
        });
        Ok(button)
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
        self.prune(Some(node));
    }
}

impl Drop for WebDocument {
    fn drop(&mut self) {
        for mounted in &self.mounted {
            mounted.detach_listeners();
        }
    }
}

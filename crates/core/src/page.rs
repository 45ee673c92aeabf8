//! Page (DOM) port
//!
//! The pipeline never touches a document directly. Hosts implement [`Page`]
//! over whatever owns the markup; [`MemoryPage`] is the in-memory
//! implementation used by the CLI and the tests.

use crate::render::Renderer;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

/// Data attribute names read from swap targets (without the `data-` prefix)
pub mod attrs {
    pub const RENDER: &str = "render";
    pub const REFRESH: &str = "refresh";
    pub const REFRESH_ENDPOINT: &str = "refresh-endpoint";
    pub const RESET_FORM: &str = "reset-form";
    pub const REDIRECT: &str = "redirect";
    pub const PROJECT_ID: &str = "project-id";
    pub const TASK_ID: &str = "task-id";
    pub const PREFILL_FORM: &str = "prefill-form";
}

/// Element id of the logout control
pub const LOGOUT_CONTROL_ID: &str = "logout-btn";

/// The element a response is swapped into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapTarget {
    pub id: Option<String>,
    pub data: BTreeMap<String, String>,
}

impl SwapTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            data: BTreeMap::new(),
        }
    }

    /// Set a data attribute, `key` given without the `data-` prefix
    #[must_use]
    pub fn data_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Value of a data attribute; empty attributes read as absent
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Renderer named by `data-render`, if it is a known one
    pub fn renderer(&self) -> Option<Renderer> {
        self.data(attrs::RENDER).and_then(|name| name.parse().ok())
    }

    /// `#id` selector for this element
    pub fn selector(&self) -> Option<String> {
        self.id.as_ref().map(|id| format!("#{id}"))
    }
}

/// A navigation requested by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    pub delay: Duration,
}

/// Operations the pipeline needs from the hosting page
pub trait Page {
    /// Path component of the page's current location
    fn location_path(&self) -> String;

    /// Resolve `selector` to an element
    fn element(&self, selector: &str) -> Option<SwapTarget>;

    /// Replace the inner HTML of the element matched by `selector`
    ///
    /// Returns `false` if nothing matched.
    fn swap(&mut self, selector: &str, html: &str) -> bool;

    /// Set the value of the field called `name` inside the form matched by `form`
    fn set_field(&mut self, form: &str, name: &str, value: &str);

    /// Reset the form enclosing `target`, if any
    fn reset_enclosing_form(&mut self, target: &SwapTarget);

    fn hide(&mut self, target: &SwapTarget);

    /// Navigate to `url` once `delay` has elapsed
    fn navigate(&mut self, url: &str, delay: Duration);
}

/// In-memory page that records everything done to it
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    location: String,
    elements: Vec<(String, SwapTarget)>,
    contents: HashMap<String, String>,
    forms: HashMap<String, BTreeMap<String, String>>,
    enclosing_forms: HashMap<String, String>,
    hidden: BTreeSet<String>,
    resets: Vec<String>,
    navigations: Vec<Navigation>,
}

impl MemoryPage {
    /// Empty page located at `location` (a path such as `/users/list.html`)
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Add an element reachable through `selector`
    ///
    /// Elements with an id are also reachable through `#id`.
    pub fn insert(&mut self, selector: impl Into<String>, element: SwapTarget) {
        let selector = selector.into();
        if let Some(id_selector) = element.selector() {
            if id_selector != selector {
                self.elements.push((id_selector, element.clone()));
            }
        }
        self.elements.push((selector, element));
    }

    /// Add an element by its id
    pub fn insert_target(&mut self, element: SwapTarget) {
        match element.selector() {
            Some(selector) => self.insert(selector, element),
            None => tracing::warn!("Ignoring element without id"),
        }
    }

    /// Add a form with the given (empty) fields
    pub fn insert_form(&mut self, selector: impl Into<String>, fields: &[&str]) {
        let selector = selector.into();
        let fields = fields
            .iter()
            .map(|name| ((*name).to_string(), String::new()))
            .collect();
        let element = selector
            .strip_prefix('#')
            .map(SwapTarget::with_id)
            .unwrap_or_default();
        self.forms.insert(selector.clone(), fields);
        self.elements.push((selector, element));
    }

    /// Declare that the element matched by `target` sits inside `form`
    pub fn nest_in_form(&mut self, target: impl Into<String>, form: impl Into<String>) {
        self.enclosing_forms.insert(target.into(), form.into());
    }

    pub fn remove(&mut self, selector: &str) {
        let removed: Vec<SwapTarget> = self
            .elements
            .iter()
            .filter(|(s, _)| s == selector)
            .map(|(_, element)| element.clone())
            .collect();
        self.elements
            .retain(|(s, element)| s != selector && !removed.contains(element));
        self.contents.remove(selector);
    }

    /// Current inner HTML of the element matched by `selector`
    pub fn content(&self, selector: &str) -> Option<&str> {
        self.contents.get(selector).map(String::as_str)
    }

    pub fn field(&self, form: &str, name: &str) -> Option<&str> {
        self.forms
            .get(form)
            .and_then(|fields| fields.get(name))
            .map(String::as_str)
    }

    pub fn fields(&self, form: &str) -> Option<&BTreeMap<String, String>> {
        self.forms.get(form)
    }

    pub fn is_hidden(&self, selector: &str) -> bool {
        self.hidden.contains(selector)
    }

    /// Forms that have been reset, in order
    pub fn resets(&self) -> &[String] {
        &self.resets
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    fn selectors_of(&self, target: &SwapTarget) -> Vec<String> {
        self.elements
            .iter()
            .filter(|(_, element)| element == target)
            .map(|(selector, _)| selector.clone())
            .collect()
    }

    fn aliases(&self, selector: &str) -> Vec<String> {
        match self.element(selector) {
            Some(element) => self.selectors_of(&element),
            None => Vec::new(),
        }
    }
}

impl Page for MemoryPage {
    fn location_path(&self) -> String {
        self.location.clone()
    }

    fn element(&self, selector: &str) -> Option<SwapTarget> {
        self.elements
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, element)| element.clone())
    }

    fn swap(&mut self, selector: &str, html: &str) -> bool {
        let aliases = self.aliases(selector);
        if aliases.is_empty() {
            return false;
        }
        for alias in aliases {
            self.contents.insert(alias, html.to_string());
        }
        true
    }

    fn set_field(&mut self, form: &str, name: &str, value: &str) {
        if let Some(field) = self
            .forms
            .get_mut(form)
            .and_then(|fields| fields.get_mut(name))
        {
            *field = value.to_string();
        }
    }

    fn reset_enclosing_form(&mut self, target: &SwapTarget) {
        let form = self
            .selectors_of(target)
            .iter()
            .find_map(|selector| self.enclosing_forms.get(selector).cloned());

        if let Some(form) = form {
            if let Some(fields) = self.forms.get_mut(&form) {
                fields.values_mut().for_each(String::clear);
            }
            self.resets.push(form);
        }
    }

    fn hide(&mut self, target: &SwapTarget) {
        let selectors = self.selectors_of(target);
        self.hidden.extend(selectors);
    }

    fn navigate(&mut self, url: &str, delay: Duration) {
        self.navigations.push(Navigation {
            url: url.to_string(),
            delay,
        });
    }
}

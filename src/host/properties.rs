//! Property sheet description
//!
//! A source describes its user-facing settings as a list of properties. The
//! host (or a UI) renders them and writes the chosen values back into the
//! source's `Settings`. Buttons carry a callback that runs when pressed.

use std::sync::Arc;

/// Callback of a button property
///
/// Returns true if the property sheet should be rebuilt afterwards.
pub type ButtonCallback = Arc<dyn Fn() -> bool + Send + Sync>;

/// One entry of a list property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Text shown to the user
    pub label: String,
    /// Value written to settings when chosen
    pub value: String,
}

/// What kind of control a property is
pub enum PropertyKind {
    Bool,
    List(Vec<ListItem>),
    Button(ButtonCallback),
}

impl std::fmt::Debug for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyKind::Bool => write!(f, "Bool"),
            PropertyKind::List(items) => f.debug_tuple("List").field(items).finish(),
            PropertyKind::Button(_) => write!(f, "Button"),
        }
    }
}

/// A single property
#[derive(Debug)]
pub struct Property {
    /// Settings key
    pub name: String,
    /// Label shown to the user
    pub description: String,
    /// Whether the control is shown
    pub visible: bool,
    /// Control kind
    pub kind: PropertyKind,
}

impl Property {
    /// Items of a list property, empty for other kinds
    pub fn list_items(&self) -> &[ListItem] {
        match &self.kind {
            PropertyKind::List(items) => items,
            _ => &[],
        }
    }
}

/// An ordered property sheet
#[derive(Debug, Default)]
pub struct Properties {
    props: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, description: &str, kind: PropertyKind) -> &mut Property {
        self.props.push(Property {
            name: name.to_string(),
            description: description.to_string(),
            visible: true,
            kind,
        });
        let last = self.props.len() - 1;
        &mut self.props[last]
    }

    /// Add a checkbox
    pub fn add_bool(&mut self, name: &str, description: &str) -> &mut Property {
        self.push(name, description, PropertyKind::Bool)
    }

    /// Add a drop-down list of string values
    pub fn add_list(&mut self, name: &str, description: &str, items: Vec<ListItem>) -> &mut Property {
        self.push(name, description, PropertyKind::List(items))
    }

    /// Add a button
    pub fn add_button<F>(&mut self, name: &str, description: &str, callback: F) -> &mut Property
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.push(name, description, PropertyKind::Button(Arc::new(callback)))
    }

    /// Look up a property by settings key
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.props.iter().find(|p| p.name == name)
    }

    /// Press a button
    ///
    /// Returns `None` if there is no visible button with this name, otherwise
    /// whether the sheet should be rebuilt.
    pub fn click(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(Property {
                visible: true,
                kind: PropertyKind::Button(callback),
                ..
            }) => Some(callback()),
            _ => None,
        }
    }

    /// Iterate in display order
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.props.iter()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_build_sheet() {
        let mut props = Properties::new();
        props.add_list(
            "target_source_name",
            "Source",
            vec![ListItem {
                label: "Camera".to_string(),
                value: "Camera".to_string(),
            }],
        );
        props.add_bool("buffered", "Buffered");

        assert_eq!(props.len(), 2);
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["target_source_name", "buffered"]);
        assert_eq!(props.get("target_source_name").unwrap().list_items().len(), 1);
        assert!(props.get("buffered").unwrap().list_items().is_empty());
    }

    #[test]
    fn test_click_button() {
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);

        let mut props = Properties::new();
        props.add_button("add_filter", "Add filter", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert_eq!(props.click("add_filter"), Some(true));
        assert_eq!(props.click("missing"), None);
        assert_eq!(presses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hidden_button_does_nothing() {
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);

        let mut props = Properties::new();
        props
            .add_button("add_filter", "Add filter", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .visible = false;

        assert_eq!(props.click("add_filter"), None);
        assert_eq!(presses.load(Ordering::SeqCst), 0);
    }
}

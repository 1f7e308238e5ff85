//! Generic OSM XML element.
//!
//! Elements keep every attribute, child and text run in document order so that
//! anything the engine does not touch is written back unchanged.

use peak_model::{Point, Tags};

pub const TAG: &str = "tag";
pub const NODE: &str = "node";
const KEY: &str = "k";
const VALUE: &str = "v";
const ACTION: &str = "action";
const MODIFY: &str = "modify";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsmElement {
    pub name: String,
    attributes: Vec<(String, String)>,
    children: Vec<OsmElement>,
    text: Option<String>,
}

impl OsmElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// New `<node>` with `action="modify"` and one `<tag>` per entry.
    pub fn node(id: i64, location: Point, tags: &Tags) -> Self {
        let mut node = Self::new(NODE);
        node.set_attribute("id", &id.to_string());
        node.set_attribute(ACTION, MODIFY);
        node.set_attribute("lat", &location.lat.to_string());
        node.set_attribute("lon", &location.lon.to_string());
        for (key, value) in tags {
            node.children.push(tag_element(key, value));
        }
        node
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Sets an attribute in place, or appends it if absent.
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some((_, current)) => *current = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[OsmElement] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [OsmElement] {
        &mut self.children
    }

    pub fn push_child(&mut self, child: OsmElement) {
        self.children.push(child);
    }

    /// Character content, such as the body of `<note>` or `<meta>`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }

    /// Drops surrounding whitespace, and the text itself if nothing else is
    /// left.
    pub(crate) fn trim_text(&mut self) {
        self.text = self
            .text
            .take()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.attribute("id")?.parse().ok()
    }

    /// Position of a node, if it carries valid `lat`/`lon` attributes.
    #[must_use]
    pub fn location(&self) -> Option<Point> {
        let lat = self.attribute("lat")?.parse().ok()?;
        let lon = self.attribute("lon")?.parse().ok()?;
        Point::new(lon, lat).ok()
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tag_children()
            .find(|child| child.attribute(KEY) == Some(key))
            .and_then(|child| child.attribute(VALUE))
    }

    /// All `<tag>` children. A repeated key keeps its last value.
    #[must_use]
    pub fn tags(&self) -> Tags {
        self.tag_children()
            .filter_map(|child| Some((child.attribute(KEY)?, child.attribute(VALUE)?)))
            .collect()
    }

    /// Updates the first `<tag>` with `key`, or appends a new one.
    pub fn set_tag(&mut self, key: &str, value: &str) {
        let existing = self
            .children
            .iter_mut()
            .find(|child| child.is(TAG) && child.attribute(KEY) == Some(key));
        match existing {
            Some(tag) => tag.set_attribute(VALUE, value),
            None => self.children.push(tag_element(key, value)),
        }
    }

    /// Removes every `<tag>` with `key`. Returns whether any was removed.
    pub fn remove_tag(&mut self, key: &str) -> bool {
        let before = self.children.len();
        self.children
            .retain(|child| !(child.is(TAG) && child.attribute(KEY) == Some(key)));
        self.children.len() != before
    }

    pub fn mark_modified(&mut self) {
        self.set_attribute(ACTION, MODIFY);
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.attribute(ACTION) == Some(MODIFY)
    }

    fn tag_children(&self) -> impl Iterator<Item = &OsmElement> {
        self.children.iter().filter(|child| child.is(TAG))
    }

    pub(crate) fn from_parts(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
            text: None,
        }
    }
}

fn tag_element(key: &str, value: &str) -> OsmElement {
    OsmElement::from_parts(
        TAG.to_string(),
        vec![
            (KEY.to_string(), key.to_string()),
            (VALUE.to_string(), value.to_string()),
        ],
    )
}

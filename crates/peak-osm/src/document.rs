//! OSM XML document: parsing, handle-based editing and output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use peak_model::{ExternalHandle, MapDocument, MaterializedPeak};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, warn};

use crate::element::{NODE, OsmElement};
use crate::error::{OsmError, Result};

const ROOT: &str = "osm";
const API_VERSION: &str = "0.6";
/// Id of the first node added by the merge; later nodes count down from it.
pub const FIRST_NEW_NODE_ID: i64 = -1001;

/// An `<osm>` document. Top-level elements are addressed by
/// [`ExternalHandle`]s that stay valid for the document's lifetime, since
/// elements are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsmDocument {
    root: OsmElement,
}

impl Default for OsmDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OsmDocument {
    /// Empty `<osm version="0.6">` document.
    pub fn new() -> Self {
        let mut root = OsmElement::new(ROOT);
        root.set_attribute("version", API_VERSION);
        Self { root }
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut open: Vec<OsmElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => open.push(element_from(e)?),
                Event::Empty(ref e) => {
                    let element = element_from(e)?;
                    close(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = open
                        .pop()
                        .ok_or_else(|| OsmError::Malformed("unexpected end tag".to_string()))?;
                    element.trim_text();
                    close(&mut open, &mut root, element)?;
                }
                Event::Text(ref e) => {
                    if let Some(parent) = open.last_mut() {
                        parent.push_text(&e.decode().map_err(quick_xml::Error::from)?);
                    }
                }
                Event::GeneralRef(ref e) => {
                    let resolved = resolve_reference(e)?;
                    if let Some(parent) = open.last_mut() {
                        parent.push_text(&resolved);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(OsmError::Malformed(format!("unclosed <{}>", unclosed.name)));
        }
        let root = root.ok_or_else(|| OsmError::Malformed("empty document".to_string()))?;
        if !root.is(ROOT) {
            return Err(OsmError::NotOsm { found: root.name });
        }
        debug!(elements = root.children().len(), "parsed OSM document");
        Ok(Self { root })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|source| OsmError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&xml)
    }

    #[must_use]
    pub fn root(&self) -> &OsmElement {
        &self.root
    }

    pub fn set_root_attribute(&mut self, key: &str, value: &str) {
        self.root.set_attribute(key, value);
    }

    /// Sets the `generator` and `upload="false"` attributes on the root.
    pub fn mark_generated(&mut self, generator: &str) {
        self.root.set_attribute("generator", generator);
        self.root.set_attribute("upload", "false");
    }

    #[must_use]
    pub fn elements(&self) -> &[OsmElement] {
        self.root.children()
    }

    #[must_use]
    pub fn element(&self, handle: ExternalHandle) -> Option<&OsmElement> {
        self.root.children().get(handle.raw())
    }

    pub fn element_mut(&mut self, handle: ExternalHandle) -> Option<&mut OsmElement> {
        self.root.children_mut().get_mut(handle.raw())
    }

    /// Top-level `<node>` elements with their handles.
    pub fn nodes(&self) -> impl Iterator<Item = (ExternalHandle, &OsmElement)> {
        self.elements()
            .iter()
            .enumerate()
            .filter(|(_, element)| element.is(NODE))
            .map(|(index, element)| (ExternalHandle::new(index), element))
    }

    #[must_use]
    pub fn modified_count(&self) -> usize {
        self.elements()
            .iter()
            .filter(|element| element.is_modified())
            .count()
    }

    /// Id for the next added node: [`FIRST_NEW_NODE_ID`], or one below the
    /// lowest id already in the document.
    pub fn next_new_id(&self) -> Result<i64> {
        let lowest = self
            .elements()
            .iter()
            .filter_map(OsmElement::id)
            .fold(FIRST_NEW_NODE_ID + 1, i64::min);
        lowest
            .checked_sub(1)
            .ok_or(OsmError::IdsExhausted { lowest })
    }

    /// Appends one node per peak and returns the assigned ids. Nothing is
    /// appended if the ids would run past `i64::MIN`.
    pub fn append_nodes(&mut self, peaks: &[MaterializedPeak]) -> Result<Vec<i64>> {
        let first = self.next_new_id()?;
        let ids = (0..peaks.len())
            .map(|offset| {
                i64::try_from(offset)
                    .ok()
                    .and_then(|offset| first.checked_sub(offset))
                    .ok_or(OsmError::IdsExhausted { lowest: first })
            })
            .collect::<Result<Vec<_>>>()?;
        for (id, peak) in ids.iter().zip(peaks) {
            self.root
                .push_child(OsmElement::node(*id, peak.location, &peak.tags));
        }
        Ok(ids)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut xml = Writer::new_with_indent(writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_element(&mut xml, &self.root)?;
        xml.get_mut().write_all(b"\n")?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| OsmError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(|source| OsmError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        String::from_utf8(bytes).map_err(|err| OsmError::Malformed(err.to_string()))
    }

    fn node_mut(&mut self, handle: ExternalHandle) -> Option<&mut OsmElement> {
        let element = self.element_mut(handle);
        if element.is_none() {
            warn!(handle = handle.raw(), "no element for handle");
        }
        element
    }
}

impl MapDocument for OsmDocument {
    fn set_tag(&mut self, handle: ExternalHandle, key: &str, value: &str) {
        if let Some(element) = self.node_mut(handle) {
            element.set_tag(key, value);
        }
    }

    fn remove_tag(&mut self, handle: ExternalHandle, key: &str) {
        if let Some(element) = self.node_mut(handle) {
            element.remove_tag(key);
        }
    }

    fn mark_modified(&mut self, handle: ExternalHandle) {
        if let Some(element) = self.node_mut(handle) {
            element.mark_modified();
        }
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<OsmElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(OsmElement::from_parts(name, attributes))
}

/// Text for a `&name;` or `&#NN;` reference inside character content.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| OsmError::Malformed(format!("unknown entity &{name};")))
}

/// Attaches a finished element to its parent, or makes it the root.
fn close(
    open: &mut [OsmElement],
    root: &mut Option<OsmElement>,
    element: OsmElement,
) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.push_child(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(OsmError::Malformed(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

fn write_element<W: Write>(xml: &mut Writer<W>, element: &OsmElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }
    if element.children().is_empty() && element.text().is_none() {
        xml.write_event(Event::Empty(start))?;
        return Ok(());
    }
    xml.write_event(Event::Start(start))?;
    if let Some(text) = element.text() {
        xml.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in element.children() {
        write_element(xml, child)?;
    }
    xml.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

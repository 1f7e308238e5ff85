//! Tag dictionary with the well-known keys used by the reconciliation passes.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

/// Well-known tag keys.
pub mod keys {
    pub const NAME: &str = "name";
    /// Key prefixes (before any `:`) that carry a name.
    pub const NAME_FAMILY: [&str; 5] = ["name", "alt_name", "old_name", "loc_name", "official_name"];
    pub const NATURAL: &str = "natural";
    pub const PLACE: &str = "place";
    pub const ELE: &str = "ele";
    pub const MAN_MADE: &str = "man_made";
    pub const SSR_TYPE: &str = "SSR_TYPE";

    /// Distance to the record that was merged in.
    pub const GAP: &str = "GAP";
    /// Manual inspection needed; value is the distance to the candidate.
    pub const CHECK: &str = "CHECK";
    /// Another place name within a short distance.
    pub const CLOSE: &str = "CLOSE";
    /// Probable duplicate; value is the distance to the other record.
    pub const DUPLICATE: &str = "DUPLICATE";
    pub const JARO_WINKLER: &str = "JARO_WINKLER";
}

/// Well-known tag values.
pub mod values {
    pub const PEAK: &str = "peak";
    pub const HILL: &str = "hill";
    pub const LOCALITY: &str = "locality";
    pub const SURVEY_POINT: &str = "survey_point";
    /// `natural` values that make an existing map node a peak record.
    pub const ELEVATION_KINDS: [&str; 4] = ["peak", "hill", "mountain_range", "ridge"];
}

/// Key/value attributes of a record. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True when `key` is present with exactly `value`.
    pub fn has(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Sets `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keys whose colon-delimited prefix belongs to the name family.
    pub fn name_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|key| {
            let prefix = key.split(':').next().unwrap_or_default();
            keys::NAME_FAMILY.contains(&prefix)
        })
    }

    /// Current elevation from the `ele` tag.
    pub fn elevation(&self) -> Elevation {
        match self.get(keys::ELE) {
            None => Elevation::Missing,
            Some(raw) => match parse_elevation(raw) {
                Some(metres) => Elevation::Metres(metres),
                None => Elevation::Unparseable,
            },
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Elevation read from the `ele` tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Elevation {
    Missing,
    Metres(f64),
    /// Present but not a plain decimal number. Comparisons against it are
    /// indeterminate.
    Unparseable,
}

/// Parses an unsigned decimal with at most one decimal point.
fn parse_elevation(raw: &str) -> Option<f64> {
    let digits = raw.replacen('.', "", 1);
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

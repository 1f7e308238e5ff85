//! Tag merging between matched records.
//!
//! Writes to a record bound to a map node are mirrored to the [`MapDocument`]
//! so the node and the in-memory tags never diverge.

use peak_model::{Elevation, MapDocument, PeakRecord, Tags, keys, values};

/// Separator used when a preserved key already holds an older value.
const PRESERVED_SEPARATOR: char = ';';

/// Applies tag writes to a record and, when bound, to its map node.
struct TagWriter<'a> {
    record: &'a mut PeakRecord,
    document: &'a mut dyn MapDocument,
    modified: bool,
}

impl<'a> TagWriter<'a> {
    fn new(record: &'a mut PeakRecord, document: &'a mut dyn MapDocument) -> Self {
        Self {
            record,
            document,
            modified: false,
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.record.tags.insert(key, value);
        if let Some(handle) = self.record.handle {
            self.document.set_tag(handle, key, value);
        }
        self.modified = true;
    }

    fn remove(&mut self, key: &str) {
        if self.record.tags.remove(key).is_none() {
            return;
        }
        if let Some(handle) = self.record.handle {
            self.document.remove_tag(handle, key);
        }
        self.modified = true;
    }

    fn preserved_key(&self, key: &str) -> String {
        format!("{}{key}", self.record.origin.preserved_prefix())
    }

    /// Keeps `old` under the origin prefix, appending if that key is taken.
    fn preserve(&mut self, key: &str, old: &str) {
        let preserved_key = self.preserved_key(key);
        let value = match self.record.tags.get(&preserved_key) {
            None => old.to_string(),
            Some(existing) if existing.split(PRESERVED_SEPARATOR).any(|part| part == old) => {
                return;
            }
            Some(existing) => format!("{existing}{PRESERVED_SEPARATOR}{old}"),
        };
        self.set(&preserved_key, &value);
    }

    fn finish(self) -> bool {
        if self.modified
            && let Some(handle) = self.record.handle
        {
            self.document.mark_modified(handle);
        }
        self.modified
    }
}

/// Merges `donor` into `recipient`.
///
/// New keys are added. Conflicting `GAP` values keep the larger distance and
/// conflicting `CHECK` values the smaller one; any other conflict keeps the
/// recipient's value under a prefixed key (for instance `OSM_name`) before the
/// donor's value is written. A donor `natural=peak` removes `place=locality`
/// from the recipient.
///
/// Returns whether the recipient changed.
pub fn merge_tags(
    recipient: &mut PeakRecord,
    donor: &Tags,
    document: &mut dyn MapDocument,
) -> bool {
    let mut writer = TagWriter::new(recipient, document);

    for (key, value) in donor {
        let current = writer.record.tags.get(key).map(str::to_string);
        match current {
            None => writer.set(key, value),
            Some(current) if current == *value => {}
            Some(current) => match resolve_numeric(key, &current, value) {
                Some(resolved) if resolved == current => {}
                Some(resolved) => writer.set(key, &resolved),
                None => {
                    writer.preserve(key, &current);
                    writer.set(key, value);
                }
            },
        }
    }

    if donor.has(keys::NATURAL, values::PEAK)
        && writer.record.tags.has(keys::PLACE, values::LOCALITY)
    {
        writer.remove(keys::PLACE);
    }

    writer.finish()
}

/// Writes a single tag and marks the record modified.
pub fn add_tag(record: &mut PeakRecord, document: &mut dyn MapDocument, key: &str, value: &str) {
    let mut writer = TagWriter::new(record, document);
    writer.set(key, value);
    writer.finish();
}

/// Replaces the value of `key` and writes the previous value to the origin
/// prefixed key, overwriting whatever that key held. Returns `false` if the
/// key was absent or already held `value`.
pub fn reclassify(
    record: &mut PeakRecord,
    document: &mut dyn MapDocument,
    key: &str,
    value: &str,
) -> bool {
    let Some(current) = record.tags.get(key).map(str::to_string) else {
        return false;
    };
    if current == value {
        return false;
    }
    let mut writer = TagWriter::new(record, document);
    let preserved_key = writer.preserved_key(key);
    writer.set(key, value);
    writer.set(&preserved_key, &current);
    writer.finish()
}

pub fn current_elevation(record: &PeakRecord) -> Elevation {
    record.tags.elevation()
}

/// Conflict rule for the numeric marker keys. `None` means the generic rule
/// applies, which includes markers that are not integers.
fn resolve_numeric(key: &str, current: &str, incoming: &str) -> Option<String> {
    let pick: fn(i64, i64) -> i64 = match key {
        keys::GAP => std::cmp::max::<i64>,
        keys::CHECK => std::cmp::min::<i64>,
        _ => return None,
    };
    let current = current.trim().parse::<i64>().ok()?;
    let incoming = incoming.trim().parse::<i64>().ok()?;
    Some(pick(current, incoming).to_string())
}

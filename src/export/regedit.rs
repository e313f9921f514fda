//! `REGEDIT4` export of the registry entries.

use crate::descriptor::Descriptor;
use crate::value::escape_regedit;

/// First line of every export.
pub const REGEDIT_HEADER: &str = "REGEDIT4";

/// Renders the registry entries as `.reg` text.
///
/// A `[path]` section starts whenever an entry's hive differs from the
/// previous entry's, so non-contiguous entries of one hive produce repeated
/// sections.
pub fn render(descriptor: &Descriptor) -> String {
    let mut out = String::from(REGEDIT_HEADER);
    out.push('\n');

    let mut current_hive = None;
    for entry in &descriptor.registry_entries {
        if current_hive != Some(entry.hive_id) {
            out.push_str(&format!("\n[{}]\n", entry.path));
            current_hive = Some(entry.hive_id);
        }

        match &entry.name {
            Some(name) => out.push_str(&format!("\"{}\"=", escape_regedit(name))),
            None => out.push_str("@="),
        }
        out.push_str(&entry.value.to_regedit());
        out.push('\n');
    }

    out
}

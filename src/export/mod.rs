//! Renderers consuming a decoded [`Descriptor`].
//!
//! - [`json`]: nested structured record with camelCase keys
//! - [`regedit`]: `REGEDIT4` text of the registry entries
//! - [`summary`]: one `field: value` line per top-level field

pub mod json;
pub mod regedit;
pub mod summary;

use crate::descriptor::Descriptor;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON.
    Json,
    /// `.reg` file text.
    Regedit,
    /// Full plain summary.
    Summary,
    /// Application name, architecture and version bounds only.
    Basic,
}

impl ExportFormat {
    /// Renders `descriptor` in this format.
    pub fn render(self, descriptor: &Descriptor) -> serde_json::Result<String> {
        match self {
            ExportFormat::Json => json::to_string_pretty(descriptor),
            ExportFormat::Regedit => Ok(regedit::render(descriptor)),
            ExportFormat::Summary => Ok(summary::render(descriptor)),
            ExportFormat::Basic => Ok(summary::render_basic(descriptor)),
        }
    }
}

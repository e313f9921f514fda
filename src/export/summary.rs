//! Plain-text summary of the top-level fields.

use crate::descriptor::Descriptor;

/// Field names accepted by [`field`], in output order.
pub const FIELDS: [&str; 8] = [
    "appName",
    "provider",
    "architecture",
    "unsupported",
    "minCeVersion",
    "maxCeVersion",
    "minCeBuildNumber",
    "maxCeBuildNumber",
];

const BASIC_FIELDS: [&str; 4] = ["appName", "architecture", "minCeVersion", "maxCeVersion"];

/// Returns the text of one top-level field.
///
/// `None` if the field is absent from this descriptor or the name is not
/// one of [`FIELDS`].
pub fn field(descriptor: &Descriptor, name: &str) -> Option<String> {
    match name {
        "appName" => Some(descriptor.app_name.clone()),
        "provider" => Some(descriptor.provider.clone()),
        "architecture" => descriptor.architecture.map(|a| a.name().to_string()),
        "unsupported" => {
            (!descriptor.unsupported.is_empty()).then(|| descriptor.unsupported.join(", "))
        }
        "minCeVersion" => descriptor.min_ce_version().map(|v| v.to_string()),
        "maxCeVersion" => descriptor.max_ce_version().map(|v| v.to_string()),
        "minCeBuildNumber" => descriptor.min_ce_build().map(|b| b.to_string()),
        "maxCeBuildNumber" => descriptor.max_ce_build().map(|b| b.to_string()),
        _ => None,
    }
}

fn render_fields(descriptor: &Descriptor, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|&name| field(descriptor, name).map(|value| format!("{}: {}\n", name, value)))
        .collect()
}

/// Renders every present top-level field, one `name: value` line each.
pub fn render(descriptor: &Descriptor) -> String {
    render_fields(descriptor, &FIELDS)
}

/// Renders application name, architecture and version bounds.
pub fn render_basic(descriptor: &Descriptor) -> String {
    render_fields(descriptor, &BASIC_FIELDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{CeVersion, Header};

    fn descriptor() -> Descriptor {
        let header = Header {
            architecture_code: 2577,
            min_ce_version: CeVersion { major: 3, minor: 0 },
            max_ce_build: 9999,
            ..Header::default()
        };
        Descriptor {
            architecture: header.architecture(),
            header,
            app_name: "Solitaire".into(),
            provider: "Acme".into(),
            unsupported: vec!["HPC".into(), "PALM PC".into()],
            directories: Vec::new(),
            files: Vec::new(),
            reg_hives: Vec::new(),
            registry_entries: Vec::new(),
            links: Vec::new(),
        }
    }

    #[test]
    fn test_render_skips_absent_fields() {
        assert_eq!(
            render(&descriptor()),
            "appName: Solitaire\n\
             provider: Acme\n\
             architecture: ARM\n\
             unsupported: HPC, PALM PC\n\
             minCeVersion: 3.0\n\
             maxCeBuildNumber: 9999\n"
        );
    }

    #[test]
    fn test_render_basic() {
        assert_eq!(
            render_basic(&descriptor()),
            "appName: Solitaire\narchitecture: ARM\nminCeVersion: 3.0\n"
        );
    }

    #[test]
    fn test_field() {
        let d = descriptor();
        assert_eq!(field(&d, "provider").as_deref(), Some("Acme"));
        assert_eq!(field(&d, "maxCeVersion"), None);
        assert_eq!(field(&d, "nonsense"), None);
    }
}

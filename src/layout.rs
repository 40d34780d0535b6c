//! Form layouts: which fields a package form shows and how they are grouped

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::errors::FormError;
use crate::models::{FieldDescriptor, FieldKind};

/// A complete form: title, optional description and its items.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutSpec {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub items: Vec<LayoutItem>,
}

/// A top-level field or a collapsible section of items.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutItem {
    Field(FieldDescriptor),
    Section(SectionSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionSpec {
    pub title: String,
    #[serde(default)]
    pub expanded: bool,
    pub items: Vec<LayoutItem>,
}

impl LayoutSpec {
    pub fn from_json(json: &str, origin: &str) -> Result<Self, FormError> {
        serde_json::from_str(json).map_err(|source| FormError::LayoutParse {
            path: origin.to_string(),
            source,
        })
    }

    /// Number of fields, including those inside sections.
    pub fn field_count(&self) -> usize {
        fn count(items: &[LayoutItem]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    LayoutItem::Field(_) => 1,
                    LayoutItem::Section(section) => count(&section.items),
                })
                .sum()
        }
        count(&self.items)
    }
}

/// Load a layout from a JSON file.
pub async fn load_layout(path: &Path) -> Result<LayoutSpec, FormError> {
    let json = tokio::fs::read_to_string(path).await?;
    let layout = LayoutSpec::from_json(&json, &path.display().to_string())?;
    info!(
        "Loaded layout '{}' with {} fields from {}",
        layout.title,
        layout.field_count(),
        path.display()
    );
    Ok(layout)
}

/// Look up a layout shipped with the binary.
pub fn builtin(name: &str) -> Result<LayoutSpec, FormError> {
    match name.to_lowercase().as_str() {
        "windows" => Ok(windows_package()),
        other => Err(FormError::UnknownLayout(other.to_string())),
    }
}

/// Options for packaging a web app for the Microsoft Store.
pub fn windows_package() -> LayoutSpec {
    let field = LayoutItem::Field;

    LayoutSpec {
        title: "Windows app options".to_string(),
        description: Some("Customize your Windows package below".to_string()),
        items: vec![
            field(
                FieldDescriptor::new("Package ID", FieldKind::Text)
                    .with_name("packageId")
                    .with_placeholder("MyCompany.MyApp")
                    .with_tooltip(
                        "The Package ID uniquely identifying your app in the Microsoft Store. Get this value from Windows Partner Center.",
                        Some("https://docs.pwabuilder.com/#/builder/windows"),
                    )
                    .required()
                    .with_length(Some(3), Some(50))
                    .with_pattern("[a-zA-Z0-9.-]*$")
                    .with_spellcheck(false)
                    .with_validation_message(
                        "Package ID must contain only letters, numbers, periods, or hyphens, and be 3-50 characters",
                    ),
            ),
            field(
                FieldDescriptor::new("Publisher display name", FieldKind::Text)
                    .with_name("publisherDisplayName")
                    .with_placeholder("Contoso Inc")
                    .with_tooltip(
                        "The display name of your app's publisher. Get this value from Windows Partner Center.",
                        None,
                    )
                    .required()
                    .with_length(Some(3), None)
                    .with_validation_message(
                        "Publisher display name must be at least 3 characters",
                    ),
            ),
            field(
                FieldDescriptor::new("Publisher ID", FieldKind::Text)
                    .with_name("publisherId")
                    .with_placeholder("CN=3a54a224-05dd-42aa-85bd-3f3c1478fdca")
                    .with_tooltip(
                        "The ID of your app's publisher. Get this value from Windows Partner Center.",
                        None,
                    )
                    .required()
                    .with_pattern("CN=.+")
                    .with_spellcheck(false)
                    .with_validation_message("Publisher ID must be in the format CN=XXXX"),
            ),
            LayoutItem::Section(SectionSpec {
                title: "All Settings".to_string(),
                expanded: false,
                items: vec![
                    field(
                        FieldDescriptor::new("App version", FieldKind::Text)
                            .with_name("version")
                            .with_value("1.0.1")
                            .with_tooltip(
                                "Your app's version in the form of '1.0.0'. It must not start with zero and must be greater than classic package version.",
                                None,
                            )
                            .required()
                            .with_pattern("^[1-9]\\d*\\.\\d+\\.\\d+$")
                            .with_spellcheck(false)
                            .with_validation_message(
                                "Version must be in the form of '1.0.0' and cannot start with zero",
                            ),
                    ),
                    field(
                        FieldDescriptor::new("Classic package version", FieldKind::Text)
                            .with_name("classicVersion")
                            .with_value("1.0.0")
                            .with_tooltip(
                                "The version of your app that runs on older versions of Windows.",
                                None,
                            )
                            .required()
                            .with_pattern("^[1-9]\\d*\\.\\d+\\.\\d+$")
                            .with_spellcheck(false)
                            .with_validation_message(
                                "Classic package version must be in the form of '1.0.0' and cannot start with zero",
                            ),
                    ),
                    field(
                        FieldDescriptor::new("Start URL", FieldKind::Url)
                            .with_name("url")
                            .with_placeholder("https://example.com/")
                            .required(),
                    ),
                    field(
                        FieldDescriptor::new("App name", FieldKind::Text)
                            .with_name("name")
                            .with_placeholder("My Awesome PWA")
                            .required(),
                    ),
                    field(
                        FieldDescriptor::new("Target device families", FieldKind::Text)
                            .with_name("targetDeviceFamilies")
                            .with_value(crate::models::FieldValue::Multiple(vec![
                                "Desktop".to_string(),
                                "Holographic".to_string(),
                            ])),
                    ),
                    field(
                        FieldDescriptor::new("Enable Chromium Web Share", FieldKind::Checkbox)
                            .with_name("enableWebShare")
                            .checked(true),
                    ),
                    LayoutItem::Section(SectionSpec {
                        title: "Signing".to_string(),
                        expanded: false,
                        items: vec![
                            field(
                                FieldDescriptor::new("Let the tool sign the package", FieldKind::Radio)
                                    .with_name("signingMode")
                                    .with_value("generate")
                                    .checked(true),
                            ),
                            field(
                                FieldDescriptor::new("I'll sign it myself", FieldKind::Radio)
                                    .with_name("signingMode")
                                    .with_value("none"),
                            ),
                        ],
                    }),
                ],
            }),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_layouts() {
        let layout = builtin("Windows").unwrap();
        assert_eq!(layout.field_count(), 11);
        assert!(matches!(builtin("ios"), Err(FormError::UnknownLayout(_))));
    }

    #[test]
    fn test_parse_nested_sections() {
        let json = r#"{
            "title": "Android options",
            "items": [
                { "field": { "label": "Package ID", "name": "packageId", "required": true } },
                { "section": {
                    "title": "Advanced",
                    "items": [
                        { "field": { "label": "Version code", "type": "number", "minValue": 1 } }
                    ]
                } }
            ]
        }"#;
        let layout = LayoutSpec::from_json(json, "inline").unwrap();
        assert_eq!(layout.field_count(), 2);
        match &layout.items[1] {
            LayoutItem::Section(section) => {
                assert!(!section.expanded);
                assert_eq!(section.title, "Advanced");
            }
            other => panic!("expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = LayoutSpec::from_json("{ not json", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[tokio::test]
    async fn test_load_layout_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "title": "Meta Quest", "items": [ {{ "field": {{ "label": "Host" }} }} ] }}"#
        )
        .unwrap();

        let layout = load_layout(file.path()).await.unwrap();
        assert_eq!(layout.title, "Meta Quest");
        assert_eq!(layout.field_count(), 1);

        let missing = load_layout(Path::new("/no/such/layout.json")).await;
        assert!(matches!(missing, Err(FormError::Io(_))));
    }
}

//! Typed dashboard layout.
//!
//! Tabs and color palettes are persisted as JSON. These types give that JSON a
//! concrete shape and are used to validate every snapshot on read. Keys the
//! model does not know about are kept in `extra` so a snapshot written back
//! out is the same document that was read.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::SnapshotError;

/// How a component renders its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Table,
    Calendar,
    Cards,
    Pipeline,
    List,
    Route,
}

/// Header style of a pipeline stage card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    Default,
    Rounded,
    Arrow,
    Minimal,
}

/// One column of a pipeline view.
///
/// Optional keys are `Option<Option<_>>`: `None` when the key is absent,
/// `Some(None)` when it is stored as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PipelineStage {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub color_secondary: Option<Option<String>>,
    #[serde(
        rename = "textColor",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub text_color: Option<Option<String>>,
    pub order: i32,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<CardStyle>))]
    pub card_style: Option<Option<CardStyle>>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

/// Stages of a pipeline component and where new items land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PipelineConfig {
    pub stages: Vec<PipelineStage>,
    pub default_stage_id: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

/// A component shown inside a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TabComponent {
    pub id: String,
    pub label: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<ViewType>))]
    pub view: Option<Option<ViewType>>,
    #[serde(
        rename = "dataSource",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub data_source: Option<Option<String>>,
    #[serde(
        rename = "availableViews",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<ViewType>>))]
    pub available_views: Option<Option<Vec<ViewType>>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<PipelineConfig>))]
    pub pipeline: Option<Option<PipelineConfig>>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

impl TabComponent {
    #[must_use]
    pub fn view(&self) -> Option<ViewType> {
        self.view.flatten()
    }

    #[must_use]
    pub fn pipeline(&self) -> Option<&PipelineConfig> {
        self.pipeline.as_ref().and_then(Option::as_ref)
    }
}

/// A navigation tab of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tab {
    pub id: String,
    pub label: String,
    pub icon: String,
    /// `None` when the stored tab has no `components` key.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<TabComponent>>))]
    pub components: Option<Vec<TabComponent>>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: Map<String, Value>,
}

impl Tab {
    /// A tab with no components.
    pub fn new(id: impl Into<String>, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: icon.into(),
            components: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn components(&self) -> &[TabComponent] {
        self.components.as_deref().unwrap_or_default()
    }
}

// A key that is present decodes to `Some`, even when its value is `null`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// A key that is present must hold a value; `null` is rejected.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Color role name to color value (`primary` -> `#3B82F6`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct ColorPalette(pub BTreeMap<String, String>);

impl ColorPalette {
    #[must_use]
    pub fn get(&self, role: &str) -> Option<&str> {
        self.0.get(role).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColorPalette {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Decode a stored `tabs` document.
///
/// `null` decodes to an empty layout. Tab ids must be non-empty and unique.
pub fn decode_tabs(value: &Value) -> Result<Vec<Tab>, SnapshotError> {
    if value.is_null() {
        return Ok(Vec::new());
    }

    let tabs: Vec<Tab> =
        serde_json::from_value(value.clone()).map_err(|e| SnapshotError::malformed("tabs", e))?;

    let mut seen = HashSet::with_capacity(tabs.len());
    for (position, tab) in tabs.iter().enumerate() {
        if tab.id.trim().is_empty() {
            return Err(SnapshotError::EmptyTabId { position });
        }
        if !seen.insert(tab.id.as_str()) {
            return Err(SnapshotError::DuplicateTabId(tab.id.clone()));
        }
    }

    Ok(tabs)
}

/// Decode a stored `colors` document. `null` means no custom palette.
pub fn decode_colors(value: &Value) -> Result<Option<ColorPalette>, SnapshotError> {
    if value.is_null() {
        return Ok(None);
    }

    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| SnapshotError::malformed("colors", e))
}

/// Encode tabs for storage.
pub fn encode_tabs(tabs: &[Tab]) -> Result<Value, SnapshotError> {
    serde_json::to_value(tabs).map_err(|e| SnapshotError::malformed("tabs", e))
}

/// Encode a palette for storage; an absent palette is stored as `null`.
pub fn encode_colors(colors: Option<&ColorPalette>) -> Result<Value, SnapshotError> {
    match colors {
        Some(palette) => {
            serde_json::to_value(palette).map_err(|e| SnapshotError::malformed("colors", e))
        }
        None => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline_tab() -> Value {
        json!([
            {
                "id": "clients_tab",
                "label": "Clients",
                "icon": "users",
                "components": [
                    {
                        "id": "pipeline",
                        "label": "Pipeline",
                        "view": "pipeline",
                        "dataSource": "clients",
                        "availableViews": ["pipeline", "table"],
                        "pipeline": {
                            "stages": [
                                {"id": "stage_1", "name": "New", "color": "#3B82F6", "order": 0},
                                {"id": "stage_2", "name": "Won", "color": "#10B981", "order": 1,
                                 "textColor": "#FFFFFF", "card_style": "rounded"}
                            ],
                            "default_stage_id": "stage_1"
                        }
                    }
                ]
            }
        ])
    }

    #[test]
    fn test_decode_full_tab() {
        let tabs = decode_tabs(&pipeline_tab()).unwrap();
        assert_eq!(tabs.len(), 1);

        let component = &tabs[0].components()[0];
        assert_eq!(component.view(), Some(ViewType::Pipeline));
        assert_eq!(component.data_source, Some(Some("clients".to_string())));

        let pipeline = component.pipeline().unwrap();
        assert_eq!(pipeline.stages[1].text_color, Some(Some("#FFFFFF".to_string())));
        assert_eq!(pipeline.stages[1].card_style, Some(Some(CardStyle::Rounded)));
        assert_eq!(pipeline.stages[0].card_style, None);
    }

    #[test]
    fn test_encode_preserves_document() {
        let original = pipeline_tab();
        let tabs = decode_tabs(&original).unwrap();
        assert_eq!(encode_tabs(&tabs).unwrap(), original);
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let original = json!([
            {"id": "t1", "label": "Jobs", "icon": "briefcase", "components": [], "badge": 3}
        ]);
        let tabs = decode_tabs(&original).unwrap();
        assert_eq!(tabs[0].extra.get("badge"), Some(&json!(3)));
        assert_eq!(encode_tabs(&tabs).unwrap(), original);
    }

    #[test]
    fn test_nested_unknown_keys_are_kept() {
        let original = json!([
            {"id": "t1", "label": "Deals", "icon": "chart", "components": [
                {"id": "c1", "label": "Board", "view": "pipeline", "pipeline": {
                    "stages": [
                        {"id": "s1", "name": "New", "color": "#000", "order": 0, "icon": "star"}
                    ],
                    "default_stage_id": "s1",
                    "collapsed": true
                }}
            ]}
        ]);
        let tabs = decode_tabs(&original).unwrap();

        let pipeline = tabs[0].components()[0].pipeline().unwrap();
        assert_eq!(pipeline.extra.get("collapsed"), Some(&json!(true)));
        assert_eq!(pipeline.stages[0].extra.get("icon"), Some(&json!("star")));
        assert_eq!(encode_tabs(&tabs).unwrap(), original);
    }

    #[test]
    fn test_explicit_nulls_are_kept() {
        let original = json!([
            {"id": "t1", "label": "Deals", "icon": "chart", "components": [
                {"id": "c1", "label": "Board", "view": null, "dataSource": null,
                 "availableViews": null, "pipeline": {
                    "stages": [
                        {"id": "s1", "name": "New", "color": "#000", "order": 0,
                         "color_secondary": null, "textColor": null, "card_style": null}
                    ],
                    "default_stage_id": "s1"
                }}
            ]}
        ]);
        let tabs = decode_tabs(&original).unwrap();

        let component = &tabs[0].components()[0];
        assert_eq!(component.view, Some(None));
        assert_eq!(component.view(), None);
        assert_eq!(component.pipeline().unwrap().stages[0].text_color, Some(None));
        assert_eq!(encode_tabs(&tabs).unwrap(), original);
    }

    #[test]
    fn test_null_components_rejected() {
        let err = decode_tabs(&json!([
            {"id": "t1", "label": "A", "icon": "x", "components": null}
        ]))
        .unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { field: "tabs", .. }));
    }

    #[test]
    fn test_null_tabs_decode_empty() {
        assert!(decode_tabs(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_missing_components_default_empty() {
        let original = json!([{"id": "t1", "label": "A", "icon": "x"}]);
        let tabs = decode_tabs(&original).unwrap();
        assert!(tabs[0].components().is_empty());
        assert_eq!(encode_tabs(&tabs).unwrap(), original);
    }

    #[test]
    fn test_tabs_must_be_array() {
        let err = decode_tabs(&json!({"id": "t1"})).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { field: "tabs", .. }));
    }

    #[test]
    fn test_unknown_view_type_rejected() {
        let err = decode_tabs(&json!([
            {"id": "t1", "label": "A", "icon": "x",
             "components": [{"id": "c", "label": "C", "view": "kanban"}]}
        ]))
        .unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { .. }));
    }

    #[test]
    fn test_empty_tab_id_rejected() {
        let err = decode_tabs(&json!([
            {"id": "t1", "label": "A", "icon": "x"},
            {"id": " ", "label": "B", "icon": "y"}
        ]))
        .unwrap_err();
        assert_eq!(err, SnapshotError::EmptyTabId { position: 1 });
    }

    #[test]
    fn test_duplicate_tab_id_rejected() {
        let err = decode_tabs(&json!([
            {"id": "t1", "label": "A", "icon": "x"},
            {"id": "t1", "label": "B", "icon": "y"}
        ]))
        .unwrap_err();
        assert_eq!(err, SnapshotError::DuplicateTabId("t1".to_string()));
    }

    #[test]
    fn test_colors_decode() {
        let palette = decode_colors(&json!({"primary": "#111111", "_headingFont": "Inter"}))
            .unwrap()
            .unwrap();
        assert_eq!(palette.get("primary"), Some("#111111"));
        assert_eq!(palette.len(), 2);
        assert!(decode_colors(&Value::Null).unwrap().is_none());
    }

    #[test]
    fn test_colors_reject_non_string_values() {
        let err = decode_colors(&json!({"primary": 12})).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { field: "colors", .. }));
    }

    #[test]
    fn test_absent_palette_encodes_null() {
        assert_eq!(encode_colors(None).unwrap(), Value::Null);
        let palette: ColorPalette = [("accent", "#FF0000")].into_iter().collect();
        assert_eq!(
            encode_colors(Some(&palette)).unwrap(),
            json!({"accent": "#FF0000"})
        );
    }
}

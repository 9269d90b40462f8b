use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step from a document root down to a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    /// Label for a dynamic-zone slot, e.g. `blocks_hero#2` for `blocks.hero`
    /// at index 2. Only the first `.` of the component name is replaced.
    pub fn component(component: &str, index: usize) -> Self {
        Self::Key(format!("{}#{index}", component.replacen('.', "_", 1)))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

pub type FieldPath = Vec<PathSegment>;

pub fn child_path(path: &[PathSegment], segment: PathSegment) -> FieldPath {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(segment);
    next
}

pub fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Page as listed by the content manager, projected to the fields used for
/// cross-environment matching. Timestamps are kept as returned by the API.
/// Every projected field is written back, absent ones as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub seo: Option<SeoMeta>,
    #[serde(default)]
    pub vuid: Option<String>,
    #[serde(default)]
    pub version_number: Option<i64>,
    #[serde(default)]
    pub versions: Option<Value>,
    #[serde(default)]
    pub is_visible_in_list_view: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl PageRecord {
    pub fn non_empty_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }

    pub fn non_empty_seo_title(&self) -> Option<&str> {
        self.seo
            .as_ref()
            .and_then(|seo| seo.title.as_deref())
            .filter(|title| !title.is_empty())
    }

    pub fn display_title(&self) -> &str {
        self.non_empty_title()
            .or_else(|| self.non_empty_seo_title())
            .unwrap_or("")
    }
}

/// Descriptive metadata sent alongside an uploaded binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: Value,
    pub caption: Value,
    pub alternative_text: Value,
    pub folder: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedRelation {
    pub path: FieldPath,
    pub link: Value,
}

impl UnresolvedRelation {
    /// `blocks_hero#0.cta: $12`, the line shown for manual follow-up.
    pub fn describe(&self) -> String {
        let source_id = self
            .link
            .get("page")
            .and_then(|page| page.get("id"))
            .map(|id| match id {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        format!("{}: ${}", format_path(&self.path), source_id)
    }
}

/// Clipboard wire format shared by an export and a later import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub form_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageRecord>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Idle,
    ConfirmPending,
    InProgress,
    Success,
    Error,
}

impl OperationStatus {
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            Self::InProgress => Some("Operation in progress."),
            Self::Success => Some("Operation completed successfully."),
            Self::Error => Some("Operation failed. Check the logs."),
            Self::Idle | Self::ConfirmPending => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    pub reuse_existing_assets: bool,
    pub match_page_relations: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            reuse_existing_assets: true,
            match_page_relations: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub bytes_written: usize,
    pub page_count: Option<usize>,
}

/// What the confirmation step shows before an import proceeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ImportPreview {
    Contents { raw: String },
    AccessNeeded { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFailure {
    pub field: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub fields_written: Vec<String>,
    pub fields_failed: Vec<FieldFailure>,
    pub unresolved: Vec<UnresolvedRelation>,
    pub finished_at: DateTime<Utc>,
}

//! Record Data Structures
//!
//! This module defines the `Record` struct shared by every hierarchical
//! collection the console manages (product categories, content categories,
//! tags).
//!
//! # Architecture
//!
//! - **Universal Record**: Single struct carries the fields the tree logic needs
//!   (`id`, `parent_id`, `sort_order`, `is_active`)
//! - **Tagged Kinds**: Family-specific fields live in [`RecordKind`], a tagged enum
//!   validated at the store boundary instead of an untyped JSON blob
//!
//! # Examples
//!
//! ```rust
//! use catalog_core::models::{Record, RecordKind};
//!
//! let shoes = Record::new_with_id(
//!     "shoes".to_string(),
//!     "Shoes".to_string(),
//!     None,
//!     RecordKind::category("shoes"),
//! );
//!
//! let boots = Record::new(
//!     "Boots".to_string(),
//!     Some(shoes.id.clone()),
//!     RecordKind::category("boots"),
//! );
//! assert!(boots.validate().is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

fn default_active() -> bool {
    true
}

/// Validation errors for Record operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid {kind} record: {reason}")]
    InvalidKind { kind: String, reason: String },

    #[error("Malformed record JSON: {0}")]
    InvalidJson(String),
}

impl ValidationError {
    /// Create a kind-specific validation error
    pub fn invalid_kind(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKind {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// Family-specific payload of a record
///
/// Serialized internally tagged, so a category looks like
/// `{"kind":"category","slug":"shoes",...}` once flattened into [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKind {
    /// Product category
    #[serde(rename_all = "camelCase")]
    Category {
        slug: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        product_count: u32,
    },

    /// CMS content category
    #[serde(rename_all = "camelCase")]
    ContentCategory {
        slug: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<String>,
    },

    /// Free-form tag (tags may be nested for grouping)
    Tag {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
}

impl RecordKind {
    /// Product category with no description and no products
    pub fn category(slug: impl Into<String>) -> Self {
        Self::Category {
            slug: slug.into(),
            description: None,
            product_count: 0,
        }
    }

    /// Content category with the default template
    pub fn content_category(slug: impl Into<String>) -> Self {
        Self::ContentCategory {
            slug: slug.into(),
            template: None,
        }
    }

    /// Uncoloured tag
    pub fn tag() -> Self {
        Self::Tag { color: None }
    }

    /// Stable name of the variant, as used in the `kind` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::Category { .. } => "category",
            Self::ContentCategory { .. } => "content_category",
            Self::Tag { .. } => "tag",
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Category { slug, .. } | Self::ContentCategory { slug, .. } => {
                if slug.trim().is_empty() {
                    return Err(ValidationError::invalid_kind(
                        self.name(),
                        "slug cannot be empty",
                    ));
                }
                if slug.chars().any(char::is_whitespace) {
                    return Err(ValidationError::invalid_kind(
                        self.name(),
                        format!("slug '{}' contains whitespace", slug),
                    ));
                }
                Ok(())
            }
            Self::Tag { color: Some(color) } if !is_hex_color(color) => Err(
                ValidationError::invalid_kind("tag", format!("color '{}' is not #rrggbb", color)),
            ),
            Self::Tag { .. } => Ok(()),
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Flat, externally sourced item of a hierarchical collection.
///
/// # Fields
///
/// - `id`: Unique identifier within a collection
/// - `parent_id`: Optional reference to the parent record. A reference that does
///   not resolve inside the same collection is treated as "no parent" by the tree builder
/// - `name`: Display name
/// - `sort_order`: Position hint for sort-order display (builders keep input order)
/// - `is_active`: Enabled/disabled flag flipped by batch operations
/// - `kind`: Family-specific payload
/// - `modified_at`: Timestamp of the last local or remote change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier
    pub id: String,

    /// Parent record ID (None for top-level records)
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Display name
    pub name: String,

    /// Sort position among siblings
    #[serde(default)]
    pub sort_order: i64,

    /// Whether the record is enabled
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Family-specific fields
    #[serde(flatten)]
    pub kind: RecordKind,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

impl Record {
    /// Create a new active Record with an auto-generated UUID
    pub fn new(name: String, parent_id: Option<String>, kind: RecordKind) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), name, parent_id, kind)
    }

    /// Create a new active Record with an explicit ID
    pub fn new_with_id(
        id: String,
        name: String,
        parent_id: Option<String>,
        kind: RecordKind,
    ) -> Self {
        Self {
            id,
            parent_id,
            name,
            sort_order: 0,
            is_active: true,
            kind,
            modified_at: Utc::now(),
        }
    }

    /// Set the sort order (builder style)
    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Set the active flag (builder style)
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Parse and validate a record received from a store
    ///
    /// This is the boundary check: anything that gets past it is safe for the
    /// tree and selection logic.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let record: Record = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Validate record structure
    ///
    /// ```rust
    /// # use catalog_core::models::{Record, RecordKind};
    /// let tag = Record::new("Sale".to_string(), None, RecordKind::tag());
    /// assert!(tag.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::InvalidParent(format!(
                "Record {} cannot be its own parent",
                self.id
            )));
        }

        self.kind.validate()
    }

    /// Check if this record declares no parent
    ///
    /// A record with a dangling parent is still rendered as a root, but this
    /// method only looks at the record itself.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Apply a sparse patch, returning whether anything changed
    pub fn apply_patch(&mut self, patch: &RecordPatch) -> bool {
        let mut changed = false;

        if let Some(is_active) = patch.is_active {
            changed |= self.is_active != is_active;
            self.is_active = is_active;
        }
        if let Some(name) = &patch.name {
            changed |= &self.name != name;
            self.name = name.clone();
        }
        if let Some(sort_order) = patch.sort_order {
            changed |= self.sort_order != sort_order;
            self.sort_order = sort_order;
        }
        if let Some(parent_id) = &patch.parent_id {
            changed |= &self.parent_id != parent_id;
            self.parent_id = parent_id.clone();
        }

        if changed {
            self.modified_at = Utc::now();
        }
        changed
    }
}

/// Accept both a plain value and `null` for double-Option fields
///
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial record update sent through `RecordStore::mutate_one`
///
/// `parent_id` uses the double-Option pattern:
///
/// - `None`: Don't change the parent
/// - `Some(None)`: Move the record to the top level
/// - `Some(Some(id))`: Re-parent under `id`
///
/// # Examples
///
/// ```rust
/// # use catalog_core::models::RecordPatch;
/// let patch = RecordPatch::disable();
/// assert_eq!(patch.is_active, Some(false));
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,
}

impl RecordPatch {
    /// Create a new empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that flips `is_active` on
    pub fn enable() -> Self {
        Self {
            is_active: Some(true),
            ..Default::default()
        }
    }

    /// Patch that flips `is_active` off
    pub fn disable() -> Self {
        Self {
            is_active: Some(false),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Check if the patch contains any changes
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none()
            && self.name.is_none()
            && self.sort_order.is_none()
            && self.parent_id.is_none()
    }
}

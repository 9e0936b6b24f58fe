use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Backend-assigned identifier. Supabase hands out integers, the Gist-backed
/// stores mint UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkId {
    Int(i64),
    Text(String),
}

impl LinkId {
    pub fn is_blank(&self) -> bool {
        match self {
            LinkId::Int(_) => false,
            LinkId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkId::Int(v) => write!(f, "{v}"),
            LinkId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for LinkId {
    fn from(v: i64) -> Self {
        LinkId::Int(v)
    }
}

impl From<&str> for LinkId {
    fn from(v: &str) -> Self {
        LinkId::Text(v.to_string())
    }
}

impl From<String> for LinkId {
    fn from(v: String) -> Self {
        LinkId::Text(v)
    }
}

/// A shared resource record in its client-facing (camelCase) shape. This is
/// also the shape stored inside the Gist document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// `None` only when a backend acknowledged an insert without echoing the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LinkId>,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub download_count: u64,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Link {
    pub fn from_new(id: Option<LinkId>, new: NewLink, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            url: new.url,
            code: new.code.unwrap_or_default(),
            description: new.description.unwrap_or_default(),
            tags: new.tags.unwrap_or_default(),
            download_count: 0,
            create_time: now,
            update_time: now,
        }
    }

    pub fn apply(&mut self, patch: LinkPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(count) = patch.download_count {
            self.download_count = count;
        }
        self.update_time = now;
    }

    pub fn has_id(&self, id: &LinkId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Fields accepted on create. Only `name` and `url` are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLink {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NewLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// Partial update. Absent fields are left untouched; serialized in the
/// persisted snake_case shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        alias = "downloadCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_count: Option<u64>,
}

/// The whole collection as persisted by the document-backed stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    SNAPSHOT_VERSION.to_string()
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            links: Vec::new(),
            last_update: None,
            version: default_version(),
        }
    }

    pub fn find(&self, id: &LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.has_id(id))
    }

    pub fn find_mut(&mut self, id: &LinkId) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.has_id(id))
    }

    /// Removes the link with `id`, returning it when present.
    pub fn remove(&mut self, id: &LinkId) -> Option<Link> {
        let pos = self.links.iter().position(|l| l.has_id(id))?;
        Some(self.links.remove(pos))
    }
}

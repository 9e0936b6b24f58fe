use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::links::link::{Link, LinkId, SNAPSHOT_VERSION, Snapshot};

/// Persisted snake_case row, as stored in the `links` table and returned by
/// `/api/data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LinkId>,
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_count: u64,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            name: r.name,
            url: r.url,
            code: r.code,
            description: r.description,
            tags: r.tags,
            download_count: r.download_count,
            create_time: r.create_time,
            update_time: r.update_time,
        }
    }
}

impl From<Link> for LinkRow {
    fn from(l: Link) -> Self {
        LinkRow {
            id: l.id,
            name: l.name,
            url: l.url,
            code: l.code,
            description: l.description,
            tags: l.tags,
            download_count: l.download_count,
            create_time: l.create_time,
            update_time: l.update_time,
        }
    }
}

/// Snapshot envelope whose links are rows; the `GET /api/data` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSnapshot {
    #[serde(default)]
    pub links: Vec<LinkRow>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default = "row_snapshot_version")]
    pub version: String,
}

fn row_snapshot_version() -> String {
    SNAPSHOT_VERSION.to_string()
}

impl From<Snapshot> for RowSnapshot {
    fn from(s: Snapshot) -> Self {
        RowSnapshot {
            links: s.links.into_iter().map(Into::into).collect(),
            last_update: s.last_update,
            version: s.version,
        }
    }
}

impl From<RowSnapshot> for Snapshot {
    fn from(s: RowSnapshot) -> Self {
        Snapshot {
            links: s.links.into_iter().map(Into::into).collect(),
            last_update: s.last_update,
            version: s.version,
        }
    }
}

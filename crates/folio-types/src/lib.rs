//! Wire types for the folio blog data document.
//!
//! The document is a single JSON object with an ordered `posts` array and a
//! `categories` object mapping category names to post counts. Every field a
//! hand-written data file may omit is optional here; normalization into the
//! domain model happens in the `folio` crate.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Stable post identifier. Data files use either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Number(value) => write!(f, "{value}"),
            PostId::Text(value) => f.write_str(value),
        }
    }
}

/// Top-level blog data document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogDocument {
    pub posts: Vec<PostRecord>,
    pub categories: Option<CategoryIndex>,
}

/// One post as stored in the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: PostId,
    pub slug: Option<String>,
    #[serde(default)]
    pub title: String,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub video: Option<String>,
    pub read_time: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub content: Option<Vec<ContentBlock>>,
}

/// Typed body block of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Paragraph {
        #[serde(default)]
        text: String,
    },
    Image {
        src: String,
        #[serde(default)]
        caption: Option<String>,
    },
    Video {
        #[serde(default)]
        src: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Category name with its post count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

/// Category index in document order.
///
/// Serialized as a JSON object; deserialization keeps the key order of the
/// source document because it is the display order of the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex(pub Vec<CategoryCount>);

impl CategoryIndex {
    pub fn entries(&self) -> &[CategoryCount] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<CategoryCount> {
        self.0
    }
}

impl Serialize for CategoryIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.name, &entry.count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoryIndexVisitor;

        impl<'de> Visitor<'de> for CategoryIndexVisitor {
            type Value = CategoryIndex;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object mapping category names to post counts")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, count)) = access.next_entry::<String, u64>()? {
                    entries.push(CategoryCount { name, count });
                }
                Ok(CategoryIndex(entries))
            }
        }

        deserializer.deserialize_map(CategoryIndexVisitor)
    }
}

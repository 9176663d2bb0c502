//! Data carried between the extraction stages of one page

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Anchor text → absolute URL, built per page (last write wins per text)
pub type LinkCandidates = BTreeMap<String, String>;

/// Field under which the source page URL is attached to a record
pub const SOURCE_URL_FIELD: &str = "url";

/// Intermediate extraction result prior to structured-record extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub content: String,
    pub author: Option<String>,
    pub publish_date: Option<NaiveDate>,
}

impl Article {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_publish_date(mut self, date: NaiveDate) -> Self {
        self.publish_date = Some(date);
        self
    }

    /// Returns true if there is text worth sending to the extraction service
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// A persisted structured fact extracted from one page
///
/// The attribute mapping is opaque to the crawler; only the source URL
/// field is ever written by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoRecord {
    fields: Map<String, Value>,
}

impl InfoRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a record from a JSON value; only objects qualify
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Attaches the page the record was extracted from
    pub fn with_source_url(mut self, url: &str) -> Self {
        self.fields
            .insert(SOURCE_URL_FIELD.to_string(), Value::String(url.to_string()));
        self
    }

    pub fn source_url(&self) -> Option<&str> {
        self.fields.get(SOURCE_URL_FIELD).and_then(Value::as_str)
    }
}

/// Links a custom extractor discovered, tagged by how they are meant to be used
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DiscoveredLinks {
    #[default]
    None,
    /// Anchor text → URL map handed to the extraction service as hints
    Hints(LinkCandidates),
    /// URLs to put straight onto the frontier
    Frontier(BTreeSet<String>),
}

impl DiscoveredLinks {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Hints(map) => map.is_empty(),
            Self::Frontier(urls) => urls.is_empty(),
        }
    }
}

/// Everything a custom extractor may produce for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomOutput {
    pub article: Option<Article>,
    pub links: DiscoveredLinks,
    pub records: Vec<InfoRecord>,
}

impl CustomOutput {
    /// Returns true if the extractor produced nothing at all
    pub fn is_empty(&self) -> bool {
        self.article.is_none() && self.links.is_empty() && self.records.is_empty()
    }
}

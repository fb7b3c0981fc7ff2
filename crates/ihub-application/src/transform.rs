//! Provider response normalization
//!
//! Maps provider-specific payloads onto one [`GenericRecord`] shape so that
//! sync and analytics code can treat every provider alike. Providers without
//! a dedicated mapping go through a generic fallback that keeps every scalar
//! field as a metric.

use chrono::{DateTime, SecondsFormat, Utc};
use ihub_domain::value_objects::IntegrationResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of entity a normalized record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A single video
    Video,
    /// A channel or account
    Channel,
    /// A marketplace product
    Product,
    /// Anything without a dedicated mapping
    Generic,
}

impl RecordKind {
    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Channel => "channel",
            Self::Product => "product",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-neutral view of one item returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericRecord {
    /// Provider-side identifier, empty when the payload has none
    pub id: String,
    /// Entity kind
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Provider that produced the item
    pub provider: String,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Long description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Public URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Thumbnail URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Counters such as views, likes, sales or rating
    #[serde(default)]
    pub metrics: Map<String, Value>,
    /// Category, tags, publication time and similar descriptors
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// The untouched provider payload
    #[serde(default)]
    pub raw: Value,
}

impl GenericRecord {
    fn new<P: Into<String>>(id: String, kind: RecordKind, provider: P) -> Self {
        Self {
            id,
            kind,
            provider: provider.into(),
            title: None,
            description: None,
            url: None,
            thumbnail: None,
            metrics: Map::new(),
            metadata: Map::new(),
            raw: Value::Null,
        }
    }
}

/// Marketplace whose product feed has a dedicated mapping
struct Marketplace {
    provider: &'static str,
    metrics: &'static [&'static str],
    keeps_tags: bool,
    product_url: fn(&str) -> String,
}

const OZON: Marketplace = Marketplace {
    provider: "ozon",
    metrics: &["views", "sales", "revenue", "rating"],
    keeps_tags: true,
    product_url: ozon_product_url,
};

const WILDBERRIES: Marketplace = Marketplace {
    provider: "wildberries",
    metrics: &["views", "sales", "revenue", "rating", "reviews"],
    keeps_tags: false,
    product_url: wildberries_product_url,
};

fn ozon_product_url(id: &str) -> String {
    format!("https://www.ozon.ru/product/{id}")
}

fn wildberries_product_url(id: &str) -> String {
    format!("https://www.wildberries.ru/catalog/{id}/detail.aspx")
}

/// Stateless response normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTransformer;

impl DataTransformer {
    /// Create a transformer
    pub fn new() -> Self {
        Self
    }

    /// Normalize one response
    ///
    /// A `data` value that is not a JSON object is treated as an empty
    /// payload; it is still kept verbatim in [`GenericRecord::raw`].
    pub fn transform(&self, response: &IntegrationResponse) -> GenericRecord {
        let empty = Map::new();
        let data = response.data.as_object().unwrap_or(&empty);

        let record = match response.provider.as_str() {
            "youtube" => youtube(data, &response.operation),
            "ozon" => product(data, &OZON),
            "wildberries" => product(data, &WILDBERRIES),
            other => generic(data, other, &response.operation),
        };
        GenericRecord {
            raw: response.data.clone(),
            ..record
        }
    }

    /// Normalize a batch of responses, preserving order
    pub fn transform_many(&self, responses: &[IntegrationResponse]) -> Vec<GenericRecord> {
        responses
            .iter()
            .map(|response| self.transform(response))
            .collect()
    }
}

// ============================================================================
// Provider mappings
// ============================================================================

fn youtube(data: &Map<String, Value>, operation: &str) -> GenericRecord {
    let operation_lower = operation.to_lowercase();
    if operation_lower.contains("video") {
        youtube_video(data)
    } else if operation_lower.contains("channel") {
        youtube_channel(data)
    } else {
        generic(data, "youtube", operation)
    }
}

fn youtube_video(data: &Map<String, Value>) -> GenericRecord {
    let id = text(data, &["id", "videoId"]).unwrap_or_default();
    let mut record = GenericRecord::new(id, RecordKind::Video, "youtube");
    record.url = Some(format!("https://www.youtube.com/watch?v={}", record.id));
    record.title = text(data, &["snippet.title", "title"]);
    record.description = text(data, &["snippet.description", "description"]);
    record.thumbnail = text(data, &["snippet.thumbnails.high.url", "thumbnail"]);
    record.metrics = metric_map([
        ("views", metric(data, &["statistics.viewCount", "views"])),
        ("likes", metric(data, &["statistics.likeCount", "likes"])),
        ("comments", metric(data, &["statistics.commentCount", "comments"])),
        ("shares", metric(data, &["statistics.shareCount", "shares"])),
    ]);

    if let Some(category) = text(data, &["snippet.categoryId"]) {
        record.metadata.insert("category".to_string(), Value::from(category));
    }
    if let Some(tags) = non_empty_array(data, "snippet.tags") {
        record.metadata.insert("tags".to_string(), tags);
    }
    if let Some(published_at) = timestamp(data, "snippet.publishedAt") {
        record.metadata.insert("publishedAt".to_string(), published_at);
    }
    record
}

fn youtube_channel(data: &Map<String, Value>) -> GenericRecord {
    let id = text(data, &["id", "channelId"]).unwrap_or_default();
    let mut record = GenericRecord::new(id, RecordKind::Channel, "youtube");
    record.url = Some(format!("https://www.youtube.com/channel/{}", record.id));
    record.title = text(data, &["snippet.title", "name"]);
    record.description = text(data, &["snippet.description"]);
    record.thumbnail = text(data, &["snippet.thumbnails.high.url"]);
    record.metrics = metric_map([
        ("views", metric(data, &["statistics.viewCount"])),
        (
            "followers",
            metric(data, &["statistics.subscriberCount", "subscribers"]),
        ),
    ]);

    if let Some(published_at) = timestamp(data, "snippet.publishedAt") {
        record.metadata.insert("publishedAt".to_string(), published_at);
    }
    record
}

fn product(data: &Map<String, Value>, market: &Marketplace) -> GenericRecord {
    let id = text(data, &["productId", "id"]).unwrap_or_default();
    let mut record = GenericRecord::new(id, RecordKind::Product, market.provider);
    record.url = Some(text(data, &["url"]).unwrap_or_else(|| (market.product_url)(&record.id)));
    record.title = text(data, &["name", "title"]);
    record.description = text(data, &["description"]);
    record.thumbnail = text(data, &["image", "thumbnail"]);
    record.metrics = metric_map(
        market
            .metrics
            .iter()
            .map(|name| (*name, metric(data, &[*name]))),
    );

    if let Some(category) = text(data, &["category"]) {
        record.metadata.insert("category".to_string(), Value::from(category));
    }
    if market.keeps_tags
        && let Some(tags) = non_empty_array(data, "tags")
    {
        record.metadata.insert("tags".to_string(), tags);
    }
    record
}

/// Fallback: every scalar field becomes a metric
fn generic(data: &Map<String, Value>, provider: &str, operation: &str) -> GenericRecord {
    let provider_id_key = format!("{provider}Id");
    let id = text(data, &["id", provider_id_key.as_str()]).unwrap_or_default();
    let mut record = GenericRecord::new(id, RecordKind::Generic, provider);
    record.title = text(data, &["title", "name"]);
    record.description = text(data, &["description"]);
    record.url = text(data, &["url"]);
    record.thumbnail = text(data, &["thumbnail", "image"]);
    record.metrics = data
        .iter()
        .filter(|(_, value)| matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    record
        .metadata
        .insert("operation".to_string(), Value::from(operation));
    record
}

// ============================================================================
// Field access
// ============================================================================

/// Follow a dotted path through nested objects
fn lookup<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// First non-empty string (or number, rendered) among `paths`
fn text(data: &Map<String, Value>, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(data, path))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// First numeric value among `paths`, accepting numeric strings; 0 otherwise
fn metric(data: &Map<String, Value>, paths: &[&str]) -> Value {
    paths
        .iter()
        .filter_map(|path| lookup(data, path))
        .find_map(numeric)
        .unwrap_or_else(|| Value::from(0))
}

fn numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => Some(Value::Number(n.clone())),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().map(Value::from).ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Value::from)
            })
        }
        _ => None,
    }
}

fn non_empty_array(data: &Map<String, Value>, path: &str) -> Option<Value> {
    lookup(data, path)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .map(|items| Value::Array(items.clone()))
}

/// RFC 3339 timestamp normalized to UTC; unparsable values are dropped
fn timestamp(data: &Map<String, Value>, path: &str) -> Option<Value> {
    let raw = lookup(data, path)?.as_str()?;
    let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
    Some(Value::from(
        parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    ))
}

fn metric_map<'a, I>(entries: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

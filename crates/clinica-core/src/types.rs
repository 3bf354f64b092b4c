//! Core domain types for Clinica.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag assigned when no configured category matches.
pub const DEFAULT_FALLBACK_TAG: &str = "other";

/// Metadata category of records built from the price list.
pub const SERVICE_CATEGORY: &str = "service";

/// Metadata category of records built from the working-hours page.
pub const HOURS_CATEGORY: &str = "working_hours";

/// One line of a department's schedule, e.g. `Суббота : 10:00–16:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursEntry {
    pub day: String,
    pub hours: String,
}

impl WorkingHoursEntry {
    pub fn new(day: impl Into<String>, hours: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            hours: hours.into(),
        }
    }

    /// Single-entry `{day: hours}` map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(self.day.clone(), self.hours.clone())])
    }
}

impl std::fmt::Display for WorkingHoursEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.day, self.hours)
    }
}

/// A priced service from the clinic price list.
///
/// A price of `0.0` means either a free service or a price cell that could
/// not be read; the source data does not distinguish the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Article number as printed in the price list (usually numeric).
    pub article: String,
    pub code: String,
    pub name: String,
    pub price: f64,
}

impl ServiceRecord {
    pub fn new(
        article: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            article: article.into(),
            code: code.into(),
            name: name.into(),
            price,
        }
    }

    /// Multi-line card with every field, price rounded to kopecks.
    pub fn formatted_info(&self) -> String {
        format!(
            "Услуга: {}\nАртикул: {}\nКод: {}\nЦена: {:.2} руб.",
            self.name, self.article, self.code, self.price
        )
    }
}

impl std::fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Цена: {} рублей", self.name, format_price(self.price))
    }
}

/// Shortest decimal form that always keeps a fractional part (`1200.0`).
pub fn format_price(price: f64) -> String {
    format!("{:?}", price)
}

/// Ordered, duplicate-free, never-empty set of category labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Build a tag set, substituting `[fallback]` when `labels` is empty.
    pub fn new<I, S>(labels: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !tags.contains(&label) {
                tags.push(label);
            }
        }
        if tags.is_empty() {
            tags.push(fallback.to_string());
        }
        Self(tags)
    }

    /// A tag set holding exactly one label.
    pub fn single(label: impl Into<String>) -> Self {
        Self(vec![label.into()])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|t| t == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Tags joined as `"a, b"`, for stores that only accept scalar metadata.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl TryFrom<Vec<String>> for TagSet {
    type Error = Error;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::InvalidInput("tag set must not be empty".into()));
        }
        Ok(Self::new(labels, DEFAULT_FALLBACK_TAG))
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

/// Metadata attached to every output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub tags: TagSet,
    pub category: String,
}

impl RecordMetadata {
    pub fn new(tags: TagSet, category: impl Into<String>) -> Self {
        Self {
            tags,
            category: category.into(),
        }
    }

    /// Flat `{tags: "a, b", category}` form.
    pub fn joined_tags(&self) -> serde_json::Value {
        serde_json::json!({
            "tags": self.tags.joined(),
            "category": self.category,
        })
    }
}

/// One text record handed to the downstream index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub text: String,
    pub metadata: RecordMetadata,
}

impl OutputRecord {
    pub fn new(text: impl Into<String>, metadata: RecordMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// Parallel `texts`/`metadatas` columns, the shape vector stores ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyEntries {
    pub texts: Vec<String>,
    pub metadatas: Vec<RecordMetadata>,
}

impl ReadyEntries {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Columns with tags joined into one string, for stores that only
    /// accept scalar metadata values.
    pub fn to_flat_json(&self) -> serde_json::Value {
        let metadatas: Vec<_> = self.metadatas.iter().map(RecordMetadata::joined_tags).collect();
        serde_json::json!({
            "texts": self.texts,
            "metadatas": metadatas,
        })
    }
}

impl FromIterator<OutputRecord> for ReadyEntries {
    fn from_iter<T: IntoIterator<Item = OutputRecord>>(iter: T) -> Self {
        let (texts, metadatas) = iter
            .into_iter()
            .map(|record| (record.text, record.metadata))
            .unzip();
        Self { texts, metadatas }
    }
}

/// Serialization format for output records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Jsonl,
    Text,
    Columns,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Text => "text",
            OutputFormat::Columns => "columns",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "text" | "txt" => Ok(OutputFormat::Text),
            "columns" => Ok(OutputFormat::Columns),
            other => Err(Error::InvalidInput(format!("unknown output format: {}", other))),
        }
    }

    /// Render records in this format.
    pub fn render(&self, records: &[OutputRecord], pretty: bool) -> Result<String> {
        match self {
            OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Json => Ok(serde_json::to_string(records)?),
            OutputFormat::Jsonl => {
                let mut out = String::new();
                for record in records {
                    out.push_str(&serde_json::to_string(record)?);
                    out.push('\n');
                }
                Ok(out)
            }
            OutputFormat::Text => {
                let mut out = String::new();
                for record in records {
                    out.push_str(&format!(
                        "{}\n  tags: {}\n  category: {}\n",
                        record.text,
                        record.metadata.tags.joined(),
                        record.metadata.category
                    ));
                }
                Ok(out)
            }
            OutputFormat::Columns => {
                let entries: ReadyEntries = records.iter().cloned().collect();
                let value = entries.to_flat_json();
                if pretty {
                    Ok(serde_json::to_string_pretty(&value)?)
                } else {
                    Ok(serde_json::to_string(&value)?)
                }
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_display() {
        let record = ServiceRecord::new("101", "K5", "Консультация терапевта", 1200.0);
        assert_eq!(
            record.to_string(),
            "Консультация терапевта Цена: 1200.0 рублей"
        );
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "0.0");
        assert_eq!(format_price(1234.5), "1234.5");
        assert_eq!(format_price(2300.0), "2300.0");
    }

    #[test]
    fn test_formatted_info() {
        let record = ServiceRecord::new("7", "A1", "Рентген", 950.5);
        let info = record.formatted_info();
        assert!(info.starts_with("Услуга: Рентген\n"));
        assert!(info.ends_with("Цена: 950.50 руб."));
    }

    #[test]
    fn test_hours_display() {
        let entry = WorkingHoursEntry::new("Суббота", "10:00–16:00");
        assert_eq!(entry.to_string(), "Суббота : 10:00–16:00");
        assert_eq!(entry.to_map()["Суббота"], "10:00–16:00");
    }

    #[test]
    fn test_tag_set_fallback_and_dedup() {
        let empty = TagSet::new(Vec::<String>::new(), DEFAULT_FALLBACK_TAG);
        assert_eq!(empty.as_slice(), ["other"]);

        let tags = TagSet::new(["b", "a", "b"], DEFAULT_FALLBACK_TAG);
        assert_eq!(tags.as_slice(), ["b", "a"]);
        assert_eq!(tags.joined(), "b, a");
    }

    #[test]
    fn test_tag_set_rejects_empty_json() {
        assert!(serde_json::from_str::<TagSet>("[]").is_err());
        let tags: TagSet = serde_json::from_str(r#"["x","x"]"#).unwrap();
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_output_record_json_shape() {
        let record = OutputRecord::new(
            "Рентген Цена: 950.0 рублей",
            RecordMetadata::new(TagSet::single("diagnostics"), SERVICE_CATEGORY),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["metadata"]["tags"][0], "diagnostics");
        assert_eq!(value["metadata"]["category"], "service");
        assert_eq!(record.metadata.joined_tags()["tags"], "diagnostics");
    }

    #[test]
    fn test_ready_entries_from_records() {
        let meta = RecordMetadata::new(TagSet::single("other"), SERVICE_CATEGORY);
        let entries: ReadyEntries = vec![
            OutputRecord::new("a", meta.clone()),
            OutputRecord::new("b", meta),
        ]
        .into_iter()
        .collect();
        assert_eq!(entries.texts, vec!["a", "b"]);
        assert_eq!(entries.metadatas.len(), 2);
    }

    #[test]
    fn test_columns_render_flattens_tags() {
        let records = vec![
            OutputRecord::new(
                "ЭКГ Цена: 500.0 рублей",
                RecordMetadata::new(
                    TagSet::new(["кардиология", "диагностика"], DEFAULT_FALLBACK_TAG),
                    SERVICE_CATEGORY,
                ),
            ),
            OutputRecord::new(
                "Пн : 8:00–20:00",
                RecordMetadata::new(TagSet::single(HOURS_CATEGORY), HOURS_CATEGORY),
            ),
        ];
        let rendered = OutputFormat::Columns.render(&records, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["texts"][1], "Пн : 8:00–20:00");
        assert_eq!(value["metadatas"][0]["tags"], "кардиология, диагностика");
        assert_eq!(value["metadatas"][1]["category"], "working_hours");
    }

    #[test]
    fn test_output_format_render() {
        let records = vec![OutputRecord::new(
            "x",
            RecordMetadata::new(TagSet::single("t"), SERVICE_CATEGORY),
        )];
        let jsonl = OutputFormat::Jsonl.render(&records, false).unwrap();
        assert_eq!(jsonl.lines().count(), 1);
        assert!(OutputFormat::parse("yaml").is_err());
        assert_eq!(OutputFormat::parse("columns").unwrap(), OutputFormat::Columns);
        assert_eq!(OutputFormat::parse("NDJSON").unwrap(), OutputFormat::Jsonl);
    }
}

//! Keyword-based category tagging.

use crate::error::{IngestError, IngestResult};
use clinica_core::{ServiceRecord, TagSet, DEFAULT_FALLBACK_TAG};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Key under which the category table usually lives.
const CATEGORIES_KEY: &str = "medical_service_categories";

/// A category label and its lower-cased keyword fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Categories in file order. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    categories: Vec<Category>,
}

impl CategoryMap {
    /// Build from `(label, keywords)` pairs.
    pub fn from_pairs<L, K, I>(pairs: impl IntoIterator<Item = (L, I)>) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let categories = pairs
            .into_iter()
            .filter_map(|(label, keywords)| {
                build_category(label.into(), keywords.into_iter().map(|k| k.as_ref().to_string()))
            })
            .collect();
        Self { categories }
    }

    /// Parse the JSON category file.
    ///
    /// Accepts `{"medical_service_categories": {...}}` or the inner object
    /// directly. Values are `"kw1, kw2"` strings or arrays of strings;
    /// malformed entries are logged and dropped.
    pub fn from_json_str(json: &str) -> IngestResult<Self> {
        let root: Value = serde_json::from_str(json).map_err(|e| IngestError::ParseError {
            source_name: "categories".into(),
            message: e.to_string(),
        })?;

        let table = match root.get(CATEGORIES_KEY) {
            Some(Value::Object(inner)) => inner,
            _ => root.as_object().ok_or_else(|| IngestError::ParseError {
                source_name: "categories".into(),
                message: "expected a JSON object".into(),
            })?,
        };

        let mut categories = Vec::with_capacity(table.len());
        for (label, value) in table {
            let keywords: Vec<String> = match value {
                Value::String(joined) => joined.split(',').map(str::to_string).collect(),
                Value::Array(items) if items.iter().all(Value::is_string) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                other => {
                    warn!("Ignoring category {:?}: unsupported value {}", label, other);
                    continue;
                }
            };
            match build_category(label.clone(), keywords) {
                Some(category) => categories.push(category),
                None => warn!("Ignoring category {:?}: no keywords", label),
            }
        }

        Ok(Self { categories })
    }

    /// Load from a file.
    pub fn load(path: &Path) -> IngestResult<Self> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let map = Self::from_json_str(&contents)?;
        info!("Loaded {} categories from {:?}", map.len(), path);
        Ok(map)
    }

    /// Load from a file, degrading to an empty map on any failure.
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("No category file configured; every service will use the fallback tag");
            return Self::default();
        };
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load categories: {}", e);
            Self::default()
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn build_category(label: String, keywords: impl IntoIterator<Item = String>) -> Option<Category> {
    let label = label.trim().to_string();
    let mut cleaned: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !cleaned.contains(&keyword) {
            cleaned.push(keyword);
        }
    }
    if label.is_empty() || cleaned.is_empty() {
        return None;
    }
    Some(Category {
        label,
        keywords: cleaned,
    })
}

/// Assigns every matching category to a service name.
///
/// Matching is a plain substring test on the lower-cased name, so a short
/// keyword also matches inside longer unrelated words.
#[derive(Debug, Clone)]
pub struct CategoryTagger {
    map: CategoryMap,
    fallback: String,
}

impl CategoryTagger {
    pub fn new(map: CategoryMap, fallback: impl Into<String>) -> Self {
        Self {
            map,
            fallback: fallback.into(),
        }
    }

    pub fn map(&self) -> &CategoryMap {
        &self.map
    }

    /// Tags for a free-text service name.
    pub fn tags_for(&self, name: &str) -> TagSet {
        let name = name.to_lowercase();
        let matched = self
            .map
            .categories
            .iter()
            .filter(|category| category.keywords.iter().any(|kw| name.contains(kw.as_str())))
            .map(|category| category.label.clone());

        let tags = TagSet::new(matched, &self.fallback);
        debug!("{:?} -> {:?}", name, tags.as_slice());
        tags
    }

    pub fn tag(&self, record: &ServiceRecord) -> TagSet {
        self.tags_for(&record.name)
    }
}

impl Default for CategoryTagger {
    fn default() -> Self {
        Self::new(CategoryMap::default(), DEFAULT_FALLBACK_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tagger() -> CategoryTagger {
        let map = CategoryMap::from_pairs([
            ("кардиология", vec!["кардиолог", "ЭКГ"]),
            ("консультации", vec!["приём", "консультация"]),
            ("диагностика", vec!["узи", "экг"]),
        ]);
        CategoryTagger::new(map, "other")
    }

    #[test]
    fn test_multiple_categories() {
        let tags = tagger().tags_for("Приём кардиолога первичный");
        assert_eq!(tags.as_slice(), ["кардиология", "консультации"]);
    }

    #[test]
    fn test_keyword_shared_by_categories() {
        let tags = tagger().tags_for("ЭКГ покоя");
        assert_eq!(tags.as_slice(), ["кардиология", "диагностика"]);
    }

    #[test]
    fn test_fallback() {
        let tags = tagger().tags_for("Массаж спины");
        assert_eq!(tags.as_slice(), ["other"]);
    }

    #[test]
    fn test_empty_map_uses_fallback() {
        let record = ServiceRecord::new("1", "A", "Консультация терапевта", 100.0);
        assert_eq!(CategoryTagger::default().tag(&record).as_slice(), ["other"]);
    }

    #[test]
    fn test_substring_overmatch_is_kept() {
        // "узи" is found inside "кузина"
        let tags = tagger().tags_for("Кузина");
        assert!(tags.contains("диагностика"));
    }

    #[test]
    fn test_json_joined_and_array_values() {
        let json = r#"{
            "medical_service_categories": {
                "анализы": "анализ, кровь",
                "хирургия": ["хирург", " Удаление "],
                "битая": 42,
                "пустая": " , "
            }
        }"#;
        let map = CategoryMap::from_json_str(json).unwrap();
        let labels: Vec<_> = map.categories().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["анализы", "хирургия"]);
        assert_eq!(map.categories()[1].keywords, vec!["хирург", "удаление"]);
    }

    #[test]
    fn test_bare_object_accepted() {
        let map = CategoryMap::from_json_str(r#"{"узи": "узи"}"#).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(CategoryMap::from_json_str("[1, 2]").is_err());
        assert!(CategoryMap::from_json_str("{oops").is_err());
    }

    #[test]
    fn test_load_or_empty_degrades() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(CategoryMap::load_or_empty(Some(file.path())).is_empty());
        assert!(CategoryMap::load_or_empty(Some(Path::new("/no/such/file.json"))).is_empty());
        assert!(CategoryMap::load_or_empty(None).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"medical_service_categories": {{"узи": "узи, доплер"}}}}"#).unwrap();
        let map = CategoryMap::load(file.path()).unwrap();
        assert_eq!(map.categories()[0].keywords, vec!["узи", "доплер"]);
    }
}

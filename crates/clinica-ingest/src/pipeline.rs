//! Normalization of extracted records into tagged text records.

use crate::clinic::ClinicSnapshot;
use crate::tagger::{CategoryMap, CategoryTagger};
use clinica_config::Config;
use clinica_core::{
    OutputRecord, RecordMetadata, ServiceRecord, TagSet, WorkingHoursEntry, HOURS_CATEGORY,
    SERVICE_CATEGORY,
};
use tracing::info;

/// Turns service and working-hours records into [`OutputRecord`]s.
///
/// Holds no per-run state; one pipeline may process any number of runs.
#[derive(Debug, Clone)]
pub struct NormalizationPipeline {
    tagger: CategoryTagger,
    service_category: String,
    hours_category: String,
    hours_tag: String,
}

impl NormalizationPipeline {
    pub fn new(tagger: CategoryTagger) -> Self {
        Self {
            tagger,
            service_category: SERVICE_CATEGORY.to_string(),
            hours_category: HOURS_CATEGORY.to_string(),
            hours_tag: HOURS_CATEGORY.to_string(),
        }
    }

    /// Build from configuration, loading the category file eagerly.
    pub fn from_config(config: &Config) -> Self {
        let map = CategoryMap::load_or_empty(config.categories_path().as_deref());
        let tagger = CategoryTagger::new(map, &config.tagging.fallback_tag);

        Self {
            tagger,
            service_category: config.tagging.service_category.clone(),
            hours_category: config.tagging.hours_category.clone(),
            hours_tag: config.tagging.hours_tag.clone(),
        }
    }

    pub fn tagger(&self) -> &CategoryTagger {
        &self.tagger
    }

    /// One output record per service, in input order.
    pub fn process(&self, records: &[ServiceRecord]) -> Vec<OutputRecord> {
        records
            .iter()
            .map(|record| {
                let metadata =
                    RecordMetadata::new(self.tagger.tag(record), &self.service_category);
                OutputRecord::new(record.to_string(), metadata)
            })
            .collect()
    }

    /// One output record per schedule line, in input order.
    pub fn process_working_hours(&self, entries: &[WorkingHoursEntry]) -> Vec<OutputRecord> {
        entries
            .iter()
            .map(|entry| {
                let metadata =
                    RecordMetadata::new(TagSet::single(&self.hours_tag), &self.hours_category);
                OutputRecord::new(entry.to_string(), metadata)
            })
            .collect()
    }

    /// Working hours (when requested) followed by services.
    pub fn run(&self, snapshot: &ClinicSnapshot, include_hours: bool) -> Vec<OutputRecord> {
        let mut output = Vec::new();

        if include_hours {
            if let Some(entries) = &snapshot.working_hours {
                output.extend(self.process_working_hours(entries));
            }
        }
        if let Some(services) = &snapshot.services {
            output.extend(self.process(services));
        }

        info!("Normalized {} records", output.len());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> NormalizationPipeline {
        let map = CategoryMap::from_pairs([
            ("кардиология", vec!["кардиолог"]),
            ("консультации", vec!["приём", "консультация"]),
            ("диагностика", vec!["узи"]),
        ]);
        NormalizationPipeline::new(CategoryTagger::new(map, "other"))
    }

    fn services() -> Vec<ServiceRecord> {
        vec![
            ServiceRecord::new("1", "C1", "Приём кардиолога первичный", 2300.0),
            ServiceRecord::new("2", "C1", "Приём кардиолога повторный", 1600.0),
            ServiceRecord::new("3", "M1", "Массаж воротниковой зоны", 0.0),
            ServiceRecord::new("4", "U7", "УЗИ щитовидной железы", 1400.0),
        ]
    }

    #[test]
    fn test_process_preserves_order_and_count() {
        let output = pipeline().process(&services());
        let texts: Vec<_> = output.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Приём кардиолога первичный Цена: 2300.0 рублей",
                "Приём кардиолога повторный Цена: 1600.0 рублей",
                "Массаж воротниковой зоны Цена: 0.0 рублей",
                "УЗИ щитовидной железы Цена: 1400.0 рублей",
            ]
        );
        assert!(output.iter().all(|r| r.metadata.category == "service"));
    }

    #[test]
    fn test_tags_are_total() {
        let output = pipeline().process(&services());
        assert!(output.iter().all(|r| !r.metadata.tags.is_empty()));
    }

    #[test]
    fn test_multi_tag_and_fallback() {
        let output = pipeline().process(&services());
        assert_eq!(
            output[0].metadata.tags.as_slice(),
            ["кардиология", "консультации"]
        );
        assert_eq!(output[2].metadata.tags.as_slice(), ["other"]);
        assert_eq!(output[3].metadata.tags.as_slice(), ["диагностика"]);
    }

    #[test]
    fn test_idempotent() {
        let pipeline = pipeline();
        assert_eq!(pipeline.process(&services()), pipeline.process(&services()));
    }

    #[test]
    fn test_working_hours_records() {
        let output = pipeline()
            .process_working_hours(&[WorkingHoursEntry::new("Суббота", "10:00–16:00")]);
        assert_eq!(output[0].text, "Суббота : 10:00–16:00");
        assert_eq!(output[0].metadata.category, "working_hours");
        assert_eq!(output[0].metadata.tags.as_slice(), ["working_hours"]);
    }

    #[test]
    fn test_run_orders_hours_first() {
        let snapshot = ClinicSnapshot {
            working_hours: Some(vec![WorkingHoursEntry::new("Пн", "8:00–20:00")]),
            services: Some(services()),
        };
        let pipeline = pipeline();

        let all = pipeline.run(&snapshot, true);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].metadata.category, "working_hours");

        let services_only = pipeline.run(&snapshot, false);
        assert_eq!(services_only.len(), 4);
        assert!(pipeline.run(&ClinicSnapshot::default(), true).is_empty());
    }

    #[test]
    fn test_from_config_without_categories_file() {
        let mut config = Config::default();
        config.sources.categories_file = Some("/no/such/categories.json".into());
        config.tagging.fallback_tag = "другое".into();

        let output = NormalizationPipeline::from_config(&config).process(&services());
        assert!(output.iter().all(|r| r.metadata.tags.as_slice() == ["другое"]));
    }
}

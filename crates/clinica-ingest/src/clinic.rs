//! Fetching and extracting a clinic's documents.

use crate::error::IngestResult;
use crate::hours::WorkingHoursExtractor;
use crate::parsers::parse_tables;
use crate::services::ServiceTableExtractor;
use crate::table::TableDocument;
use clinica_config::{Config, ExtractionConfig};
use clinica_core::{ServiceRecord, WorkingHoursEntry};
use clinica_fetch::{DocumentFetcher, DocumentSource};
use tracing::{info, warn};

/// Site-specific extraction rules.
///
/// Another clinic's layout can be supported by implementing this trait.
pub trait ClinicExtractor: Send + Sync {
    /// Schedule entries from the working-hours page; `None` when the page
    /// has no schedule block.
    fn working_hours(&self, html: &str) -> Option<Vec<WorkingHoursEntry>>;

    /// Services from the price-list grid.
    fn services(&self, tables: &TableDocument) -> IngestResult<Vec<ServiceRecord>>;
}

/// Anchor-phrase schedule plus four-column price list.
#[derive(Debug, Clone)]
pub struct StandardExtractor {
    hours: WorkingHoursExtractor,
    services: ServiceTableExtractor,
}

impl StandardExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            hours: WorkingHoursExtractor::from_config(config),
            services: ServiceTableExtractor::from_config(config),
        }
    }
}

impl ClinicExtractor for StandardExtractor {
    fn working_hours(&self, html: &str) -> Option<Vec<WorkingHoursEntry>> {
        self.hours.extract(html)
    }

    fn services(&self, tables: &TableDocument) -> IngestResult<Vec<ServiceRecord>> {
        self.services.extract(tables)
    }
}

/// Outcome of one scrape. `None` marks a source that yielded nothing.
#[derive(Debug, Clone, Default)]
pub struct ClinicSnapshot {
    pub working_hours: Option<Vec<WorkingHoursEntry>>,
    pub services: Option<Vec<ServiceRecord>>,
}

/// Fetches both documents and runs the extractor over them.
pub struct ClinicScraper {
    fetcher: DocumentFetcher,
    extractor: Box<dyn ClinicExtractor>,
    hours_source: DocumentSource,
    price_source: DocumentSource,
}

impl ClinicScraper {
    pub fn new(
        fetcher: DocumentFetcher,
        extractor: Box<dyn ClinicExtractor>,
        hours_source: DocumentSource,
        price_source: DocumentSource,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            hours_source,
            price_source,
        }
    }

    /// Create a scraper from configuration. A configured grid file takes
    /// precedence over the price-list PDF.
    pub fn from_config(config: &Config) -> IngestResult<Self> {
        let fetcher = DocumentFetcher::from_config(&config.sources)?;
        let price_location = config
            .sources
            .price_grid_file
            .as_deref()
            .unwrap_or(&config.sources.price_list_url);

        Ok(Self::new(
            fetcher,
            Box::new(StandardExtractor::from_config(&config.extraction)),
            DocumentSource::parse(&config.sources.hours_url),
            DocumentSource::parse(price_location),
        ))
    }

    /// Replace the working-hours source.
    pub fn with_hours_source(mut self, source: DocumentSource) -> Self {
        self.hours_source = source;
        self
    }

    /// Replace the price-list source.
    pub fn with_price_source(mut self, source: DocumentSource) -> Self {
        self.price_source = source;
        self
    }

    pub async fn scrape_working_hours(&self) -> IngestResult<Option<Vec<WorkingHoursEntry>>> {
        let html = self.fetcher.fetch_text(&self.hours_source).await?;
        let entries = self.extractor.working_hours(&html);
        if entries.is_none() {
            warn!("No working-hours block found at {}", self.hours_source);
        }
        Ok(entries)
    }

    pub async fn scrape_services(&self) -> IngestResult<Vec<ServiceRecord>> {
        let name = self.price_source.to_string();
        let bytes = self.fetcher.fetch(&self.price_source).await?;
        let tables = parse_tables(&bytes, &name)?;
        let services = self.extractor.services(&tables)?;
        info!("Extracted {} services from {}", services.len(), name);
        Ok(services)
    }

    /// Fetch and extract both sources concurrently.
    ///
    /// A failing source is logged and left as `None`; the other source is
    /// unaffected.
    pub async fn scrape(&self) -> ClinicSnapshot {
        let (hours, services) = tokio::join!(self.scrape_working_hours(), self.scrape_services());

        let working_hours = hours.unwrap_or_else(|e| {
            warn!("Working hours unavailable from {}: {}", self.hours_source, e);
            None
        });
        let services = services
            .map_err(|e| warn!("Services unavailable from {}: {}", self.price_source, e))
            .ok();

        ClinicSnapshot {
            working_hours,
            services,
        }
    }
}

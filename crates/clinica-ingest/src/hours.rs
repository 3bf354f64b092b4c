//! Working-hours extraction from a department HTML page.

use clinica_config::ExtractionConfig;
use clinica_core::WorkingHoursEntry;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;
use tracing::{debug, trace};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());
static COLUMN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static DAY_THEN_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\D+)(\d.+)$").unwrap());

/// Pulls the "day  hours" lines that follow an anchor phrase.
#[derive(Debug, Clone)]
pub struct WorkingHoursExtractor {
    anchor: String,
    stop_phrase: String,
}

impl WorkingHoursExtractor {
    pub fn new(anchor: impl Into<String>, stop_phrase: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            stop_phrase: stop_phrase.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(&config.anchor, &config.stop_phrase)
    }

    /// Extract entries from raw HTML. `None` when the anchor is absent.
    pub fn extract(&self, html: &str) -> Option<Vec<WorkingHoursEntry>> {
        let document = Html::parse_document(html);
        let block = self.collect_block(&document)?;
        let cleaned = clean_block(&block);

        let entries: Vec<WorkingHoursEntry> = cleaned
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.contains(&self.anchor))
            .filter_map(parse_line)
            .collect();

        debug!("Extracted {} working-hours entries", entries.len());
        Some(entries)
    }

    /// Raw text from the anchor's parent up to the stop paragraph.
    fn collect_block(&self, document: &Html) -> Option<String> {
        let root = document.tree.root();

        let Some(anchor) = root.descendants().find(|node| {
            node.value()
                .as_text()
                .is_some_and(|text| text.contains(self.anchor.as_str()))
        }) else {
            debug!("Anchor {:?} not found", self.anchor);
            return None;
        };
        let start = anchor.parent().unwrap_or(anchor);

        let mut text = String::new();
        for node in root
            .descendants()
            .skip_while(|node| node.id() != start.id())
            .skip(1)
        {
            match node.value() {
                Node::Text(t) => text.push_str(t),
                Node::Element(el) if el.name() == "br" => text.push('\n'),
                Node::Element(el) if el.name() == "p" => {
                    let stop = ElementRef::wrap(node).is_some_and(|p| {
                        p.text().collect::<String>().contains(self.stop_phrase.as_str())
                    });
                    if stop {
                        trace!("Reached stop paragraph");
                        break;
                    }
                }
                _ => {}
            }
        }

        Some(text)
    }
}

/// Drop leftover markup and non-breaking spaces.
fn clean_block(text: &str) -> String {
    TAG_RE
        .replace_all(text, "")
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Split one schedule line into day and hours.
fn parse_line(line: &str) -> Option<WorkingHoursEntry> {
    let parts: Vec<&str> = COLUMN_GAP_RE.split(line).collect();

    if parts.len() >= 2 {
        let day = parts[0].trim();
        let hours = parts[parts.len() - 1].trim();
        return Some(WorkingHoursEntry::new(day, hours));
    }

    // Single-space layout: the hours start at the first digit.
    let caps = DAY_THEN_TIME_RE.captures(parts.first()?)?;
    Some(WorkingHoursEntry::new(caps[1].trim(), caps[2].trim()))
}

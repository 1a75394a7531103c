//! News loading.
//!
//! Articles arrive either as a CSV or as line-delimited JSON exports whose
//! field names vary by source. Each logical field is looked up through an
//! ordered alias list and the first non-empty value wins.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::dates::parse_date;
use crate::types::NewsItem;
use crate::{DataError, Result};

const DATE_FIELDS: &[&str] = &["datePublished", "date", "published", "pubDate"];
const TITLE_FIELDS: &[&str] = &["headline", "title"];
const DESCRIPTION_FIELDS: &[&str] = &[
    "combined_content",
    "articleBodyRendered",
    "description",
    "summary",
];
const LINK_FIELDS: &[&str] = &["url", "link"];
const SOURCE_FIELDS: &[&str] = &["source", "publisher"];

/// Case-insensitive lookup from header names to column positions
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Index a CSV header record
    pub fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        Self { positions }
    }

    /// Position of the first alias present in the header
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|a| self.positions.get(&a.to_lowercase()).copied())
    }
}

/// A record whose fields can be looked up by alias
trait FieldSource {
    fn field(&self, aliases: &[&str]) -> Option<String>;
}

struct CsvRow<'a> {
    headers: &'a HeaderIndex,
    record: &'a csv::StringRecord,
}

impl FieldSource for CsvRow<'_> {
    fn field(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| {
            let idx = self.headers.find(&[*alias])?;
            let value = self.record.get(idx)?.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    }
}

impl FieldSource for Map<String, Value> {
    fn field(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| match self.get(*alias)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

/// Build a news item from any aliased record; `None` when the date is unusable
fn news_item(source: &impl FieldSource) -> Option<NewsItem> {
    let date = parse_date(&source.field(DATE_FIELDS)?).ok()?;
    let title = source.field(TITLE_FIELDS).unwrap_or_default();
    let description = source.field(DESCRIPTION_FIELDS).unwrap_or_default();
    if title.is_empty() && description.is_empty() {
        return None;
    }
    Some(NewsItem {
        date,
        title,
        description,
        link: source.field(LINK_FIELDS),
        source: source.field(SOURCE_FIELDS),
    })
}

/// Load articles from a news CSV
pub fn load_news_csv(path: &Path) -> Result<Vec<NewsItem>> {
    if !path.exists() {
        return Err(DataError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = HeaderIndex::new(reader.headers()?);
    if headers.find(DATE_FIELDS).is_none() {
        return Err(DataError::MissingColumn {
            column: "date".to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut items = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        match news_item(&CsvRow {
            headers: &headers,
            record: &record,
        }) {
            Some(item) => items.push(item),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(path = %path.display(), dropped, "dropped news rows without a usable date or text");
    }
    Ok(items)
}

/// Load articles from a line-delimited JSON export
pub fn load_news_jsonl(path: &Path) -> Result<Vec<NewsItem>> {
    let reader = BufReader::new(File::open(path)?);

    let mut items = Vec::new();
    let mut dropped = 0usize;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => match news_item(&map) {
                Some(item) => items.push(item),
                None => dropped += 1,
            },
            Ok(_) => dropped += 1,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping malformed json line");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(path = %path.display(), dropped, "dropped news records");
    }
    Ok(items)
}

/// Every news file in a directory: `*.jsonl` exports plus `news.csv`
pub fn news_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().is_some_and(|ext| ext == "jsonl")
                || p.file_name().is_some_and(|name| name == "news.csv")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Load and merge all news in a directory.
///
/// Articles are ordered by date, then title; exact (date, title) repeats across
/// files are kept once.
pub fn load_news_dir(dir: &Path) -> Result<Vec<NewsItem>> {
    let mut items = Vec::new();
    for file in news_files(dir)? {
        let loaded = if file.extension().is_some_and(|ext| ext == "csv") {
            load_news_csv(&file)?
        } else {
            load_news_jsonl(&file)?
        };
        debug!(file = %file.display(), articles = loaded.len(), "loaded news file");
        items.extend(loaded);
    }

    items.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert((item.date, item.title.clone())));

    info!(dir = %dir.display(), articles = items.len(), "loaded news");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn test_jsonl_aliases() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"datePublished":"2024-02-01T09:00:00Z","headline":"Rebond du CAC40","articleBodyRendered":"Les marchés en hausse","url":"https://x"}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"published":"2024-02-02","title":"Baisse","summary":"chute"}}"#).unwrap();
        writeln!(file, r#"{{"title":"no date"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let items = load_news_jsonl(file.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(items[0].title, "Rebond du CAC40");
        assert_eq!(items[0].description, "Les marchés en hausse");
        assert_eq!(items[0].link.as_deref(), Some("https://x"));
        assert_eq!(items[1].description, "chute");
    }

    #[test]
    fn test_csv_header_aliases() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Published,Headline,Summary").unwrap();
        writeln!(file, "2024-02-01,Bitcoin record,optimisme").unwrap();
        writeln!(file, "garbage,Ignored,row").unwrap();

        let items = load_news_csv(file.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Bitcoin record");
        assert_eq!(items[0].description, "optimisme");
    }

    #[test]
    fn test_csv_without_date_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title,description").unwrap();
        writeln!(file, "a,b").unwrap();
        let err = load_news_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }
}

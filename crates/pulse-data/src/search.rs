//! Search-interest loading.
//!
//! Expected columns: `date, asset, interest`. A `keyword` column, when present,
//! is carried through only for logging; variants are averaged downstream.

use std::path::Path;
use tracing::{debug, warn};

use crate::dates::parse_date;
use crate::news::HeaderIndex;
use crate::types::SearchInterestPoint;
use crate::{DataError, Result};

/// Load a search-interest CSV.
///
/// Unparseable rows are skipped. A missing file is a
/// [`DataError::MissingInput`]; callers treat search interest as optional.
pub fn load_search_interest(path: &Path) -> Result<Vec<SearchInterestPoint>> {
    if !path.exists() {
        return Err(DataError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = HeaderIndex::new(reader.headers()?);
    let column = |aliases: &[&str], name: &str| {
        headers.find(aliases).ok_or_else(|| DataError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
    };
    let date_idx = column(&["date"], "date")?;
    let asset_idx = column(&["asset", "symbol"], "asset")?;
    let interest_idx = column(&["interest", "value", "trends_interest"], "interest")?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");
        let date = parse_date(field(date_idx));
        let interest = field(interest_idx).parse::<f64>();
        let asset = field(asset_idx);
        match (date, interest) {
            (Ok(date), Ok(interest)) if !asset.is_empty() && interest.is_finite() => {
                points.push(SearchInterestPoint {
                    date,
                    asset: asset.to_string(),
                    interest,
                });
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped unparseable search-interest rows");
    }
    debug!(path = %path.display(), rows = points.len(), "loaded search interest");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_search_interest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,asset,keyword,interest").unwrap();
        writeln!(file, "2024-01-01,BTC,bitcoin,80").unwrap();
        writeln!(file, "2024-01-01,BTC,btc,60").unwrap();
        writeln!(file, "2024-01-02,BTC,bitcoin,").unwrap();

        let points = load_search_interest(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].interest, 60.0);
    }
}

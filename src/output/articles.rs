//! CSV export of the articles a fetch run extracted

use crate::output::OutputResult;
use crate::site::ArticleRecord;
use std::path::Path;

/// Writes `articles` to `path` as CSV, one row per article, in the order given
///
/// The header row names the record fields (`author,id,title,content,date,source_url`).
/// Callers pass articles already sorted by author.
///
/// Returns the number of rows written.
pub fn write_articles(articles: &[ArticleRecord], path: &Path) -> OutputResult<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    if articles.is_empty() {
        writer.write_record(["author", "id", "title", "content", "date", "source_url"])?;
    }
    for article in articles {
        writer.serialize(article)?;
    }
    writer.flush()?;

    tracing::info!("Exported {} articles to {}", articles.len(), path.display());
    Ok(articles.len())
}

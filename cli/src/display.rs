use std::io::{self, Write};
use textsearch_core::{Document, SearchResult};

const RULE_WIDTH: usize = 80;

/// Print results `start..start + page_size` and return the index of the first
/// result not yet shown.
pub fn write_page<W: Write>(
    out: &mut W,
    results: &[SearchResult],
    docs: &[Document],
    start: usize,
    page_size: usize,
) -> io::Result<usize> {
    let rule = "-".repeat(RULE_WIDTH);
    let end = (start + page_size.max(1)).min(results.len());
    if start == 0 {
        writeln!(out, "\nResults (sorted by relevance):")?;
        writeln!(out, "{rule}")?;
    }
    for (i, result) in results.iter().enumerate().take(end).skip(start) {
        // ids are positions in the loaded corpus
        let Some(doc) = docs.get(result.doc_id as usize) else {
            tracing::warn!(doc_id = result.doc_id, "search result without a loaded document");
            continue;
        };
        writeln!(out, "\n{}. {}", i + 1, doc.title.as_deref().unwrap_or("(untitled)"))?;
        writeln!(out, "   Score: {:.4}", result.score)?;
        if let Some(url) = &doc.url {
            writeln!(out, "   URL: {url}")?;
        }
        writeln!(out, "   {}", doc.text)?;
        writeln!(out, "{rule}")?;
    }
    Ok(end)
}

/// Footer after a page; returns true when more results remain.
pub fn write_footer<W: Write>(out: &mut W, total: usize, shown: usize, page_size: usize) -> io::Result<bool> {
    if shown < total {
        let remaining = total - shown;
        writeln!(
            out,
            "\nPress Enter for next {} results ({} remaining), or type anything else to return to the query prompt...",
            remaining.min(page_size.max(1)),
            remaining
        )?;
        Ok(true)
    } else {
        writeln!(out, "\nEnd of results.")?;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Document> {
        (0..3)
            .map(|i| Document {
                id: i,
                text: format!("text {i}"),
                title: Some(format!("Title {i}")),
                url: Some(format!("https://example.com/{i}")),
            })
            .collect()
    }

    fn results() -> Vec<SearchResult> {
        vec![
            SearchResult { doc_id: 2, score: 0.9 },
            SearchResult { doc_id: 0, score: 0.5 },
            SearchResult { doc_id: 1, score: 0.1 },
        ]
    }

    #[test]
    fn pages_through_results() {
        let (docs, results) = (docs(), results());
        let mut out = Vec::new();
        let next = write_page(&mut out, &results, &docs, 0, 2).unwrap();
        assert_eq!(next, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Results (sorted by relevance)"));
        assert!(text.contains("1. Title 2"));
        assert!(text.contains("Score: 0.9000"));
        assert!(text.contains("2. Title 0"));
        assert!(!text.contains("Title 1"));

        let mut out = Vec::new();
        assert_eq!(write_page(&mut out, &results, &docs, next, 2).unwrap(), 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("3. Title 1"));
        assert!(!text.contains("sorted by relevance"));
    }

    #[test]
    fn footer_reports_remaining() {
        let mut out = Vec::new();
        assert!(write_footer(&mut out, 12, 5, 5).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("next 5 results (7 remaining)"));

        let mut out = Vec::new();
        assert!(!write_footer(&mut out, 5, 5, 5).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("End of results."));
    }

    #[test]
    fn skips_unknown_ids() {
        let results = vec![SearchResult { doc_id: 42, score: 1.0 }];
        let mut out = Vec::new();
        assert_eq!(write_page(&mut out, &results, &docs(), 0, 5).unwrap(), 1);
        assert!(!String::from_utf8(out).unwrap().contains("42"));
    }
}

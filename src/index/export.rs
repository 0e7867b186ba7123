//! Human-readable text dump of an index.
//!
//! Inspection only; the format is never read back in.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::index::inverted::InvertedIndex;

/// Write statistics, the document table, and the inverted index to `path`
/// as sectioned UTF-8 text. Terms are listed in sorted order.
pub(crate) fn export_to_text(index: &InvertedIndex, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    let stats = index.stats();
    writeln!(out, "=== Boolean Index Statistics ===")?;
    writeln!(out, "Total documents: {}", stats.total_documents)?;
    writeln!(out, "Total terms: {}", stats.total_terms)?;
    writeln!(out, "Total postings: {}", stats.total_postings)?;
    writeln!(out, "Avg document length: {}", stats.avg_document_length)?;
    writeln!(out, "Avg term frequency: {}", stats.avg_term_frequency)?;
    writeln!(
        out,
        "Most frequent term: '{}' (appears in {} documents)",
        stats.most_frequent_term, stats.most_frequent_term_count
    )?;
    writeln!(out)?;

    writeln!(out, "=== Documents ===")?;
    for id in 0..index.document_count() as u32 {
        let doc = index.get_document(id)?;
        writeln!(out, "Document #{}:", doc.id)?;
        writeln!(out, "  Title: {}", doc.title)?;
        writeln!(out, "  URL: {}", doc.url)?;
        writeln!(out, "  Length (unique terms): {}", doc.length)?;
        writeln!(out)?;
    }

    writeln!(out, "=== Inverted Index ===")?;
    let mut terms: Vec<&String> = index.all_terms().iter().collect();
    terms.sort_unstable();

    for term in terms {
        let Some(postings) = index.find_postings(term) else {
            continue;
        };
        writeln!(
            out,
            "Term: '{}' (appears in {} documents)",
            term,
            postings.len()
        )?;
        for posting in postings {
            let doc = index.get_document(posting.doc_id)?;
            writeln!(
                out,
                "  Doc #{} ({}): frequency={}",
                posting.doc_id,
                doc.title,
                posting.frequency()
            )?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

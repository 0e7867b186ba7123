use clap::ValueEnum;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tessera::{SearchEngine, SearchResult};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

/// Print one search result set.
pub fn print_search_result(engine: &SearchEngine, result: &SearchResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let docs: Vec<serde_json::Value> = result
                .doc_ids
                .iter()
                .zip(&result.scores)
                .map(|(&doc_id, &score)| {
                    let mut obj = json!({
                        "doc_id": doc_id,
                        "score": score,
                    });
                    if let Some(doc) = engine.get_document(doc_id) {
                        obj["title"] = json!(doc.title);
                        obj["url"] = json!(doc.url);
                    }
                    obj
                })
                .collect();
            let output = json!({
                "query": result.query,
                "total_found": result.total_found,
                "time_ms": result.time_ms,
                "results": docs,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
        OutputFormat::Table => {
            println!(
                "Found {} documents (showing {}) in {} ms",
                result.total_found,
                result.doc_ids.len(),
                result.time_ms
            );

            if result.doc_ids.is_empty() {
                return;
            }

            let rows: Vec<ResultRow> = result
                .doc_ids
                .iter()
                .enumerate()
                .map(|(rank, &doc_id)| {
                    let (title, url) = engine
                        .get_document(doc_id)
                        .map(|d| (d.title.clone(), d.url.clone()))
                        .unwrap_or_default();
                    let snippet = engine.snippet(doc_id, &result.query, 10);
                    ResultRow {
                        rank: rank + 1,
                        doc_id,
                        title,
                        url,
                        snippet,
                    }
                })
                .collect();

            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Doc")]
    doc_id: u32,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Snippet")]
    snippet: String,
}

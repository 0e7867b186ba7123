use anyhow::{Context, Result};
use tessera::{IndexBuilder, Tokenizer, TokenizerConfig};

use crate::cli::IndexArgs;

/// Build an index from a line-oriented document file and persist it.
pub fn run(args: IndexArgs) -> Result<()> {
    let mut tokenizer = match &args.config {
        Some(path) => {
            let config = TokenizerConfig::load(path)
                .with_context(|| format!("Failed to load tokenizer config {}", path.display()))?;
            Tokenizer::with_config(config)
        }
        None => Tokenizer::new(),
    };
    if let Some(path) = &args.stopwords {
        let count = tokenizer
            .load_stopwords(path)
            .with_context(|| format!("Failed to load stop-words {}", path.display()))?;
        println!("Loaded {count} stop-words from {}.", path.display());
    }

    println!("Building index from {}...", args.input.display());
    let mut builder = IndexBuilder::with_tokenizer(tokenizer);
    builder
        .build_from_text_file(&args.input)
        .with_context(|| format!("Failed to build index from {}", args.input.display()))?;

    builder.optimize();

    if let Some(path) = &args.stats {
        builder
            .export_stats(path)
            .with_context(|| format!("Failed to export statistics to {}", path.display()))?;
        println!("Build statistics written to {}.", path.display());
    }

    let index = builder.into_index();
    index
        .save_to_file(&args.output)
        .with_context(|| format!("Failed to save index to {}", args.output.display()))?;
    println!("Index saved to {}.", args.output.display());

    if let Some(path) = &args.export {
        index
            .export_to_text(path)
            .with_context(|| format!("Failed to export index to {}", path.display()))?;
        println!("Text export written to {}.", path.display());
    }

    let stats = index.stats();
    println!();
    println!("Documents: {}", stats.total_documents);
    println!("Terms: {}", stats.total_terms);
    println!("Postings: {}", stats.total_postings);
    println!("Avg document length: {:.1} terms", stats.avg_document_length);
    if !stats.most_frequent_term.is_empty() {
        println!(
            "Most frequent term: '{}' (in {} documents)",
            stats.most_frequent_term, stats.most_frequent_term_count
        );
    }

    Ok(())
}

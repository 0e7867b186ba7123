use anyhow::{Context, Result, bail};
use rustyline::DefaultEditor;
use tessera::SearchEngine;

use crate::cli::SearchArgs;
use crate::output::{self, OutputFormat};

/// Load an index and run a single query or an interactive session.
pub fn run(args: SearchArgs, format: OutputFormat) -> Result<()> {
    let mut engine = SearchEngine::new();
    engine
        .load_index(&args.index)
        .with_context(|| format!("Failed to load index from {}", args.index.display()))?;

    if args.interactive {
        run_interactive(&mut engine, args.limit, format)?;
    } else {
        let Some(query) = args.query.as_deref() else {
            bail!("A query is required (or use --interactive)");
        };
        let result = engine.search(query, args.limit);
        if !result.syntax_valid {
            bail!(
                "{}",
                result.error_message.as_deref().unwrap_or("invalid query")
            );
        }
        output::print_search_result(&engine, &result, format);
    }

    if let Some(path) = &args.stats {
        engine
            .export_stats(path)
            .with_context(|| format!("Failed to export statistics to {}", path.display()))?;
        eprintln!("Search statistics written to {}.", path.display());
    }

    Ok(())
}

fn run_interactive(
    engine: &mut SearchEngine,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("Tessera interactive search (type 'quit' to exit)");

    loop {
        let line = match rl.readline("query> ") {
            Ok(line) => line,
            Err(
                rustyline::error::ReadlineError::Interrupted | rustyline::error::ReadlineError::Eof,
            ) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(query);

        if query == "quit" || query == "exit" {
            break;
        }

        let result = engine.search(query, limit);
        if !result.syntax_valid {
            eprintln!(
                "Error: {}",
                result.error_message.as_deref().unwrap_or("invalid query")
            );
            continue;
        }
        output::print_search_result(engine, &result, format);
        println!();
    }

    println!("Goodbye.");
    Ok(())
}

//! Save/load behavior of the binary index format.

use tempfile::TempDir;
use tessera::{Document, InvertedIndex, SearchEngine};

fn build_index() -> InvertedIndex {
    let mut index = InvertedIndex::new();
    index.index_document(Document::new("Doc 0", "u0", "red car fast red"));
    index.index_document(Document::new("Doc 1", "u1", "blue car slow"));
    index.index_document(Document::new("Doc 2", "u2", "red motorbike fast"));
    index.optimize();
    index
}

#[test]
fn test_structural_round_trip() -> tessera::Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.bin");

    let original = build_index();
    original.save_to_file(&path)?;

    let mut loaded = InvertedIndex::new();
    loaded.load_from_file(&path)?;

    assert_eq!(loaded.document_count(), original.document_count());
    assert_eq!(loaded.term_count(), original.term_count());
    assert_eq!(loaded.posting_count(), original.posting_count());
    assert!(loaded.validate());

    // Terms survive as a set (and here, in emission order too).
    assert_eq!(loaded.all_terms(), original.all_terms());

    // Postings list sizes and frequencies survive.
    for term in original.all_terms() {
        let before = original.find_postings(term).unwrap();
        let after = loaded.find_postings(term).unwrap();
        assert_eq!(before.len(), after.len(), "postings for {term}");
        for (b, a) in before.iter().zip(after) {
            assert_eq!(b.doc_id, a.doc_id);
            assert_eq!(b.frequency(), a.frequency());
        }
    }

    // Collection frequencies are intact.
    assert_eq!(loaded.term_frequency("red"), 3);
    assert_eq!(loaded.term_frequency("car"), 2);
    Ok(())
}

#[test]
fn test_boolean_queries_work_on_loaded_index() -> tessera::Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.bin");
    build_index().save_to_file(&path)?;

    let mut engine = SearchEngine::new();
    engine.load_index(&path)?;

    assert_eq!(engine.search("red && car", 10).doc_ids, vec![0]);
    assert_eq!(engine.search("red || blue", 10).doc_ids, vec![0, 1, 2]);
    assert_eq!(engine.search("car && !red", 10).doc_ids, vec![1]);
    Ok(())
}

#[test]
fn test_positional_queries_on_loaded_index_return_empty() -> tessera::Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.bin");
    build_index().save_to_file(&path)?;

    let mut engine = SearchEngine::new();
    engine.load_index(&path)?;

    // Positions are not persisted, so positional predicates cannot verify.
    let result = engine.search("\"red car\"", 10);
    assert!(result.syntax_valid);
    assert!(result.doc_ids.is_empty());

    let result = engine.search("\"red car\" / 5", 10);
    assert!(result.doc_ids.is_empty());
    Ok(())
}

#[test]
fn test_positions_are_placeholders_after_load() -> tessera::Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.bin");
    build_index().save_to_file(&path)?;

    let mut loaded = InvertedIndex::new();
    loaded.load_from_file(&path)?;

    let red = loaded.find_postings("red").unwrap();
    let doc0 = red.iter().find(|p| p.doc_id == 0).unwrap();
    assert_eq!(doc0.frequency(), 2);
    assert_eq!(doc0.positions, vec![0, 0]);
    Ok(())
}

#[test]
fn test_document_metadata_survives_without_content() -> tessera::Result<()> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.bin");
    build_index().save_to_file(&path)?;

    let mut loaded = InvertedIndex::new();
    loaded.load_from_file(&path)?;

    let doc = loaded.get_document(2)?;
    assert_eq!(doc.title, "Doc 2");
    assert_eq!(doc.url, "u2");
    assert_eq!(doc.length, 3);
    assert!(doc.content.is_empty());

    assert_eq!(loaded.get_document_by_url("u1").unwrap().id, 1);
    Ok(())
}

#[test]
fn test_load_garbage_fails_without_clobbering_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.bin");
    std::fs::write(&path, b"this is not an index").unwrap();

    let mut index = build_index();
    assert!(index.load_from_file(&path).is_err());

    // The in-memory index is untouched, positions included.
    assert_eq!(index.document_count(), 3);
    let red = index.find_postings("red").unwrap();
    assert_eq!(red[0].positions, vec![0, 3]);
    assert!(index.validate());
}

#[test]
fn test_engine_load_failure_exits_cleanly() {
    let mut engine = SearchEngine::new();
    let err = engine.load_index(std::path::Path::new("/nonexistent/index.bin"));
    assert!(err.is_err());
    assert_eq!(engine.index().document_count(), 0);
}

//! Boolean-algebra laws over evaluation results, checked against randomly
//! generated corpora and queries.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera::{Document, InvertedIndex, QueryAst, QueryEvaluator, QueryParser};

const VOCAB: &[&str] = &[
    "red", "blue", "green", "car", "bike", "fast", "slow", "city",
];

fn random_index(rng: &mut StdRng, doc_count: usize) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for i in 0..doc_count {
        let words: Vec<&str> = (0..rng.gen_range(5..12))
            .map(|_| VOCAB[rng.gen_range(0..VOCAB.len())])
            .collect();
        index.index_document(Document::new(
            format!("Doc {i}"),
            format!("doc-{i}"),
            words.join(" "),
        ));
    }
    index.optimize();
    index
}

fn random_ast(rng: &mut StdRng, depth: usize) -> QueryAst {
    if depth == 0 || rng.gen_range(0..4) == 0 {
        return QueryAst::Term(VOCAB[rng.gen_range(0..VOCAB.len())].to_string());
    }
    match rng.gen_range(0..3) {
        0 => QueryAst::And(
            Box::new(random_ast(rng, depth - 1)),
            Box::new(random_ast(rng, depth - 1)),
        ),
        1 => QueryAst::Or(
            Box::new(random_ast(rng, depth - 1)),
            Box::new(random_ast(rng, depth - 1)),
        ),
        _ => QueryAst::Not(Box::new(random_ast(rng, depth - 1))),
    }
}

fn eval_set(index: &InvertedIndex, ast: &QueryAst) -> BTreeSet<usize> {
    QueryEvaluator::new(index).evaluate(ast).ones().collect()
}

#[test]
fn test_conjunction_is_set_intersection() {
    let mut rng = StdRng::seed_from_u64(1);
    let index = random_index(&mut rng, 48);

    for _ in 0..50 {
        let a = random_ast(&mut rng, 2);
        let b = random_ast(&mut rng, 2);
        let and = QueryAst::And(Box::new(a.clone()), Box::new(b.clone()));

        let expected: BTreeSet<usize> = eval_set(&index, &a)
            .intersection(&eval_set(&index, &b))
            .copied()
            .collect();
        assert_eq!(eval_set(&index, &and), expected, "A={a} B={b}");
    }
}

#[test]
fn test_disjunction_is_set_union() {
    let mut rng = StdRng::seed_from_u64(2);
    let index = random_index(&mut rng, 48);

    for _ in 0..50 {
        let a = random_ast(&mut rng, 2);
        let b = random_ast(&mut rng, 2);
        let or = QueryAst::Or(Box::new(a.clone()), Box::new(b.clone()));

        let expected: BTreeSet<usize> = eval_set(&index, &a)
            .union(&eval_set(&index, &b))
            .copied()
            .collect();
        assert_eq!(eval_set(&index, &or), expected, "A={a} B={b}");
    }
}

#[test]
fn test_negation_is_set_complement() {
    let mut rng = StdRng::seed_from_u64(3);
    let index = random_index(&mut rng, 48);
    let universe: BTreeSet<usize> = (0..index.document_count()).collect();

    for _ in 0..50 {
        let a = random_ast(&mut rng, 2);
        let not = QueryAst::Not(Box::new(a.clone()));

        let expected: BTreeSet<usize> = universe
            .difference(&eval_set(&index, &a))
            .copied()
            .collect();
        assert_eq!(eval_set(&index, &not), expected, "A={a}");
    }
}

#[test]
fn test_idempotence_and_double_negation() {
    let mut rng = StdRng::seed_from_u64(4);
    let index = random_index(&mut rng, 48);

    for _ in 0..50 {
        let a = random_ast(&mut rng, 2);
        let base = eval_set(&index, &a);

        let and_self = QueryAst::And(Box::new(a.clone()), Box::new(a.clone()));
        assert_eq!(eval_set(&index, &and_self), base, "A={a}");

        let or_self = QueryAst::Or(Box::new(a.clone()), Box::new(a.clone()));
        assert_eq!(eval_set(&index, &or_self), base, "A={a}");

        let not_not = QueryAst::Not(Box::new(QueryAst::Not(Box::new(a.clone()))));
        assert_eq!(eval_set(&index, &not_not), base, "A={a}");
    }
}

#[test]
fn test_optimizer_preserves_result_sets() {
    let mut rng = StdRng::seed_from_u64(5);
    let index = random_index(&mut rng, 48);
    let parser = QueryParser::new();

    for _ in 0..100 {
        let ast = random_ast(&mut rng, 3);
        let before = eval_set(&index, &ast);
        let optimized = parser.optimize(ast.clone());
        assert_eq!(eval_set(&index, &optimized), before, "A={ast}");
    }
}

#[test]
fn test_random_corpus_invariants() {
    let mut rng = StdRng::seed_from_u64(6);

    for round in 0..5 {
        let index = random_index(&mut rng, 16 + round * 16);
        assert!(index.validate());

        // Posting referential integrity and position consistency.
        for term in index.all_terms() {
            let postings = index.find_postings(term).unwrap();
            for posting in postings {
                assert!((posting.doc_id as usize) < index.document_count());
                assert_eq!(posting.positions.len(), posting.frequency() as usize);
                assert!(
                    posting.positions.windows(2).all(|w| w[0] < w[1]),
                    "positions strictly increasing"
                );
            }
        }

        // URL injectivity: re-adding an existing url does not grow the
        // document table.
        let mut index = index;
        let before = index.document_count();
        index.index_document(Document::new("Dup", "doc-0", "red blue green"));
        assert_eq!(index.document_count(), before);
    }
}

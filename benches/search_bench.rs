use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tessera::{Document, InvertedIndex, QueryEvaluator, QueryParser};

const VOCAB: &[&str] = &[
    "red", "blue", "green", "yellow", "car", "bike", "train", "plane", "fast",
    "slow", "city", "road", "river", "bridge", "engine", "wheel",
];

fn build_index(doc_count: usize) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for i in 0..doc_count {
        // Deterministic pseudo-random content.
        let mut state = i as u64 * 6364136223846793005 + 1442695040888963407;
        let mut words = Vec::with_capacity(24);
        for _ in 0..24 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            words.push(VOCAB[(state >> 33) as usize % VOCAB.len()]);
        }
        index.index_document(Document::new(
            format!("Doc {i}"),
            format!("doc-{i}"),
            words.join(" "),
        ));
    }
    index.optimize();
    index
}

fn bench_indexing(c: &mut Criterion) {
    c.bench_function("index_1000_docs", |b| {
        b.iter(|| black_box(build_index(1000)));
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let index = build_index(5000);
    let parser = QueryParser::new();

    let boolean = parser
        .parse("(red || blue) && car && !slow")
        .unwrap()
        .unwrap();
    c.bench_function("eval_boolean_5000_docs", |b| {
        let evaluator = QueryEvaluator::new(&index);
        b.iter(|| black_box(evaluator.evaluate(&boolean)));
    });

    let phrase = parser.parse("\"red car\"").unwrap().unwrap();
    c.bench_function("eval_phrase_5000_docs", |b| {
        let evaluator = QueryEvaluator::new(&index);
        b.iter(|| black_box(evaluator.evaluate(&phrase)));
    });

    let proximity = parser.parse("\"red car\" / 5").unwrap().unwrap();
    c.bench_function("eval_proximity_5000_docs", |b| {
        let evaluator = QueryEvaluator::new(&index);
        b.iter(|| black_box(evaluator.evaluate(&proximity)));
    });
}

criterion_group!(benches, bench_indexing, bench_evaluation);
criterion_main!(benches);

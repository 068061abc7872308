//! Criterion benchmarks for searcher trees.
//!
//! Covers leaf term iteration, conjunction and both disjunction strategies,
//! phrase matching and top-N collection over a synthetic in-memory index.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use phalanx::config::SearcherConfig;
use phalanx::index::{MemoryDocument, MemoryIndex};
use phalanx::search::searcher::{
    TermSearcher, new_conjunction_searcher, new_disjunction_searcher, new_phrase_searcher,
};
use phalanx::search::{ScoreMode, SearchContext, Searcher, SearcherOptions, TopNCollector};
use std::hint::black_box;

const WORDS: [&str; 24] = [
    "search", "engine", "full", "text", "index", "query", "document", "field", "term", "phrase",
    "boolean", "score", "posting", "segment", "merge", "reader", "writer", "token", "filter",
    "heap", "slice", "match", "pool", "collector",
];

/// Build an index whose documents cycle through the vocabulary at different strides.
fn build_index(count: usize) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    for i in 0..count {
        let length = 8 + (i % 24);
        let tokens: Vec<&str> = (0..length)
            .map(|j| WORDS[(i * 7 + j * (1 + i % 5)) % WORDS.len()])
            .collect();
        index
            .add_document(MemoryDocument::new(format!("doc{i}")).add_tokens("body", &tokens))
            .expect("unique document ids");
    }
    index
}

fn term_searchers(index: &MemoryIndex, terms: &[&str], options: &SearcherOptions) -> Vec<Box<dyn Searcher>> {
    terms
        .iter()
        .map(|term| {
            Box::new(TermSearcher::new(index, term, "body", 1.0, options).expect("term searcher"))
                as Box<dyn Searcher>
        })
        .collect()
}

fn drain(searcher: &mut dyn Searcher) -> usize {
    let mut ctx = SearchContext::new(searcher.document_match_pool_size());
    let mut hits = 0;
    while let Some(m) = searcher.next(&mut ctx).expect("search") {
        hits += 1;
        ctx.pool.put(m);
    }
    hits
}

fn bench_term(c: &mut Criterion) {
    let index = build_index(20_000);
    let mut group = c.benchmark_group("term");
    group.throughput(Throughput::Elements(index.doc_freq("body", "search")));

    group.bench_function("scored", |b| {
        b.iter(|| {
            let mut searcher =
                TermSearcher::new(&index, "search", "body", 1.0, &SearcherOptions::default())
                    .expect("term searcher");
            black_box(drain(&mut searcher))
        })
    });
    group.finish();
}

fn bench_conjunction(c: &mut Criterion) {
    let index = build_index(20_000);
    let mut group = c.benchmark_group("conjunction");

    for (name, options) in [
        ("scored", SearcherOptions::default()),
        ("unadorned", SearcherOptions::default().with_score(ScoreMode::None)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut searcher = new_conjunction_searcher(
                    term_searchers(&index, &["search", "index", "query"], &options),
                    &options,
                )
                .expect("conjunction");
                black_box(drain(searcher.as_mut()))
            })
        });
    }
    group.finish();
}

fn bench_disjunction_strategies(c: &mut Criterion) {
    let index = build_index(20_000);
    let options = SearcherOptions::default();
    let mut group = c.benchmark_group("disjunction");

    for fan_out in [4usize, 12, 24] {
        let terms = &WORDS[..fan_out];
        for (strategy, takeover) in [("slice", usize::MAX), ("heap", 1)] {
            let config = SearcherConfig::default().with_disjunction_heap_takeover(takeover);
            group.bench_with_input(BenchmarkId::new(strategy, fan_out), &fan_out, |b, _| {
                b.iter(|| {
                    let mut searcher = new_disjunction_searcher(
                        term_searchers(&index, terms, &options),
                        1,
                        &options,
                        &config,
                    )
                    .expect("disjunction");
                    black_box(drain(searcher.as_mut()))
                })
            });
        }
    }
    group.finish();
}

fn bench_phrase(c: &mut Criterion) {
    let index = build_index(20_000);
    let options = SearcherOptions::default();
    let config = SearcherConfig::default();
    let mut group = c.benchmark_group("phrase");

    for slop in [0usize, 2] {
        group.bench_with_input(BenchmarkId::new("slop", slop), &slop, |b, &slop| {
            b.iter(|| {
                let mut searcher = new_phrase_searcher(
                    &index,
                    &["search", "engine"],
                    "body",
                    slop,
                    1.0,
                    &options,
                    &config,
                )
                .expect("phrase");
                black_box(drain(searcher.as_mut()))
            })
        });
    }
    group.finish();
}

fn bench_collector(c: &mut Criterion) {
    let index = build_index(20_000);
    let options = SearcherOptions::default();
    let config = SearcherConfig::default();

    c.bench_function("collector_top_10", |b| {
        b.iter(|| {
            let mut searcher = new_disjunction_searcher(
                term_searchers(&index, &["search", "query", "score"], &options),
                0,
                &options,
                &config,
            )
            .expect("disjunction");
            let result = TopNCollector::new(10, 0)
                .collect(searcher.as_mut(), &index)
                .expect("collect");
            black_box(result.total_hits)
        })
    });
}

criterion_group!(
    benches,
    bench_term,
    bench_conjunction,
    bench_disjunction_strategies,
    bench_phrase,
    bench_collector
);
criterion_main!(benches);

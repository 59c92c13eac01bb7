//! Benchmark suite for danci-vocab-core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use danci_vocab_core::{normalize, ChaChaShuffle, Chapter, DuplicateIndex, ReviewSession, Word};

fn sample_chapters(chapters: usize, words_per_chapter: usize) -> Vec<Chapter> {
    (0..chapters)
        .map(|c| {
            let words = (0..words_per_chapter)
                .map(|w| {
                    // 约一半的单词在相邻章节中重复出现
                    let text = format!("Word-{}", (c * words_per_chapter + w) / 2);
                    Word::new(format!("{c}-{w}"), text, "").with_priority((w % 5) as i32)
                })
                .collect();
            Chapter::new(format!("ch{c}"), format!("Chapter {c}"), words)
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box("  Hello, World! 사 과 ")))
    });
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("DuplicateIndex::from_chapters");
    for &chapters in &[10usize, 100] {
        let data = sample_chapters(chapters, 50);
        group.bench_with_input(BenchmarkId::from_parameter(chapters), &data, |b, data| {
            b.iter(|| DuplicateIndex::from_chapters(data.iter()))
        });
    }
    group.finish();
}

fn bench_index_lookup(c: &mut Criterion) {
    let data = sample_chapters(100, 50);
    let index = DuplicateIndex::from_chapters(data.iter());

    c.bench_function("DuplicateIndex::info", |b| {
        b.iter(|| index.info(black_box("ch3"), black_box("word-75")))
    });
}

fn bench_session_build(c: &mut Criterion) {
    let data = sample_chapters(1, 500);
    let words = data[0].words.clone();

    c.bench_function("ReviewSession::new/500", |b| {
        b.iter(|| ReviewSession::new(words.clone(), &mut ChaChaShuffle::with_seed(42)))
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_index_build,
    bench_index_lookup,
    bench_session_build
);
criterion_main!(benches);

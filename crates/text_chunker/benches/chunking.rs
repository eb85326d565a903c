use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use text_chunker::{Chunker, MultilingualEstimator, TokenChunker};

// Plain text shaped like extracted PDF output: short lines, blank lines
// between paragraphs.
fn generate_text(word_count: usize) -> String {
    let mut content = String::new();
    let mut words_written = 0;
    let mut paragraph = 1;

    while words_written < word_count {
        content.push_str(&format!("Section {}\n", paragraph));
        words_written += 2;

        let paragraph_size = (word_count - words_written).min(120);
        for i in 0..paragraph_size {
            content.push_str("word ");
            words_written += 1;

            if i % 12 == 11 {
                content.push_str("sentence.\n");
            }
        }

        content.push_str("\n\n");
        paragraph += 1;
    }

    content
}

// Character mode with varying document sizes
fn benchmark_varying_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_size");

    for size in [1_000, 5_000, 10_000, 50_000, 100_000].iter() {
        let text = generate_text(*size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_words", size)),
            &text,
            |b, text| {
                let chunker = Chunker::default();
                b.iter(|| {
                    let chunks = chunker.split(black_box(text));
                    black_box(chunks);
                });
            },
        );
    }

    group.finish();
}

fn benchmark_configurations(c: &mut Criterion) {
    let text = generate_text(10_000);
    let mut group = c.benchmark_group("configurations");

    group.bench_function("characters_default", |b| {
        let chunker = Chunker::default();
        b.iter(|| {
            let chunks = chunker.create_document_chunks(black_box(&text), None);
            black_box(chunks);
        });
    });

    group.bench_function("characters_small_300", |b| {
        let chunker = Chunker::builder()
            .chunk_size(300)
            .chunk_overlap(50)
            .build()
            .unwrap();
        b.iter(|| {
            let chunks = chunker.split(black_box(&text));
            black_box(chunks);
        });
    });

    group.bench_function("characters_no_overlap", |b| {
        let chunker = Chunker::builder().chunk_overlap(0).build().unwrap();
        b.iter(|| {
            let chunks = chunker.split(black_box(&text));
            black_box(chunks);
        });
    });

    group.bench_function("tokens_default", |b| {
        let chunker = TokenChunker::default();
        b.iter(|| {
            let chunks = chunker.split(black_box(&text));
            black_box(chunks);
        });
    });

    group.bench_function("tokens_small_100", |b| {
        let chunker = TokenChunker::builder()
            .max_tokens(100)
            .overlap_tokens(20)
            .build()
            .unwrap();
        b.iter(|| {
            let chunks = chunker.split(black_box(&text));
            black_box(chunks);
        });
    });

    group.finish();
}

// One long unbroken line forces the word and grapheme fallbacks
fn benchmark_oversized_segments(c: &mut Criterion) {
    let mut text = "word ".repeat(20_000);
    text.push_str(&"x".repeat(10_000));

    c.bench_function("tokens_oversized_segment", |b| {
        let chunker = TokenChunker::builder()
            .max_tokens(200)
            .overlap_tokens(20)
            .build()
            .unwrap();
        b.iter(|| {
            let chunks = chunker.split(black_box(&text));
            black_box(chunks);
        });
    });
}

fn benchmark_multilingual(c: &mut Criterion) {
    let mut text = String::new();

    for _ in 0..100 {
        text.push_str("これはサンプルテキストです。\n");
    }
    text.push_str("\n\n");
    for _ in 0..100 {
        text.push_str("这是示例文本。\n");
    }

    c.bench_function("multilingual_cjk", |b| {
        let chunker = TokenChunker::builder()
            .max_tokens(200)
            .overlap_tokens(20)
            .estimator(MultilingualEstimator)
            .build()
            .unwrap();
        b.iter(|| {
            let chunks = chunker.split(black_box(&text));
            black_box(chunks);
        });
    });
}

criterion_group!(
    benches,
    benchmark_varying_sizes,
    benchmark_configurations,
    benchmark_oversized_segments,
    benchmark_multilingual
);
criterion_main!(benches);

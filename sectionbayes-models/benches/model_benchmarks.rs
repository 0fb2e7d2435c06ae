use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;
use sectionbayes_core::{ClassifierConfig, QueryRecord, Result, TrainingRecord};
use sectionbayes_models::{ModelTables, RawCounts, Ranker, SectionNaiveBayes, VecSink};

/// Deterministic corpus: `classes` labels spread over sections `a`..,
/// each document carrying `features` sparse tokens.
fn make_corpus(rows: usize, classes: usize, features: usize) -> Vec<String> {
    (0..rows)
        .map(|i| {
            let class = i % classes;
            let section = (b'a' + (class % 6) as u8) as char;
            let mut line = format!("{section}{class}");
            for j in 0..features {
                let feature = (class * 7 + j * 13 + i % 5) % 997;
                let count = 1 + (i + j) % 4;
                line.push_str(&format!(" {feature}:{count}"));
            }
            line
        })
        .collect()
}

fn ok_lines(lines: &[String]) -> impl Iterator<Item = Result<&str>> {
    lines.iter().map(|l| Ok(l.as_str()))
}

fn bench_aggregation(c: &mut Criterion) {
    let corpus = make_corpus(5_000, 60, 40);
    let records: Vec<TrainingRecord> = corpus
        .iter()
        .enumerate()
        .filter_map(|(i, l)| TrainingRecord::parse(i + 1, l).unwrap())
        .collect();

    let mut group = c.benchmark_group("aggregation");
    group.bench_function("parse_5000x40", |b| {
        b.iter(|| {
            for (i, line) in corpus.iter().enumerate() {
                black_box(TrainingRecord::parse(i + 1, black_box(line)).unwrap());
            }
        })
    });

    group.bench_function("record_5000x40", |b| {
        b.iter_batched(
            RawCounts::new,
            |mut counts| {
                for record in &records {
                    counts.record(black_box(record)).unwrap();
                }
                black_box(counts);
            },
            BatchSize::SmallInput,
        )
    });

    let mut counts = RawCounts::new();
    for record in &records {
        counts.record(record).unwrap();
    }
    group.bench_function("build_tables_60_classes", |b| {
        b.iter(|| {
            let tables = ModelTables::build(black_box(&counts), Default::default()).unwrap();
            black_box(tables);
        })
    });
    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let corpus = make_corpus(5_000, 60, 40);
    let queries = make_corpus(1_000, 60, 20);

    let mut model = SectionNaiveBayes::new(ClassifierConfig::default());
    model.fit_lines(ok_lines(&corpus)).unwrap();

    let records: Vec<QueryRecord> = queries
        .iter()
        .enumerate()
        .filter_map(|(i, l)| QueryRecord::parse(i + 1, l).unwrap())
        .collect();
    let scorer = model.scorer().unwrap();
    let ranker = Ranker::from_config(model.config());

    let mut group = c.benchmark_group("prediction");
    group.bench_function("score_1000x20_60_classes", |b| {
        b.iter(|| {
            let scores = scorer.score_documents(black_box(&records));
            black_box(scores);
        })
    });

    group.bench_function("rank_top3_1000", |b| {
        b.iter_batched(
            || scorer.score_documents(&records),
            |scored| {
                for scores in scored {
                    black_box(ranker.rank_line(scores));
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("predict_stream_1000", |b| {
        b.iter(|| {
            let mut sink = VecSink::new();
            let summary = model.predict_stream(ok_lines(&queries), &mut sink).unwrap();
            black_box(summary);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_aggregation, bench_prediction);
criterion_main!(benches);

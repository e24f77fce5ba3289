use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;
use std::io::Cursor;

// Import from the library
use citegraph::common::ReferenceStats;
use citegraph::extract::{hash_document_data, hashable_terms, Extractor, Stopwords};
use citegraph::streaming::RecordReader;

fn stopwords() -> Stopwords {
    Stopwords::from_words(["a", "an", "and", "for", "in", "of", "on", "the", "to"])
}

fn bench_identity_hashing(c: &mut Criterion) {
    let pairs = vec![
        ("authoritative sources hyperlinked environment", "Kleinberg"),
        ("anatomy large scale hypertextual web search engine", "Brin"),
        ("pagerank citation ranking bringing order web", "Page"),
        ("efficient identification web communities", "Flake"),
        ("mining knowledge sharing sites viral marketing", "Richardson"),
    ];

    let mut group = c.benchmark_group("identity_hashing");
    group.throughput(Throughput::Elements(pairs.len() as u64));

    group.bench_function("hash_document_data", |b| {
        b.iter(|| {
            for (title, surname) in &pairs {
                black_box(hash_document_data(title, surname));
            }
        })
    });

    group.bench_function("hashable_terms", |b| {
        let stopwords = stopwords();
        b.iter(|| {
            for (title, _) in &pairs {
                black_box(hashable_terms(title, &stopwords));
            }
        })
    });

    group.finish();
}

fn bench_record_extraction(c: &mut Criterion) {
    let extractor = Extractor::new(stopwords());
    let record = json!({
        "head": {
            "title": "A Study of Citation Graph Extraction at Corpus Scale",
            "authors": [
                {"given": "Jane", "surname": "Doe"},
                {"given": "John", "surname": "Roe"}
            ],
            "aggregation-type": "Journal",
            "publication-name": "Journal of Benchmark Studies",
            "cover-date": 2004
        },
        "bibliography": {
            "references": (0..20).map(|i| json!({
                "contribution": {
                    "title": format!("Cited Paper Number {} With A Real Title", i),
                    "authors": [{"given": "Cited", "surname": format!("Surname{}", i)}]
                },
                "host": {"title": "Some Host Publication"}
            })).collect::<Vec<_>>()
        }
    });

    c.bench_function("extract_record_with_20_references", |b| {
        b.iter(|| {
            let mut stats = ReferenceStats::default();
            black_box(extractor.extract(
                black_box(&record),
                "archive.tar.gz:records/1.json",
                &mut stats,
            ))
        })
    });
}

fn bench_partition_decoding(c: &mut Criterion) {
    // One partition with 1000 records of 5 references each
    let mut text = String::new();
    for i in 0..1000 {
        text.push_str(&format!("#*Benchmark Paper Number {}\n", i));
        text.push_str("#@Jane Doe,John Roe\n");
        text.push_str("#year2004\n");
        text.push_str("#confJournal of Benchmark Studies\n");
        text.push_str(&format!(
            "#index{}\n",
            hash_document_data(&format!("benchmark paper number {}", i), "Doe")
        ));
        for j in 0..5 {
            text.push_str(&format!(
                "#%{}\n",
                hash_document_data(&format!("cited paper {}", j), "Roe")
            ));
        }
        text.push('\n');
    }

    let mut group = c.benchmark_group("partition_decoding");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("decode_1000_records", |b| {
        b.iter(|| {
            let reader = RecordReader::new(Cursor::new(text.as_bytes()));
            black_box(reader.map(|r| r.unwrap()).count())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_identity_hashing,
    bench_record_extraction,
    bench_partition_decoding
);
criterion_main!(benches);

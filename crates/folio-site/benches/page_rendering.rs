//! Benchmarks for page rendering performance.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use folio_locale::{FallbackPolicy, Locale};
use folio_renderer::RenderOptions;
use folio_site::Site;
use folio_storage::{ContentRecord, FsStorage, Storage};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "Paragraph {j} in section {i} has **bold**, *italic* and [a link](https://example.com/{j}).\n\n"
            ));
        }
        md.push_str("```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\n");
    }
    md
}

fn site_with(records: &[ContentRecord]) -> (tempfile::TempDir, Site) {
    let temp_dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::new(temp_dir.path().to_path_buf());
    for record in records {
        storage.put(record).unwrap();
    }
    let policy = FallbackPolicy::new(Locale::parse("ko").unwrap());
    let site = Site::new(Arc::new(storage), policy, RenderOptions::default());
    (temp_dir, site)
}

fn bench_render_varying_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_by_size");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        let slug = format!("doc-{headings}-{paragraphs}");
        let (_dir, site) = site_with(&[ContentRecord::new(&slug, "ko", "Doc", markdown.as_str())]);

        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{headings}h_{paragraphs}p")),
            &slug,
            |b, slug| b.iter(|| site.render_page(slug, "ko")),
        );
    }

    group.finish();
}

fn bench_fallback_lookup(c: &mut Criterion) {
    let (_dir, site) = site_with(&[ContentRecord::new(
        "post",
        "ko",
        "Post",
        generate_markdown(5, 2).as_str(),
    )]);

    c.bench_function("render_with_fallback", |b| {
        b.iter(|| site.render_page("post", "pt-BR"));
    });
}

fn bench_build(c: &mut Criterion) {
    let records: Vec<ContentRecord> = (0..32)
        .flat_map(|i| {
            let markdown = generate_markdown(10, 2);
            ["ko", "en"].map(|locale| {
                ContentRecord::new(format!("post-{i}"), locale, "Post", markdown.as_str())
                    .with_published_at("2024-01-01")
            })
        })
        .collect();
    let (_dir, site) = site_with(&records);

    c.bench_function("build_64_pages", |b| b.iter(|| site.build()));
}

criterion_group!(
    benches,
    bench_render_varying_sizes,
    bench_fallback_lookup,
    bench_build
);
criterion_main!(benches);

//! End-to-end extraction benchmarks: input folder → Markdown files.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use convert_core::options::ConversionOptions;
use convert_core::pipeline::PipelineBuilder;
use docmark::default_registry;

fn generate_html(sections: usize) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head><title>Bench</title></head>\n<body>\n");
    for i in 0..sections {
        html.push_str(&format!(
            "<h2>Section {}</h2>\n\
             <p>Lorem ipsum dolor sit amet, <b>consectetur</b> adipiscing elit.</p>\n\
             <ul><li>one</li><li>שניים</li></ul>\n\
             <table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>\n",
            i
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn generate_csv(rows: usize) -> String {
    let mut csv = String::from("id,name,comment\n");
    for i in 0..rows {
        csv.push_str(&format!("{},item {},\"quoted, with comma\"\n", i, i));
    }
    csv
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("E2E_folder_to_markdown");
    group.sample_size(10);

    for n in [10, 100] {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("page.html"), generate_html(n)).unwrap();
        std::fs::write(input.join("data.csv"), generate_csv(n * 10)).unwrap();
        let output = dir.path().join("output");

        let pipeline = PipelineBuilder::new()
            .registry(default_registry())
            .build()
            .unwrap();
        let options = ConversionOptions::default();

        group.bench_function(format!("{}_sections", n), |b| {
            b.iter(|| pipeline.run(black_box(&input), &output, &options).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch);
criterion_main!(benches);

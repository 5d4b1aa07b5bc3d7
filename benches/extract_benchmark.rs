//! Benchmarks for unmht decomposition and table extraction.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic MHT documents with spanned tables.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates an HTML page with `table_count` tables of `row_count` rows each.
/// Every table opens with a rowspan and a colspan cell.
fn create_test_html(table_count: usize, row_count: usize) -> String {
    let mut html = String::from("<html><body>");
    for t in 0..table_count {
        html.push_str(&format!("<p><b>{}. Section {}</b></p>", t + 1, t + 1));
        html.push_str("<table><tr><th>Name</th><th>Spec</th><th>Qty</th><th>Note</th></tr>");
        html.push_str("<tr><td rowspan=\"3\">Group</td><td colspan=\"2\">Wide</td><td>n</td></tr>");
        for r in 0..row_count {
            html.push_str(&format!(
                "<tr><td>M{r}</td><td>{r}</td><td><img src=\"img_{t}_{r}.png\"></td></tr>"
            ));
        }
        html.push_str("</table>");
    }
    html.push_str("</body></html>");
    html
}

/// Wraps HTML and a few images into a multipart/related document.
fn create_test_mht(html: &str, image_count: usize) -> Vec<u8> {
    let mut mht = String::from(
        "MIME-Version: 1.0\r\nContent-Type: multipart/related; boundary=\"BENCH\"\r\n\r\n",
    );
    mht.push_str("--BENCH\r\nContent-Type: text/html; charset=\"utf-8\"\r\n");
    mht.push_str("Content-Location: file:///C:/bench.htm\r\n\r\n");
    mht.push_str(html);
    mht.push_str("\r\n");
    for i in 0..image_count {
        mht.push_str("--BENCH\r\nContent-Type: image/png\r\nContent-Transfer-Encoding: base64\r\n");
        mht.push_str(&format!(
            "Content-Location: file:///C:/bench_files/img_0_{}.png\r\n\r\naGVsbG8gd29ybGQ=\r\n",
            i
        ));
    }
    mht.push_str("--BENCH--\r\n");
    mht.into_bytes()
}

/// Benchmark MIME format detection.
fn bench_format_detection(c: &mut Criterion) {
    let mht = create_test_mht(&create_test_html(1, 5), 5);
    let non_mht = b"<!DOCTYPE html><html><body>not a MIME document</body></html>";

    c.bench_function("detect_valid_mht", |b| {
        b.iter(|| unmht::detect_format_from_bytes(black_box(&mht)).unwrap());
    });

    c.bench_function("detect_non_mht", |b| {
        b.iter(|| unmht::detect_format_from_bytes(black_box(non_mht)).is_err());
    });
}

/// Benchmark decomposition at various part counts.
fn bench_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("decomposition");

    for image_count in [1, 20, 100].iter() {
        let data = create_test_mht(&create_test_html(1, 5), *image_count);

        group.bench_function(format!("{}_images", image_count), |b| {
            b.iter(|| unmht::decompose_bytes(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark table extraction at various table sizes.
fn bench_table_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_extraction");
    let parts = Vec::new();
    let index = unmht::PartIndex::build(&parts);
    let options = unmht::ExtractOptions::default();

    for (tables, rows) in [(1, 10), (10, 10), (5, 200)].iter() {
        let html = create_test_html(*tables, *rows);

        group.bench_function(format!("{}x{}_rows", tables, rows), |b| {
            b.iter(|| unmht::extract_tables(black_box(&html), &index, None, &options));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_decomposition,
    bench_table_extraction,
);
criterion_main!(benches);

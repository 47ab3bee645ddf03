use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use forge_yaml::tokenizer::LexIter;

const DOC: &str = r#"%YAML 1.2
---
invoice: 34843
date: 2001-01-23
bill-to: &id001
  given: Chris
  family: Dumars
  address:
    lines: |
      458 Walkman Dr.
      Suite #292
    city: Royal Oak
    state: MI
ship-to: *id001
product:
  - sku: BL394D
    quantity: 4
    description: Basketball
    price: 450.00
  - sku: BL4438H
    quantity: 1
    description: Super Hoop
    price: 2392.00
tax: 251.42
total: 4443.52
comments: >
  Late afternoon is best.
  Backup contact is Nancy.
...
"#;

fn lex_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(DOC.len() as u64));
    group.bench_function("invoice_doc", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for event in LexIter::from_str(black_box(DOC)) {
                count += event.content.len();
            }
            black_box(count)
        })
    });
    group.finish();
}

criterion_group!(benches, lex_throughput);
criterion_main!(benches);

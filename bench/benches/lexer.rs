use astra::lexer;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

static INPUT: &str = include_str!("../../demos/mandelbrot.astra");

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("lex_in_new", |b| {
        b.iter(|| lexer::lex_in_new(black_box(INPUT)).unwrap());
    });
    c.bench_function("lex_reuse_buffer", |b| {
        let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
        b.iter(|| {
            tokens.clear();
            lexer::lex(black_box(INPUT), &mut tokens).unwrap();
            black_box(tokens.len());
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

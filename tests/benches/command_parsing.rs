use clock_core::interpret;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_interpret(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpret");
    for line in [
        "GET TIME",
        "set date 2024.02.29",
        "SET ALARM 07:30:00",
        "RUN STWATCH ?",
        "SET TIME 24:00:00",
        "THIS IS NOT A COMMAND AT ALL",
    ] {
        group.bench_function(line, |b| b.iter(|| interpret(black_box(line.as_bytes()))));
    }
    group.finish();
}

criterion_group!(benches, bench_interpret);
criterion_main!(benches);

use brewin::{parse_program, BufferedConsole, Evaluator, Scanner};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FIB_PROGRAM: &str = r#"
    func fib(n) {
        if (n < 2) { return n; }
        return fib(n - 1) + fib(n - 2);
    }
    func main() { return fib(18); }
"#;

const LOOP_PROGRAM: &str = r#"
    func main() {
        var i;
        var total;
        for (i = 0; i < 10000; i = i + 1) {
            if (i / 2 * 2 == i) { total = total + i; } else { total = total - 1; }
        }
        print("total: ", total);
    }
"#;

fn lexer_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize fib program", |b| {
        b.iter(|| {
            let mut scanner = Scanner::new(black_box(FIB_PROGRAM));
            scanner.scan_tokens().unwrap()
        })
    });
}

fn parser_benchmark(c: &mut Criterion) {
    c.bench_function("parse loop program", |b| {
        b.iter(|| parse_program(black_box(LOOP_PROGRAM)).unwrap())
    });
}

fn execution_benchmark(c: &mut Criterion) {
    let fib = parse_program(FIB_PROGRAM).unwrap();
    let looping = parse_program(LOOP_PROGRAM).unwrap();

    c.bench_function("run recursive fib(18)", |b| {
        b.iter(|| {
            let mut evaluator = Evaluator::new(BufferedConsole::new());
            evaluator.run(black_box(&fib)).unwrap()
        })
    });

    c.bench_function("run 10k-iteration loop", |b| {
        b.iter(|| {
            let mut evaluator = Evaluator::new(BufferedConsole::new());
            evaluator.run(black_box(&looping)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    lexer_benchmark,
    parser_benchmark,
    execution_benchmark
);
criterion_main!(benches);

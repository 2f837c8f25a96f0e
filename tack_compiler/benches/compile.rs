use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tack_compiler::compile_str;

const SOURCE: &str = r#"
class Game {
    field Array board;
    field int score;
    static int highScore;

    constructor Game new(int size) {
        let board = Array.new(size);
        let score = 0;
        return this;
    }

    method void play() {
        var int turn;
        while (turn < 100) {
            if (score > highScore) {
                let highScore = score;
            } else {
                do Output.printString("no record");
            }
            let board[turn] = score * 2;
            let turn = turn + 1;
        }
        return;
    }

    method int total() {
        return score + highScore;
    }
}
"#;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("compile class", |b| {
        b.iter(|| black_box(compile_str(black_box(SOURCE))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

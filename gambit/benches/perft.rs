/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gambit::*;

fn perft_benchmark(c: &mut Criterion) {
    let startpos = Game::default();
    c.bench_function("Startpos Perft 3", |b| {
        b.iter(|| {
            let startpos = black_box(&startpos);
            let depth = black_box(3);
            black_box(perft(startpos, depth))
        });
    });

    let castling = Game::from_fen(FEN_CASTLING).unwrap();
    c.bench_function("Castling Perft 2", |b| {
        b.iter(|| black_box(perft(black_box(&castling), black_box(2))));
    });
}

fn legality_benchmark(c: &mut Criterion) {
    let game = Game::default();
    c.bench_function("Startpos legal moves", |b| {
        b.iter(|| black_box(black_box(&game).legal_moves()));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = perft_benchmark, legality_benchmark
}
criterion_main!(benches);

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ballot_ledger::{verify_blocks, Ledger, Transaction};
use ballot_nullables::NullClock;
use ballot_work::WorkDifficulty;

fn slate() -> Vec<String> {
    vec!["Candidate A".into(), "Candidate B".into(), "Candidate C".into()]
}

fn bench_record_vote(c: &mut Criterion) {
    let difficulty = WorkDifficulty::new(2).unwrap();
    let mut voter = 0u64;
    let ledger = Ledger::new(slate(), difficulty, Arc::new(NullClock::new(1_700_000_000))).unwrap();

    c.bench_function("record_vote_2_zeros", |b| {
        b.iter(|| {
            voter += 1;
            black_box(
                ledger
                    .record_vote(Transaction::new(format!("voter-{voter}"), "Candidate A"))
                    .unwrap(),
            )
        });
    });
}

fn bench_verify_chain(c: &mut Criterion) {
    let difficulty = WorkDifficulty::new(1).unwrap();
    let ledger = Ledger::new(slate(), difficulty, Arc::new(NullClock::new(1_700_000_000))).unwrap();
    for i in 0..200 {
        ledger
            .record_vote(Transaction::new(format!("voter-{i}"), "Candidate B"))
            .unwrap();
    }
    let blocks = ledger.blocks();

    c.bench_function("verify_201_blocks", |b| {
        b.iter(|| verify_blocks(black_box(&blocks), difficulty).unwrap());
    });
}

criterion_group!(benches, bench_record_vote, bench_verify_chain);
criterion_main!(benches);

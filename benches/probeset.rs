#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::similar_names
)]
use std::collections::HashSet;

use criterion::{Criterion, criterion_group, criterion_main};
use probeset::OpenAddressingSet;
use proptest::{
    prelude::{Strategy, any},
    strategy::ValueTree,
    test_runner::TestRunner,
};

const ITEMS_AMOUNT: usize = 1000;
const SAMPLE_SIZE: usize = 10;

fn hash_set_benches(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let items = proptest::collection::vec(any::<String>(), ITEMS_AMOUNT)
        .new_tree(&mut runner)
        .unwrap()
        .current();

    let mut group = c.benchmark_group("Hash set comparison benchmark");
    group.sample_size(SAMPLE_SIZE);
    group.bench_function("probeset insert", |b| {
        b.iter(|| {
            let mut set = OpenAddressingSet::new();
            for key in items.clone() {
                let _ = set.insert(key);
            }
            set
        });
    });
    group.bench_function("rust std insert", |b| {
        b.iter(|| {
            let mut set = HashSet::new();
            for key in items.clone() {
                set.insert(key);
            }
            set
        });
    });

    let probe_set: OpenAddressingSet<String> = items.iter().cloned().collect();
    let rust_set: HashSet<String> = items.iter().cloned().collect();
    group.bench_function("probeset contains", |b| {
        b.iter(|| items.iter().filter(|key| probe_set.contains(key.as_str())).count());
    });
    group.bench_function("rust std contains", |b| {
        b.iter(|| items.iter().filter(|key| rust_set.contains(key.as_str())).count());
    });

    let mut churned = probe_set.clone();
    group.bench_function("probeset remove and reinsert", |b| {
        b.iter(|| {
            for key in &items {
                if churned.remove(key.as_str()).is_ok() {
                    let _ = churned.insert(key.clone());
                }
            }
        });
    });
    group.finish();
}

criterion_group!(benches, hash_set_benches);

criterion_main!(benches);

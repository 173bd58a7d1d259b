use microsim::bindings::Chain;
use microsim::bindings::Pool;
use microsim::cohort::Cohort;
use microsim::random::Source;
use microsim::schedule::Queue;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        selecting_from_a_small_cohort,
        selecting_from_a_large_cohort,
        churning_adds_and_deletes,
        scheduling_and_dispatching,
        binding_append_and_release,
}

fn occupied(capacity: usize) -> Cohort {
    let mut cohort = Cohort::new(capacity, 2);
    for k in [0, 1] {
        for _ in 0..capacity / 2 {
            let n = cohort.add(k, 1.0).expect("space");
            cohort.induct(n);
        }
    }
    cohort
}

/// selection time must not depend on population size: this pair of
/// benches differ by two orders of magnitude in occupancy
fn selecting_from_a_small_cohort(c: &mut criterion::Criterion) {
    let cohort = occupied(10_000);
    let mut rng = Source::from_seed(1);
    c.bench_function("select from 1e4 individuals", |b| {
        b.iter(|| cohort.select(0, &mut rng))
    });
}

fn selecting_from_a_large_cohort(c: &mut criterion::Criterion) {
    let cohort = occupied(1_000_000);
    let mut rng = Source::from_seed(1);
    c.bench_function("select from 1e6 individuals", |b| {
        b.iter(|| cohort.select(0, &mut rng))
    });
}

fn churning_adds_and_deletes(c: &mut criterion::Criterion) {
    let mut cohort = Cohort::new(100_000, 4);
    let mut rng = Source::from_seed(2);
    for k in 0..4 {
        for _ in 0..20_000 {
            let n = cohort.add(k, 1.0).expect("space");
            cohort.induct(n);
        }
    }
    c.bench_function("add and delete one individual", |b| {
        b.iter(|| {
            let k = rng.below(4);
            let n = cohort.add(k, 1.0).expect("space");
            cohort.induct(n);
            cohort.delete(k, n);
        })
    });
}

fn scheduling_and_dispatching(c: &mut criterion::Criterion) {
    let mut queue = Queue::new(100_001);
    let mut rng = Source::from_seed(3);
    for n in 1..100_000 {
        queue.schedule(n, 1.0 + rng.uniform());
    }
    c.bench_function("pop and reschedule the earliest event", |b| {
        b.iter(|| {
            let (n, t) = queue.next().expect("nonempty");
            queue.schedule(n, t + rng.uniform());
        })
    });
}

fn binding_append_and_release(c: &mut criterion::Criterion) {
    let mut pool = Pool::new(1_000_000);
    c.bench_function("record and bulk-release a contact list", |b| {
        b.iter(|| {
            let mut chain = Chain::default();
            for id in 0..32 {
                pool.append(&mut chain, id, 0.0, 0);
            }
            pool.release(&mut chain);
        })
    });
}

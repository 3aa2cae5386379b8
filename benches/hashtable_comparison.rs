use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use robin_dense::HashMap as RobinHashMap;
use robin_dense::HashTable as RobinHashTable;
use robin_dense::hash_table::Entry as RobinEntry;
use siphasher::sip::SipHasher;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone, Default)]
struct SipBuildHasher;

impl BuildHasher for SipBuildHasher {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new()
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_items<TestItem: KeyValuePair>(count: usize) -> Vec<(u64, TestItem)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let item = TestItem::new(rng.try_next_u64().unwrap());
            (item.hash_key(), item)
        })
        .collect()
}

fn fill_robin<TestItem: KeyValuePair>(items: &[(u64, TestItem)]) -> RobinHashTable<TestItem> {
    let mut table = RobinHashTable::with_capacity(0);
    for (hash, item) in items.iter().cloned() {
        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            RobinEntry::Vacant(entry) => {
                entry.insert(item);
            }
            RobinEntry::Occupied(_) => unreachable!(),
        }
    }
    table
}

fn fill_hashbrown<TestItem: KeyValuePair>(
    items: &[(u64, TestItem)],
) -> HashbrownHashTable<TestItem> {
    let mut table = HashbrownHashTable::with_capacity(0);
    for (hash, item) in items.iter().cloned() {
        match table.entry(hash, |v: &TestItem| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                entry.insert(item);
            }
            HashbrownEntry::Occupied(_) => unreachable!(),
        }
    }
    table
}

fn bench_insert_random<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut items = items.clone();
                    items.shuffle(&mut SmallRng::from_os_rng());
                    items
                },
                |items| black_box(fill_robin(&items)),
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut items = items.clone();
                    items.shuffle(&mut SmallRng::from_os_rng());
                    items
                },
                |items| black_box(fill_hashbrown(&items)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);
        let robin = fill_robin(&items);
        let hashbrown = fill_hashbrown(&items);

        let mut lookups = items.clone();
        lookups.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &lookups {
                    black_box(robin.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &lookups {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_find_miss<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_miss_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);
        let robin = fill_robin(&items);
        let hashbrown = fill_hashbrown(&items);
        let misses = random_items::<TestItem>(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &misses {
                    black_box(robin.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in &misses {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "remove_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);
        let robin = fill_robin(&items);
        let hashbrown = fill_hashbrown(&items);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter_batched(
                || robin.clone(),
                |mut table| {
                    for (hash, item) in &items {
                        black_box(table.remove(*hash, |v| v.eq_key(item), |v| v.hash_key()));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut table| {
                    for (hash, item) in &items {
                        if let Ok(entry) = table.find_entry(*hash, |v| v.eq_key(item)) {
                            black_box(entry.remove().0);
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "iteration_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let items = random_items::<TestItem>(*size);
        let robin = fill_robin(&items);
        let hashbrown = fill_hashbrown(&items);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter(|| {
                for item in robin.iter() {
                    black_box(item);
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for item in hashbrown.iter() {
                    black_box(item);
                }
            })
        });
    }

    group.finish();
}

/// Insert-or-remove churn over a Zipf-skewed key space twice the table size.
fn bench_churn_zipf<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "churn_zipf_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let key_space = random_items::<TestItem>(*size * 2);
        let distr = Zipf::new(key_space.len() as f64, 1.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let ops: Vec<usize> = (0..*size)
            .map(|_| rng.sample(distr) as usize - 1)
            .collect();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter(|| {
                let mut table = RobinHashTable::<TestItem>::with_capacity(0);
                for &op in &ops {
                    let (hash, item) = &key_space[op];
                    match table.entry(*hash, |v| v.eq_key(item), |v| v.hash_key()) {
                        RobinEntry::Vacant(entry) => {
                            black_box(entry.insert(item.clone()));
                        }
                        RobinEntry::Occupied(entry) => {
                            black_box(entry.remove(|v| v.hash_key()));
                        }
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut table = HashbrownHashTable::<TestItem>::with_capacity(0);
                for &op in &ops {
                    let (hash, item) = &key_space[op];
                    match table.entry(*hash, |v| v.eq_key(item), |v| v.hash_key()) {
                        HashbrownEntry::Vacant(entry) => {
                            black_box(entry.insert(item.clone()));
                        }
                        HashbrownEntry::Occupied(entry) => {
                            black_box(entry.remove().0);
                        }
                    }
                }
                black_box(table)
            })
        });
    }

    group.finish();
}

fn bench_map_string_keys<const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_string_keys");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys: Vec<String> = (0..*size).map(|i| format!("key_{i:08}")).collect();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("robin_dense/{size}"), |b| {
            b.iter(|| {
                let mut map = RobinHashMap::with_hasher(SipBuildHasher);
                for (i, key) in keys.iter().enumerate() {
                    map.insert_ref(key.as_str(), i);
                }
                for key in &keys {
                    black_box(map.get(key.as_str()));
                }
                black_box(map)
            })
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                let mut map = std::collections::HashMap::with_hasher(SipBuildHasher);
                for (i, key) in keys.iter().enumerate() {
                    map.entry(key.clone()).or_insert(i);
                }
                for key in &keys {
                    black_box(map.get(key.as_str()));
                }
                black_box(map)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 4>,
    bench_insert_random::<TestItem, 4>,
    bench_find_hit::<SmallTestItem, 4>,
    bench_find_hit::<TestItem, 4>,
    bench_find_miss::<SmallTestItem, 4>,
    bench_find_miss::<TestItem, 4>,
    bench_remove::<SmallTestItem, 4>,
    bench_remove::<TestItem, 4>,
    bench_iteration::<SmallTestItem, 4>,
    bench_iteration::<TestItem, 4>,
    bench_churn_zipf::<SmallTestItem, 4>,
    bench_churn_zipf::<TestItem, 4>,
    bench_map_string_keys::<3>,
);

criterion_main!(benches);

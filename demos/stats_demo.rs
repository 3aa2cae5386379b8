use std::hash::BuildHasher;

use clap::Parser;
use robin_dense::DefaultHashBuilder;
use robin_dense::HashMap;

#[derive(Parser, Debug)]
struct Args {
    /// Number of keys to insert
    #[arg(short = 'c', long = "count", default_value_t = 1000)]
    count: usize,

    /// Percentage of keys to erase after filling
    #[arg(short = 'e', long = "erase_percent", default_value_t = 50)]
    erase_percent: usize,

    /// Fill the table up to its load limit instead of exactly `count` keys
    #[arg(long = "fill")]
    fill: bool,
}

fn report(map: &HashMap<u64, u64>) {
    println!(
        "{} entries, capacity {}, {} buckets",
        map.len(),
        map.capacity(),
        map.bucket_count()
    );
    map.print_probe_histogram();
    map.debug_stats().print();
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashMap with capacity for {} keys using {}",
        args.count,
        std::any::type_name::<DefaultHashBuilder>()
    );
    let mut map: HashMap<u64, u64> = HashMap::with_capacity(args.count);
    let target = if args.fill {
        map.capacity()
    } else {
        args.count
    };

    for key in 0..target as u64 {
        let value = map.hasher().hash_one(key);
        map.insert(key, value);
    }
    report(&map);

    let erase = target * args.erase_percent.min(100) / 100;
    println!();
    println!("Erasing {erase} keys...");
    for key in 0..erase as u64 {
        map.remove(&key);
    }
    report(&map);
}

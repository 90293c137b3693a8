use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use prime_probe::HashTable;
use prime_probe::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    /// Remove every n-th value after filling, leaving tombstones behind.
    #[arg(short = 'r', long = "remove_every", default_value_t = 0)]
    remove_every: u64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> =
        HashTable::with_capacity_and_load_factor(args.target_capacity, args.load_factor);
    let initial_capacity = table.capacity();

    println!(
        "Actual capacity: {} (load factor {})",
        initial_capacity,
        table.load_factor()
    );
    println!("Filling table with u64 values...");

    // Fill right up to the growth threshold without crossing it.
    let num_values = (initial_capacity as f64 * f64::from(table.load_factor())).floor() as u64;
    for value in 0..num_values {
        match table.entry(hash_u64(value), |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    if args.remove_every > 0 {
        let mut removed = 0;
        for value in (0..num_values).step_by(args.remove_every as usize) {
            if table.remove(hash_u64(value), |&v| v == value).is_some() {
                removed += 1;
            }
        }
        println!("Removed {} values", removed);
    }

    println!("Table holds {} values", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );
    if table.capacity() != initial_capacity {
        println!(
            "Table grew from {} to {} slots",
            initial_capacity,
            table.capacity()
        );
    }

    table.probe_histogram().print();
    table.debug_stats().print();
}

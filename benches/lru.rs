use criterion::{criterion_group, criterion_main, Criterion};
use dump_index::{IntegerLruCache,LruCache,TableOptions};
use dump_index::values::IntValues;
use rand::{Rng,SeedableRng};
use rand::rngs::StdRng;

criterion_group!{
    name = benches;
    config = Criterion::default();
    targets = criterion_benchmark
}

fn criterion_benchmark(crit: &mut Criterion) {
    for max_size in [1000usize, 100000] {
        let mut seed = [0u8;32];
        seed[0..8].copy_from_slice(&(max_size as u64).to_le_bytes());
        let mut rng : StdRng = SeedableRng::from_seed(seed);
        /* Twice as many keys as fit, so about half of the lookups miss */
        let keys : Vec<u64> = (0..max_size*2).map(|_| rng.gen::<u64>()).collect();
        let options = TableOptions { key_gen: Some(seed[..16].try_into().unwrap()), ..TableOptions::default() };

        let mut cache = LruCache::<IntValues>::with_options(max_size, &options).unwrap();
        let mut qi = 0;
        crit.bench_function(&format!("lru get-or-put {}",max_size),
            |crit| crit.iter(|| {
                let key = keys[qi];
                if cache.get(key).is_none() { cache.put(key, qi as i32); }
                qi = (qi + rng.gen_range(1..16)) % keys.len();
            }));

        let locked = IntegerLruCache::with_options(max_size, &options).unwrap();
        crit.bench_function(&format!("lru locked get-or-put {}",max_size),
            |crit| crit.iter(|| {
                let key = keys[qi];
                if locked.get(key).is_none() { locked.put(key, qi as i32); }
                qi = (qi + 7) % keys.len();
            }));
    }
}

criterion_main!(benches);

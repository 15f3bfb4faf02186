use criterion::{criterion_group, criterion_main, Criterion};
use dump_index::BitSetArray;
use rand::{Rng,SeedableRng};
use rand::rngs::StdRng;

criterion_group!{
    name = benches;
    config = Criterion::default();
    targets = criterion_benchmark
}

fn criterion_benchmark(crit: &mut Criterion) {
    let slots = 10000;
    for members in [1usize, 3, 16, 200] {
        let mut rng : StdRng = SeedableRng::from_seed([members as u8; 32]);
        let bits : Vec<(usize,u32)> = (0..slots*members)
            .map(|_| (rng.gen_range(0..slots), rng.gen_range(0..4096)))
            .collect();

        let mut sets = BitSetArray::new();
        crit.bench_function(&format!("bitset_array set {}/slot",members),
            |crit| crit.iter(|| {
                sets = BitSetArray::new();
                for &(slot,bit) in &bits { sets.set(slot, bit); }
            }));
        println!("{} members/slot: {} bytes", members, sets.memory_usage());

        let mut qi = 0;
        crit.bench_function(&format!("bitset_array or {}/slot",members),
            |crit| crit.iter(|| {
                let mut copy = sets.clone();
                copy.or(qi, (qi + 1) % slots);
                qi = (qi + 2) % slots;
            }));
    }
}

criterion_main!(benches);

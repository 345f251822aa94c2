use conmap::config::{ActorMapConfig, ChainMapConfig, MapConfig, ShardedMapConfig};
use conmap::{
    ActorMap, CopyOnWriteShardedMap, GlobalLockMap, IntMap, LockFreeChainMap,
    NativeConcurrentMap, ShardedLockMap, UnsharedMap,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const KEY_MASK: u64 = (1 << 16) - 1;

/// Marsaglia xorshift, masked to 31 bits.
#[inline]
fn next(r: &mut u64) -> u64 {
    *r ^= *r << 13;
    *r ^= *r >> 17;
    *r ^= *r << 5;
    *r & 0x7fff_ffff
}

fn populated<M: IntMap>(mut map: M) -> M {
    for i in 0..=KEY_MASK {
        map.put(i, i);
    }
    map
}

fn bench_map<M: IntMap>(c: &mut Criterion, label: &str, mut map: M) {
    let mut group = c.benchmark_group("Map Operations");
    let mut r = 0x2545_f491u64;

    group.bench_function(format!("{label} get"), |b| {
        b.iter(|| black_box(map.get(next(&mut r) & KEY_MASK)));
    });

    group.bench_function(format!("{label} put"), |b| {
        b.iter(|| {
            let v = next(&mut r);
            map.put(black_box(v & KEY_MASK), v);
        });
    });

    group.bench_function(format!("{label} putget"), |b| {
        b.iter(|| {
            let v = next(&mut r);
            map.put(v & KEY_MASK, v);
            black_box(map.get(next(&mut r) & KEY_MASK))
        });
    });

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let base = MapConfig::with_capacity(KEY_MASK as usize + 1);
    // Many small shards keep copy-on-write puts from dominating the run.
    let cow_config = ShardedMapConfig {
        base,
        shards: 1024,
    };

    bench_map(c, "unshared", populated(UnsharedMap::init(base)));
    bench_map(c, "lock", populated(GlobalLockMap::init(base)));
    bench_map(
        c,
        "shard",
        populated(ShardedLockMap::init(ShardedMapConfig {
            base,
            ..ShardedMapConfig::default()
        })),
    );
    bench_map(c, "cow", {
        let map = CopyOnWriteShardedMap::init(cow_config);
        map.put_all((0..=KEY_MASK).map(|i| (i, i)));
        map
    });
    bench_map(c, "native", populated(NativeConcurrentMap::init(base)));
    bench_map(
        c,
        "actor",
        populated(ActorMap::init(ActorMapConfig {
            base,
            ..ActorMapConfig::default()
        })),
    );
    bench_map(c, "chain", populated(LockFreeChainMap::init(ChainMapConfig::new(1 << 16))));
    bench_map(
        c,
        "chain-collide",
        populated(LockFreeChainMap::init(ChainMapConfig::new(1 << 14))),
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

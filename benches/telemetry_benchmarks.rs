use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::prelude::*;
use rand_pcg::Pcg64;
use tilt_telemetry::wire::LineFramer;
use tilt_telemetry::{
    RawAxisSample, RawRegisterBlock, WireMode, decode_block, encode_block, parse_line,
};

// Pre-generated register blocks so the RNG stays out of the timed loops
struct PreGeneratedBlocks {
    blocks: Vec<RawRegisterBlock>,
    index: usize,
}

impl PreGeneratedBlocks {
    fn new(count: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let blocks = (0..count)
            .map(|_| {
                let sample = RawAxisSample::new(
                    rng.random_range(-300..300),
                    rng.random_range(-300..300),
                    1024 + rng.random_range(-40..40),
                );
                let mut bytes = *RawRegisterBlock::pack(sample).bytes();
                // Fill the unused low nibbles the way a live sensor does
                for byte in bytes.iter_mut().step_by(2) {
                    *byte |= rng.random_range(0..16u8);
                }
                RawRegisterBlock::new(bytes)
            })
            .collect();

        Self { blocks, index: 0 }
    }

    fn next(&mut self) -> RawRegisterBlock {
        let block = self.blocks[self.index];
        self.index = (self.index + 1) % self.blocks.len();
        block
    }
}

fn bench_decode_block(c: &mut Criterion) {
    let mut data = PreGeneratedBlocks::new(1000, 42);

    c.bench_function("decode_block", |b| {
        b.iter(|| decode_block(black_box(&data.next())))
    });
}

fn bench_encode_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_block");
    let mut data = PreGeneratedBlocks::new(1000, 7);

    for mode in [WireMode::Raw, WireMode::Derived] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| encode_block(black_box(&data.next()), black_box(mode)))
        });
    }
    group.finish();
}

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");
    group.bench_function("raw", |b| {
        b.iter(|| parse_line(black_box("-147,88,1031"), WireMode::Raw))
    });
    group.bench_function("derived", |b| {
        b.iter(|| parse_line(black_box("-12.35,7.89"), WireMode::Derived))
    });
    group.finish();
}

/// A burst of derived lines split at arbitrary points, as a socket would deliver it
fn bench_framer_throughput(c: &mut Criterion) {
    let mut data = PreGeneratedBlocks::new(500, 3);
    let mut stream = Vec::new();
    for _ in 0..500 {
        if let Ok(line) = encode_block(&data.next(), WireMode::Derived) {
            stream.extend_from_slice(line.as_bytes());
        }
    }

    let mut rng = Pcg64::seed_from_u64(11);
    let mut chunks = Vec::new();
    let mut rest = stream.as_slice();
    while !rest.is_empty() {
        let n = rng.random_range(1..=64).min(rest.len());
        let (chunk, tail) = rest.split_at(n);
        chunks.push(chunk.to_vec());
        rest = tail;
    }

    let mut group = c.benchmark_group("line_framer");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("split_reads", |b| {
        b.iter(|| {
            let mut framer = LineFramer::new();
            let mut lines = 0;
            for chunk in &chunks {
                framer.push(chunk);
                while let Some(line) = framer.next_line() {
                    if line.is_ok() {
                        lines += 1;
                    }
                }
            }
            black_box(lines)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_decode_block,
    bench_encode_block,
    bench_parse_line,
    bench_framer_throughput
);

criterion_main!(benches);

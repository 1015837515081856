use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use wc3_mdx::{MdxFile, MdxModel, ModelInstance};

fn put(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
}

fn chunk(out: &mut Vec<u8>, tag: &[u8; 4], body: &[u8]) {
    put(out, tag);
    put(out, &(body.len() as u32).to_le_bytes());
    put(out, body);
}

/// A helper node with a looping translation track of `keys` keyframes
fn animated_helper(object_id: u32, parent: i32, keys: u32) -> Vec<u8> {
    let mut track = b"KGTR".to_vec();
    put(&mut track, &keys.to_le_bytes());
    put(&mut track, &1u32.to_le_bytes());
    put(&mut track, &(-1i32).to_le_bytes());
    for k in 0..keys {
        put(&mut track, &((k * 33) as i32).to_le_bytes());
        for v in [k as f32, 0.0, 1.0] {
            put(&mut track, &v.to_le_bytes());
        }
    }

    let mut node = Vec::new();
    put(&mut node, &((96 + track.len()) as u32).to_le_bytes());
    let mut name = format!("Helper{object_id}").into_bytes();
    name.resize(80, 0);
    put(&mut node, &name);
    put(&mut node, &object_id.to_le_bytes());
    put(&mut node, &parent.to_le_bytes());
    put(&mut node, &0u32.to_le_bytes());
    put(&mut node, &track);
    node
}

fn create_test_file() -> Vec<u8> {
    let mut data = b"MDLX".to_vec();
    chunk(&mut data, b"VERS", &800u32.to_le_bytes());

    let mut seq = b"Stand".to_vec();
    seq.resize(80, 0);
    for v in [0u32, 3300] {
        put(&mut seq, &v.to_le_bytes());
    }
    seq.resize(132, 0);
    chunk(&mut data, b"SEQS", &seq);

    // A chain of 64 helpers
    let helpers: Vec<u8> = (0..64)
        .flat_map(|i| animated_helper(i, i as i32 - 1, 100))
        .collect();
    chunk(&mut data, b"HELP", &helpers);
    data
}

fn bench_parse(c: &mut Criterion) {
    let data = create_test_file();

    c.bench_function("parse_file", |b| {
        b.iter(|| MdxFile::parse(black_box(&data)).unwrap())
    });
}

fn bench_skeleton_update(c: &mut Criterion) {
    let model = Arc::new(MdxModel::from_bytes(&create_test_file()).unwrap());
    let mut instance = ModelInstance::new(model);
    instance.set_sequence(0).unwrap();

    c.bench_function("skeleton_update", |b| {
        b.iter(|| instance.update(black_box(1.0 / 60.0), None))
    });
}

criterion_group!(benches, bench_parse, bench_skeleton_update);
criterion_main!(benches);

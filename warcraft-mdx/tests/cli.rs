//! CLI integration tests
//!
//! Each test writes a small synthetic model to a temporary directory and
//! runs the binary against it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_string(out: &mut Vec<u8>, s: &str, len: usize) {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(len, 0);
    out.extend_from_slice(&bytes);
}

fn chunk(out: &mut Vec<u8>, tag: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(tag);
    put_u32(out, body.len() as u32);
    out.extend_from_slice(body);
}

fn node(name: &str, object_id: u32, parent: i32, flags: u32, tracks: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, (96 + tracks.len()) as u32);
    put_string(&mut out, name, 80);
    put_u32(&mut out, object_id);
    out.extend_from_slice(&parent.to_le_bytes());
    put_u32(&mut out, flags);
    out.extend_from_slice(tracks);
    out
}

/// A bone sliding along X over "Stand", a helper below it, a texture and
/// one chunk the parser does not know
fn footman() -> Vec<u8> {
    let mut data = b"MDLX".to_vec();
    chunk(&mut data, b"VERS", &800u32.to_le_bytes());

    let mut info = Vec::new();
    put_string(&mut info, "Footman", 80);
    put_string(&mut info, "", 260);
    put_f32s(&mut info, &[0.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);
    put_u32(&mut info, 150);
    chunk(&mut data, b"MODL", &info);

    let mut seq = Vec::new();
    put_string(&mut seq, "Stand", 80);
    put_u32(&mut seq, 0);
    put_u32(&mut seq, 1000);
    put_f32s(&mut seq, &[0.0]);
    put_u32(&mut seq, 0);
    put_f32s(&mut seq, &[0.0]);
    put_u32(&mut seq, 0);
    put_f32s(&mut seq, &[0.0; 7]);
    chunk(&mut data, b"SEQS", &seq);

    let mut tex = Vec::new();
    put_u32(&mut tex, 0);
    put_string(&mut tex, "Textures\\Footman.blp", 260);
    put_u32(&mut tex, 0);
    chunk(&mut data, b"TEXS", &tex);

    let mut track = b"KGTR".to_vec();
    put_u32(&mut track, 2);
    put_u32(&mut track, 1);
    track.extend_from_slice(&(-1i32).to_le_bytes());
    put_u32(&mut track, 0);
    put_f32s(&mut track, &[0.0, 0.0, 0.0]);
    put_u32(&mut track, 1000);
    put_f32s(&mut track, &[10.0, 0.0, 0.0]);

    let mut bone = node("Root", 0, -1, 0x100, &track);
    bone.extend_from_slice(&(-1i32).to_le_bytes());
    bone.extend_from_slice(&(-1i32).to_le_bytes());
    chunk(&mut data, b"BONE", &bone);
    chunk(&mut data, b"HELP", &node("Weapon", 1, 0, 0, &[]));

    let mut pivots = Vec::new();
    put_f32s(&mut pivots, &[0.0; 6]);
    chunk(&mut data, b"PIVT", &pivots);
    chunk(&mut data, b"FAFX", &[0; 12]);
    data
}

fn write_model(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn cli() -> Command {
    Command::cargo_bin("warcraft-mdx").unwrap()
}

#[test]
fn test_info_lists_sequences_and_textures() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "footman.mdx", &footman());

    cli()
        .arg("info")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Footman"))
        .stdout(predicate::str::contains("Version:    800"))
        .stdout(predicate::str::contains("Stand"))
        .stdout(predicate::str::contains("0-1000"))
        .stdout(predicate::str::contains("Textures/Footman.blp"));
}

#[test]
fn test_info_detailed_lists_nodes() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "footman.mdx", &footman());

    cli()
        .args(["info", "--detailed"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Detailed Information"))
        .stdout(predicate::str::contains("Weapon"))
        .stdout(predicate::str::contains("BONE"));
}

#[test]
fn test_tree_shows_chunks_and_hierarchy() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "footman.mdx", &footman());

    cli()
        .args(["tree", "--no-color"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("footman.mdx"))
        .stdout(predicate::str::contains("FAFX"))
        .stdout(predicate::str::contains("skipped"))
        .stdout(predicate::str::contains("🦴 Root"))
        .stdout(predicate::str::contains("➕ Weapon"))
        .stdout(predicate::str::contains("Footman.blp"));
}

#[test]
fn test_sample_evaluates_world_locations() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "footman.mdx", &footman());

    cli()
        .args(["sample", "--sequence", "stand", "--frame", "500"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sequence 0 (Stand), frame 500"))
        .stdout(predicate::str::contains("(5.00, 0.00, 0.00)"));
}

#[test]
fn test_sample_clamps_frame() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "footman.mdx", &footman());

    cli()
        .args(["sample", "-s", "0", "-f", "5000"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("frame 1000"))
        .stdout(predicate::str::contains("(10.00, 0.00, 0.00)"));
}

#[test]
fn test_sample_unknown_sequence_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "footman.mdx", &footman());

    cli()
        .args(["sample", "--sequence", "Spell"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No sequence named 'Spell'"));
}

#[test]
fn test_invalid_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_model(&dir, "broken.mdx", b"MDLYjunk");

    cli()
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse MDX model"));
}

#[test]
fn test_missing_file_fails() {
    cli()
        .args(["tree", "does/not/exist.mdx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

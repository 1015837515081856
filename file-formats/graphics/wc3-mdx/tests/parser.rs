mod common;

use common::*;
use pretty_assertions::assert_eq;
use wc3_mdx::chunks::NodeFlags;
use wc3_mdx::{ChunkId, MdxError, MdxFile, MdxModel, MdxParser};

fn skinned_triangle() -> Vec<u8> {
    MdxBuilder::new()
        .chunk(b"VERS", &version(800))
        .chunk(b"MODL", &model_info("Triangle"))
        .chunk(b"SEQS", &sequence("Stand", 0, 1000, 0))
        .chunk(b"TEXS", &texture(0, "Textures\\Rock.blp"))
        .chunk(b"MTLS", &material(&[layer(0, 0, 1.0, &[])]))
        .chunk(b"GEOS", &triangle_geoset(0, 0, [0.0; 3]))
        .chunk(b"BONE", &bone(node("Root", 0, -1, BONE_FLAG, &[])))
        .chunk(b"PIVT", &pivots(&[[0.0; 3]]))
        .build()
}

#[test]
fn test_parse_minimal_model() {
    let file = MdxFile::parse(&skinned_triangle()).unwrap();

    assert_eq!(file.version(), Some(800));
    assert_eq!(file.model_info().map(|m| m.name.as_str()), Some("Triangle"));
    assert_eq!(file.sequences().len(), 1);
    assert_eq!(file.sequences()[0].name, "Stand");
    assert_eq!(file.textures()[0].resolved_path(), "Textures/Rock.blp");
    assert_eq!(file.geosets()[0].vertex_count(), 3);
    assert_eq!(file.bones().len(), 1);
    assert_eq!(file.nodes().len(), 1);
    assert!(file.nodes().as_slice()[0].flags.contains(NodeFlags::BONE));
}

#[test]
fn test_bad_magic_yields_no_model() {
    let mut data = skinned_triangle();
    data[..4].copy_from_slice(b"MDLY");
    match MdxModel::from_bytes(&data) {
        Err(MdxError::InvalidMagic { actual, .. }) => assert_eq!(actual, "MDLY"),
        other => panic!("expected InvalidMagic, got {other:?}"),
    }
}

#[test]
fn test_unknown_chunk_is_skipped() {
    let _ = env_logger::builder().is_test(true).try_init();

    let data = MdxBuilder::new()
        .chunk(b"VERS", &version(800))
        .chunk(b"FAFX", &[0xAB; 37])
        .chunk(b"HELP", &helper(node("Helper", 0, -1, HELPER_FLAG, &[])))
        .build();

    let file = MdxFile::parse(&data).unwrap();
    assert_eq!(file.version(), Some(800));
    assert_eq!(file.helpers().len(), 1);
    assert!(file.chunk(ChunkId::new(*b"FAFX")).is_none());
    // The skipped chunk still shows up in the header list
    assert_eq!(file.headers().len(), 3);
}

#[test]
fn test_node_registry_follows_encounter_order() {
    let data = MdxBuilder::new()
        .chunk(
            b"BONE",
            &[
                bone(node("B0", 0, -1, BONE_FLAG, &[])),
                bone(node("B1", 1, 0, BONE_FLAG, &[])),
            ]
            .concat(),
        )
        .chunk(b"HELP", &helper(node("H2", 2, 1, HELPER_FLAG, &[])))
        .build();

    let file = MdxFile::parse(&data).unwrap();
    let names: Vec<&str> = file.nodes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["B0", "B1", "H2"]);
    assert_eq!(file.helpers()[0].node, 2);
    assert_eq!(file.bones()[1].node, 1);
}

#[test]
fn test_truncated_bone_chunk_fails() {
    let record = bone(node("Root", 0, -1, BONE_FLAG, &[]));
    let short = &record[..record.len() - 1];
    let data = MdxBuilder::new().chunk(b"BONE", short).build();

    let err = MdxFile::parse(&data).unwrap_err();
    assert!(
        matches!(
            err,
            MdxError::UnexpectedEof { .. } | MdxError::ChunkSizeMismatch { .. }
        ),
        "unexpected error {err:?}"
    );
}

#[test]
fn test_record_reporting_extra_bytes_is_skipped() {
    let _ = env_logger::builder().is_test(true).try_init();

    // A material that declares four bytes beyond its last layer
    let mut mtl = material(&[layer(0, 0, 1.0, &[])]);
    let size = u32::from_le_bytes([mtl[0], mtl[1], mtl[2], mtl[3]]) + 4;
    mtl[..4].copy_from_slice(&size.to_le_bytes());
    mtl.extend_from_slice(&[0xEE; 4]);
    let data = MdxBuilder::new()
        .chunk(b"MTLS", &[mtl, material(&[layer(3, 0, 1.0, &[])])].concat())
        .build();

    let file = MdxFile::parse(&data).unwrap();
    assert_eq!(file.materials().len(), 2);
    assert_eq!(file.materials()[1].layers[0].render_order(), 3);
}

#[test]
fn test_inner_tag_mismatch() {
    let mut mtl = material(&[layer(0, 0, 1.0, &[])]);
    mtl[12..16].copy_from_slice(b"LAYZ");
    let data = MdxBuilder::new().chunk(b"MTLS", &mtl).build();

    match MdxFile::parse(&data) {
        Err(MdxError::UnexpectedTag {
            expected, found, ..
        }) => {
            assert_eq!(expected, ChunkId::LAYS);
            assert_eq!(found, ChunkId::new(*b"LAYZ"));
        }
        other => panic!("expected UnexpectedTag, got {other:?}"),
    }
}

#[test]
fn test_unknown_track_tag_fails() {
    let tracks = track_f32(b"KXYZ", -1, &[(0, 1.0)]);
    let data = MdxBuilder::new()
        .chunk(b"HELP", &helper(node("Helper", 0, -1, 0, &tracks)))
        .build();
    assert!(matches!(
        MdxFile::parse(&data),
        Err(MdxError::UnknownTrackTag { .. })
    ));
}

#[test]
fn test_repeated_chunk_replaces_earlier() {
    let data = MdxBuilder::new()
        .chunk(b"SEQS", &sequence("First", 0, 100, 0))
        .chunk(
            b"SEQS",
            &[sequence("A", 0, 10, 0), sequence("B", 10, 20, 0)].concat(),
        )
        .build();
    let file = MdxFile::parse(&data).unwrap();
    let names: Vec<&str> = file.sequences().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_chunk_headers_listing() {
    let headers = MdxParser::new()
        .read_chunk_headers(&skinned_triangle())
        .unwrap();
    let tags: Vec<String> = headers.iter().map(|h| h.id.to_string()).collect();
    assert_eq!(
        tags,
        vec!["VERS", "MODL", "SEQS", "TEXS", "MTLS", "GEOS", "BONE", "PIVT"]
    );
    assert_eq!(headers[0].offset, 12);
    assert_eq!(headers[0].size, 4);
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triangle.mdx");
    std::fs::write(&path, skinned_triangle()).unwrap();

    let model = MdxModel::from_path(&path).unwrap();
    assert_eq!(model.name(), "Triangle");
    assert!(matches!(
        MdxModel::from_path(dir.path().join("missing.mdx")),
        Err(MdxError::Io(_))
    ));
}

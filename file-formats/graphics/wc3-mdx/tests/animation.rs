mod common;

use std::f32::consts::FRAC_1_SQRT_2;

use common::*;
use glam::{Mat4, Quat, Vec3};
use wc3_mdx::{MdxModel, Skeleton};

const BILLBOARDED: u32 = 0x8;

fn assert_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

/// Root bone sliding along X over frames 0..100 with a child helper above it
fn chain(child_flags: u32) -> MdxModel {
    let slide = track_vec3(b"KGTR", -1, &[(0, [0.0; 3]), (100, [10.0, 0.0, 0.0])]);
    let data = MdxBuilder::new()
        .chunk(b"SEQS", &sequence("Slide", 0, 100, 0))
        .chunk(b"BONE", &bone(node("Root", 0, -1, BONE_FLAG, &slide)))
        .chunk(b"HELP", &helper(node("Child", 1, 0, child_flags, &[])))
        .chunk(b"PIVT", &pivots(&[[0.0; 3], [0.0, 0.0, 5.0]]))
        .build();
    MdxModel::from_bytes(&data).unwrap()
}

fn evaluate(model: &MdxModel, frame: i64, counter: u32) -> Skeleton {
    let mut skeleton = Skeleton::new(model);
    let time = model.sample_time(Some(0), frame, counter);
    skeleton.update(model, &time, None);
    skeleton
}

#[test]
fn test_parent_translation_propagates() {
    let model = chain(0);
    let skeleton = evaluate(&model, 50, 0);

    assert_near(skeleton.nodes()[0].world_location, Vec3::new(5.0, 0.0, 0.0));
    assert_near(skeleton.nodes()[1].world_location, Vec3::new(5.0, 0.0, 5.0));
    assert_eq!(skeleton.nodes()[1].parent, Some(0));
}

#[test]
fn test_frame_is_clamped_to_sequence() {
    let model = chain(0);
    let skeleton = evaluate(&model, 5000, 0);
    assert_near(skeleton.nodes()[0].world_location, Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn test_dont_inherit_translation() {
    let model = chain(DONT_INHERIT_TRANSLATION);
    let skeleton = evaluate(&model, 50, 0);

    assert_near(skeleton.nodes()[0].world_location, Vec3::new(5.0, 0.0, 0.0));
    assert_near(skeleton.nodes()[1].world_location, Vec3::new(0.0, 0.0, 5.0));
}

#[test]
fn test_parent_rotation_about_pivot() {
    let turn = track_vec4(
        b"KGRT",
        -1,
        &[
            (0, [0.0, 0.0, 0.0, 1.0]),
            (100, [0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2]),
        ],
    );
    let data = MdxBuilder::new()
        .chunk(b"SEQS", &sequence("Turn", 0, 100, 0))
        .chunk(b"BONE", &bone(node("Root", 0, -1, BONE_FLAG, &turn)))
        .chunk(b"HELP", &helper(node("Arm", 1, 0, 0, &[])))
        .chunk(b"PIVT", &pivots(&[[0.0; 3], [1.0, 0.0, 0.0]]))
        .build();
    let model = MdxModel::from_bytes(&data).unwrap();
    let skeleton = evaluate(&model, 100, 0);

    assert_near(skeleton.nodes()[1].world_location, Vec3::new(0.0, 1.0, 0.0));
    let rotated = skeleton.nodes()[1].world_rotation * Vec3::X;
    assert_near(rotated, Vec3::Y);
}

#[test]
fn test_scale_and_inverse_scale() {
    let grow = track_vec3(b"KGSC", -1, &[(0, [2.0, 2.0, 2.0])]);
    let data = MdxBuilder::new()
        .chunk(b"BONE", &bone(node("Root", 0, -1, BONE_FLAG, &grow)))
        .chunk(b"HELP", &helper(node("Child", 1, 0, 0, &[])))
        .build();
    let model = MdxModel::from_bytes(&data).unwrap();
    let mut skeleton = Skeleton::new(&model);
    skeleton.update(&model, &model.sample_time(None, 0, 0), None);

    assert_near(skeleton.nodes()[1].scale, Vec3::splat(2.0));
    assert_near(skeleton.nodes()[1].inverse_scale, Vec3::splat(0.5));
}

#[test]
fn test_global_sequence_ignores_frame() {
    let drift = track_vec3(b"KGTR", 0, &[(0, [0.0; 3]), (100, [100.0, 0.0, 0.0])]);
    let data = MdxBuilder::new()
        .chunk(b"SEQS", &sequence("Stand", 0, 1000, 0))
        .chunk(b"GLBS", &global_sequences(&[100]))
        .chunk(b"HELP", &helper(node("Drift", 0, -1, 0, &drift)))
        .build();
    let model = MdxModel::from_bytes(&data).unwrap();

    for frame in [0, 400, 1000] {
        let skeleton = evaluate(&model, frame, 150);
        assert_near(
            skeleton.nodes()[0].world_location,
            Vec3::new(50.0, 0.0, 0.0),
        );
    }
}

#[test]
fn test_bone_matrix_palette() {
    let model = chain(0);
    let skeleton = evaluate(&model, 50, 0);
    let palette = skeleton.bone_matrices();

    assert_eq!(palette.len(), 3);
    assert_eq!(palette[0], Mat4::IDENTITY);
    assert_near(palette[1].w_axis.truncate(), Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(palette[2], skeleton.nodes()[1].world_matrix);
}

#[test]
fn test_model_without_nodes_gets_root() {
    let data = MdxBuilder::new().chunk(b"VERS", &version(800)).build();
    let model = MdxModel::from_bytes(&data).unwrap();
    assert_eq!(model.nodes().len(), 1);
    assert_eq!(model.bones().len(), 1);

    let skeleton = evaluate(&model, 0, 0);
    assert_eq!(skeleton.nodes().len(), 1);
    assert_eq!(skeleton.bone_matrices(), vec![Mat4::IDENTITY; 2]);
}

#[test]
fn test_parent_cycle_is_broken() {
    let data = MdxBuilder::new()
        .chunk(
            b"HELP",
            &[
                helper(node("A", 0, 1, 0, &[])),
                helper(node("B", 1, 0, 0, &[])),
                helper(node("C", 2, 7, 0, &[])),
            ]
            .concat(),
        )
        .build();
    let model = MdxModel::from_bytes(&data).unwrap();
    let skeleton = evaluate(&model, 0, 0);

    let roots = skeleton.nodes().iter().filter(|n| n.parent.is_none()).count();
    // One of A/B is demoted, C has a missing parent
    assert_eq!(roots, 2);
    assert_eq!(skeleton.update_order().len(), 3);
}

#[test]
fn test_billboard_faces_camera() {
    let data = MdxBuilder::new()
        .chunk(b"HELP", &helper(node("Sprite", 0, -1, BILLBOARDED, &[])))
        .build();
    let model = MdxModel::from_bytes(&data).unwrap();
    let camera = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.4);

    let mut skeleton = Skeleton::new(&model);
    let time = model.sample_time(None, 0, 0);
    skeleton.update(&model, &time, Some(camera));
    let facing = skeleton.nodes()[0].world_rotation * Vec3::X;
    assert_near(facing, camera * Vec3::Z);

    skeleton.update(&model, &time, None);
    assert_eq!(skeleton.nodes()[0].world_rotation, Quat::IDENTITY);
}

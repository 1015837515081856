//! Chunk layout and node hierarchy as a tree

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use wc3_mdx::chunks::{Node, NodeFlags};
use wc3_mdx::parser::ChunkKind;
use wc3_mdx::{ChunkId, MdxFile};

use crate::utils::tree::{NodeType, TreeNode, TreeOptions, render_tree};

pub fn execute(file: &Path, depth: Option<usize>, no_color: bool, compact: bool) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mdx = MdxFile::parse(&data)
        .with_context(|| format!("Failed to parse MDX model: {}", file.display()))?;

    let name = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
    let root = TreeNode::new(name, NodeType::Root)
        .with_size(data.len() as u64)
        .add_child(chunk_tree(&mdx))
        .add_child(node_tree(mdx.nodes().as_slice()));

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        compact,
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn chunk_tree(mdx: &MdxFile) -> TreeNode {
    let mut group = TreeNode::new("Chunks", NodeType::Group).with_metadata("count", mdx.headers().len());

    for header in mdx.headers() {
        let label = header.id.to_string();
        let node = match ChunkKind::from_id(header.id) {
            Some(kind) => {
                let mut node = TreeNode::new(label, NodeType::Chunk)
                    .with_size(header.size as u64)
                    .with_metadata("kind", kind.name())
                    .with_metadata("offset", format!("{:#x}", header.offset));
                if let Some(chunk) = mdx.chunk(header.id) {
                    node = node.with_metadata("records", chunk.len());
                }
                if header.id == ChunkId::TEXS {
                    for texture in mdx.textures() {
                        node = node.with_external_ref(&texture.resolved_path());
                    }
                }
                node
            }
            None => TreeNode::new(label, NodeType::Unknown)
                .with_size(header.size as u64)
                .with_metadata("offset", format!("{:#x}", header.offset))
                .with_metadata("status", "skipped"),
        };
        group = group.add_child(node);
    }
    group
}

fn node_type(flags: NodeFlags) -> NodeType {
    if flags.contains(NodeFlags::BONE) {
        NodeType::Bone
    } else if flags.intersects(NodeFlags::PARTICLE_EMITTER | NodeFlags::RIBBON_EMITTER) {
        NodeType::Emitter
    } else if flags.intersects(
        NodeFlags::LIGHT
            | NodeFlags::EVENT_OBJECT
            | NodeFlags::ATTACHMENT
            | NodeFlags::COLLISION_SHAPE,
    ) {
        NodeType::Object
    } else {
        NodeType::Helper
    }
}

/// Nest nodes under their parents; orphans and cycle members become roots
fn node_tree(nodes: &[Node]) -> TreeNode {
    let by_id: HashMap<u32, usize> = nodes
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (node.object_id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match node.parent_id.and_then(|id| by_id.get(&id)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut visited = vec![false; nodes.len()];
    let mut group = TreeNode::new("Nodes", NodeType::Group).with_metadata("count", nodes.len());
    for &root in &roots {
        group = group.add_child(build_node(root, nodes, &children, &mut visited));
    }
    // Cycles are unreachable from any root
    for i in 0..nodes.len() {
        if !visited[i] {
            group = group.add_child(build_node(i, nodes, &children, &mut visited));
        }
    }
    group
}

fn build_node(
    index: usize,
    nodes: &[Node],
    children: &[Vec<usize>],
    visited: &mut [bool],
) -> TreeNode {
    visited[index] = true;
    let node = &nodes[index];
    let mut tree = TreeNode::new(node.name.clone(), node_type(node.flags))
        .with_metadata("id", node.object_id);
    if !node.tracks.is_empty() {
        tree = tree.with_metadata("tracks", node.tracks.len());
    }
    for &child in &children[index] {
        if !visited[child] {
            tree = tree.add_child(build_node(child, nodes, children, visited));
        }
    }
    tree
}

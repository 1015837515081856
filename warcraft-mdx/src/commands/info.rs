//! Model summary output

use anyhow::{Context, Result};
use std::path::Path;
use wc3_mdx::MdxModel;

use crate::utils::{
    add_table_row, create_table, format_bytes, format_interval, format_node_flags, format_vec3,
};

pub fn execute(file: &Path, detailed: bool) -> Result<()> {
    println!("Loading MDX model: {}", file.display());

    let size = std::fs::metadata(file)
        .with_context(|| format!("Failed to read {}", file.display()))?
        .len();
    let model = MdxModel::from_path(file)
        .with_context(|| format!("Failed to parse MDX model: {}", file.display()))?;
    log::info!("Parsed {} chunks", model.file().headers().len());

    println!("\n=== MDX Model Information ===");
    println!("Name:       {}", display_name(model.name()));
    println!("File size:  {}", format_bytes(size));
    match model.file().version() {
        Some(version) => println!("Version:    {version}"),
        None => println!("Version:    (none)"),
    }

    let extent = model.extent();
    println!(
        "Extent:     {} to {} (radius {:.2})",
        format_vec3(extent.min.to_array()),
        format_vec3(extent.max.to_array()),
        extent.radius
    );
    println!("Nodes:      {}", model.nodes().len());
    println!("Geosets:    {}", model.meshes().len());
    println!("Materials:  {}", model.materials().len());
    println!("Batches:    {}", model.batches().len());
    println!(
        "Emitters:   {} particle, {} particle2, {} ribbon",
        model.particle_emitters().len(),
        model.particle_emitters2().len(),
        model.ribbon_emitters().len()
    );

    if !model.sequences().is_empty() {
        println!("\nSequences:");
        let mut table = create_table(&["#", "Name", "Interval", "Duration", "Looping"]);
        for (i, sequence) in model.sequences().iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    i.to_string(),
                    sequence.name.clone(),
                    format_interval(sequence.start(), sequence.end()),
                    format!("{} ms", sequence.duration()),
                    if sequence.is_looping() { "yes" } else { "no" }.to_string(),
                ],
            );
        }
        table.printstd();
    }

    if !model.global_sequences().is_empty() {
        let durations: Vec<String> = model
            .global_sequences()
            .iter()
            .map(|d| format!("{d} ms"))
            .collect();
        println!("\nGlobal sequences: {}", durations.join(", "));
    }

    if !model.texture_paths().is_empty() {
        println!("\nTextures:");
        let mut table = create_table(&["#", "Path"]);
        for (i, path) in model.texture_paths().iter().enumerate() {
            add_table_row(&mut table, vec![i.to_string(), display_name(path).to_string()]);
        }
        table.printstd();
    }

    if detailed {
        println!("\n=== Detailed Information ===");
        println!("\nNodes:");
        let mut table = create_table(&["Name", "Id", "Parent", "Flags"]);
        for node in model.nodes() {
            add_table_row(
                &mut table,
                vec![
                    node.name.clone(),
                    node.object_id.to_string(),
                    node.parent_id.map_or_else(|| "-".to_string(), |p| p.to_string()),
                    format_node_flags(node.flags),
                ],
            );
        }
        table.printstd();

        println!("\nMaterial layers:");
        let mut table = create_table(&["Material", "Layer", "Filter", "Texture", "Alpha"]);
        for (m, material) in model.materials().iter().enumerate() {
            for (l, layer) in material.layers.iter().enumerate() {
                add_table_row(
                    &mut table,
                    vec![
                        m.to_string(),
                        l.to_string(),
                        format!("{:?}", layer.filter_mode),
                        layer.texture_id.to_string(),
                        format!("{:.2}", layer.alpha),
                    ],
                );
            }
        }
        table.printstd();
    }

    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "(unnamed)" } else { name }
}

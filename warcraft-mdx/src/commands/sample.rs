//! Evaluate the skeleton of a model at one point in time

use anyhow::{Context, Result, bail};
use std::path::Path;
use wc3_mdx::{MdxModel, Skeleton};

use crate::utils::{add_table_row, create_table, format_vec3};

pub fn execute(file: &Path, sequence: Option<&str>, frame: i64, counter: u32) -> Result<()> {
    let model = MdxModel::from_path(file)
        .with_context(|| format!("Failed to parse MDX model: {}", file.display()))?;

    let sequence = sequence
        .map(|arg| resolve_sequence(&model, arg))
        .transpose()?;
    let time = model.sample_time(sequence, frame, counter);

    match sequence {
        Some(index) => {
            let name = &model.sequences()[index].name;
            println!("Sequence {index} ({name}), frame {}", time.frame);
        }
        None => println!("No sequence, frame {}", time.frame),
    }

    let mut skeleton = Skeleton::new(&model);
    skeleton.update(&model, &time, None);

    let mut table = create_table(&["Node", "Id", "Location", "Scale"]);
    for (node, runtime) in model.nodes().iter().zip(skeleton.nodes()) {
        add_table_row(
            &mut table,
            vec![
                node.name.clone(),
                node.object_id.to_string(),
                format_vec3(runtime.world_location.to_array()),
                format_vec3(runtime.scale.to_array()),
            ],
        );
    }
    table.printstd();

    let visible = model
        .batches()
        .iter()
        .filter(|batch| model.should_render(batch, &time))
        .count();
    println!("Visible batches: {visible}/{}", model.batches().len());

    Ok(())
}

/// Accept a sequence index or a case-insensitive name
fn resolve_sequence(model: &MdxModel, arg: &str) -> Result<usize> {
    if let Ok(index) = arg.parse::<usize>() {
        if index < model.sequences().len() {
            return Ok(index);
        }
        bail!(
            "Sequence index {index} out of range ({} sequences)",
            model.sequences().len()
        );
    }
    model
        .find_sequence(arg)
        .with_context(|| format!("No sequence named '{arg}'"))
}

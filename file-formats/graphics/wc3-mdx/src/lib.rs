//! # Warcraft III MDX Model Parser
//!
//! Reads the binary `MDLX` model container and evaluates its animation:
//! keyframe tracks, the node hierarchy, and particle and ribbon emitters.
//!
//! ## Layers
//!
//! - [`MdxFile`]: the decoded chunks and the shared node registry
//! - [`MdxModel`]: immutable assembly (meshes, batches, texture paths),
//!   shared between instances through an `Arc`
//! - [`ModelInstance`]: one placement with its own clock, [`Skeleton`] and
//!   emitter pools
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wc3_mdx::{InstanceOptions, MdxModel, ModelInstance};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = Arc::new(MdxModel::from_path("Footman.mdx")?);
//! println!("{}: {} sequences", model.name(), model.sequences().len());
//!
//! let mut instance = ModelInstance::with_options(model, InstanceOptions::new().with_seed(7));
//! instance.set_sequence_by_name("Walk")?;
//! instance.update(1.0 / 30.0, None);
//!
//! let palette = instance.bone_matrices();
//! let batches = instance.visible_batches();
//! println!("{} bones, {} batches", palette.len(), batches.len());
//! # Ok(())
//! # }
//! ```

pub mod chunk_id;
pub mod chunks;
pub mod cursor;
pub mod emitters;
pub mod error;
pub mod geoset;
pub mod instance;
pub mod model;
pub mod parser;
pub mod skeleton;
pub mod track;

// Re-export common types
pub use chunk_id::ChunkId;
pub use error::{MdxError, Result};
pub use geoset::GeosetMesh;
pub use instance::{InstanceOptions, LoopMode, MAX_STEP_SECONDS, ModelInstance};
pub use model::{Batch, MdxModel};
pub use parser::{ChunkHeader, MdxFile, MdxParser};
pub use skeleton::{RuntimeNode, Skeleton};
pub use track::{Interpolation, Keyframe, SampleTime, Track, TrackContainer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

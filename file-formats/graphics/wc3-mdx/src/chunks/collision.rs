use glam::Vec3;

use crate::cursor::ByteCursor;
use crate::error::Result;

use super::{ChunkRecord, NodeIndex, NodeRegistry};

/// Geometry of a collision shape, by its stored type code
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionGeometry {
    /// Type 0
    Box { min: Vec3, max: Vec3 },
    /// Type 1
    Plane { min: Vec3, max: Vec3 },
    /// Type 2
    Sphere { center: Vec3, radius: f32 },
    /// Type 3
    Cylinder { base: Vec3, top: Vec3, radius: f32 },
    /// Any other type code; carries no payload
    Unknown(u32),
}

/// Selection and hit-test volume attached to a node
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionShape {
    pub node: NodeIndex,
    pub geometry: CollisionGeometry,
}

impl ChunkRecord for CollisionShape {
    fn read(cursor: &mut ByteCursor<'_>, nodes: &mut NodeRegistry) -> Result<(Self, usize)> {
        let (node, node_size) = nodes.read_node(cursor)?;
        let shape_type = cursor.read_u32()?;

        let (geometry, payload) = match shape_type {
            0 => (
                CollisionGeometry::Box {
                    min: cursor.read_vec3()?,
                    max: cursor.read_vec3()?,
                },
                24,
            ),
            1 => (
                CollisionGeometry::Plane {
                    min: cursor.read_vec3()?,
                    max: cursor.read_vec3()?,
                },
                24,
            ),
            2 => (
                CollisionGeometry::Sphere {
                    center: cursor.read_vec3()?,
                    radius: cursor.read_f32()?,
                },
                16,
            ),
            3 => (
                CollisionGeometry::Cylinder {
                    base: cursor.read_vec3()?,
                    top: cursor.read_vec3()?,
                    radius: cursor.read_f32()?,
                },
                28,
            ),
            other => {
                log::debug!("Collision shape type {other} has no known payload");
                (CollisionGeometry::Unknown(other), 0)
            }
        };

        Ok((Self { node, geometry }, node_size + 4 + payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sphere() {
        let mut data = 96u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0u8; 80]);
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&0x2000u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        for v in [1.0f32, 2.0, 3.0, 50.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let mut nodes = NodeRegistry::new();
        let mut cursor = ByteCursor::new(&data);
        let (shape, size) = CollisionShape::read(&mut cursor, &mut nodes).unwrap();

        assert_eq!(size, data.len());
        assert_eq!(
            shape.geometry,
            CollisionGeometry::Sphere {
                center: Vec3::new(1.0, 2.0, 3.0),
                radius: 50.0
            }
        );
        assert_eq!(nodes.len(), 1);
    }
}

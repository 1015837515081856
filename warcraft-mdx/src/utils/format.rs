//! Value formatting helpers

use humansize::{DECIMAL, format_size};
use wc3_mdx::chunks::NodeFlags;

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a vector as `(x, y, z)` with two decimals
pub fn format_vec3(v: [f32; 3]) -> String {
    format!("({:.2}, {:.2}, {:.2})", v[0], v[1], v[2])
}

/// Format a frame interval in milliseconds
pub fn format_interval(start: u32, end: u32) -> String {
    format!("{start}-{end}")
}

/// Names of the set node flags, joined with `|`
pub fn format_node_flags(flags: NodeFlags) -> String {
    let names: Vec<&str> = flags.iter_names().map(|(name, _)| name).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
    }

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3([1.0, -0.5, 10.126]), "(1.00, -0.50, 10.13)");
    }

    #[test]
    fn test_format_node_flags() {
        assert_eq!(format_node_flags(NodeFlags::empty()), "-");
        assert_eq!(
            format_node_flags(NodeFlags::BONE | NodeFlags::BILLBOARDED),
            "BILLBOARDED|BONE"
        );
    }
}

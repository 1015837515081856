//! Tree rendering for chunk layouts and node hierarchies

use console::Style;
use std::collections::BTreeMap;

use super::format_bytes;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub size: Option<u64>,
    pub children: Vec<TreeNode>,
    /// Sorted so output is stable between runs
    pub metadata: BTreeMap<String, String>,
    pub external_refs: Vec<ExternalRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Chunk,
    /// A chunk this tool does not decode
    Unknown,
    Group,
    Bone,
    Helper,
    Emitter,
    Object,
}

/// A file referenced by the model
#[derive(Debug, Clone)]
pub struct ExternalRef {
    pub path: String,
    pub ref_type: RefType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefType {
    Texture,
    Model,
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub compact: bool,
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            size: None,
            children: Vec::new(),
            metadata: BTreeMap::new(),
            external_refs: Vec::new(),
        }
    }

    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_external_ref(mut self, path: &str) -> Self {
        self.external_refs.push(ExternalRef {
            path: path.to_string(),
            ref_type: detect_ref_type(path),
        });
        self
    }
}

impl RefType {
    fn icon(self) -> &'static str {
        match self {
            RefType::Texture => "🖼️",
            RefType::Model => "🏗️",
            RefType::Unknown => "📁",
        }
    }
}

impl NodeType {
    pub fn icon(self) -> &'static str {
        match self {
            NodeType::Root => "📁",
            NodeType::Chunk => "📦",
            NodeType::Unknown => "❔",
            NodeType::Group => "🗂️",
            NodeType::Bone => "🦴",
            NodeType::Helper => "➕",
            NodeType::Emitter => "✨",
            NodeType::Object => "🔹",
        }
    }

    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            return Style::new();
        }
        match self {
            NodeType::Root => Style::new().bold().cyan(),
            NodeType::Chunk => Style::new().blue(),
            NodeType::Unknown => Style::new().red(),
            NodeType::Group => Style::new().bold().yellow(),
            NodeType::Bone => Style::new().green(),
            NodeType::Helper => Style::new().dim(),
            NodeType::Emitter => Style::new().magenta(),
            NodeType::Object => Style::new().white(),
        }
    }
}

/// Render a tree to a string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if options.max_depth.is_some_and(|max| depth > max) {
        return;
    }

    let connector = match (depth, is_last) {
        (0, _) => "",
        (_, true) => "└── ",
        (_, false) => "├── ",
    };
    let style = node.node_type.style(options.no_color);
    let mut line = format!(
        "{prefix}{connector}{} {}",
        node.node_type.icon(),
        style.apply_to(&node.name)
    );

    if let Some(size) = node.size {
        line.push_str(&format!(" ({})", format_bytes(size)));
    }
    if options.compact && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        line.push_str(&format!(" [{}]", parts.join(", ")));
    }
    output.push_str(&line);
    output.push('\n');

    let continuation = match (depth, is_last) {
        (0, _) => "",
        (_, true) => "    ",
        (_, false) => "│   ",
    };
    let detail_prefix = format!("{prefix}{continuation}    ");

    if !options.compact {
        let key_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{detail_prefix}🏷️  {}: {value}\n",
                key_style.apply_to(key)
            ));
        }
    }
    for ext_ref in &node.external_refs {
        let ref_style = if options.no_color {
            Style::new()
        } else {
            Style::new().yellow()
        };
        output.push_str(&format!(
            "{detail_prefix}└─→ {} {}\n",
            ext_ref.ref_type.icon(),
            ref_style.apply_to(&ext_ref.path)
        ));
    }

    let child_prefix = format!("{prefix}{continuation}");
    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i + 1 == node.children.len();
        render_node(child, output, &child_prefix, is_last_child, depth + 1, options);
    }
}

/// Guess what a referenced path points at from its extension
pub fn detect_ref_type(path: &str) -> RefType {
    let path_lower = path.to_lowercase();
    if path_lower.ends_with(".blp") || path_lower.ends_with(".tga") {
        RefType::Texture
    } else if path_lower.ends_with(".mdx") || path_lower.ends_with(".mdl") {
        RefType::Model
    } else {
        RefType::Unknown
    }
}

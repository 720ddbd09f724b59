//! Tree rendering for model hierarchies

use console::Style;

use super::format::format_bytes;

/// A node in a rendered tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub size: Option<u64>,
    pub children: Vec<TreeNode>,
    /// Key/value pairs shown under the node, in insertion order
    pub metadata: Vec<(String, String)>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Header,
    Bone,
    Mesh,
    Submesh,
    Buffer,
    Track,
}

/// Options for tree rendering
#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            size: None,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the size of this node
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }
}

impl NodeType {
    pub fn icon(self) -> &'static str {
        match self {
            NodeType::Root => "📁",
            NodeType::Header => "📋",
            NodeType::Bone => "🦴",
            NodeType::Mesh => "🔷",
            NodeType::Submesh => "🔹",
            NodeType::Buffer => "💾",
            NodeType::Track => "📽️",
        }
    }

    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            return Style::new();
        }
        match self {
            NodeType::Root => Style::new().bold().cyan(),
            NodeType::Header => Style::new().bold().yellow(),
            NodeType::Bone => Style::new().green(),
            NodeType::Mesh => Style::new().blue(),
            NodeType::Submesh => Style::new().cyan(),
            NodeType::Buffer => Style::new().white(),
            NodeType::Track => Style::new().magenta(),
        }
    }
}

/// Render a tree structure to string
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
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let mut line = format!(
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.icon(),
        style.apply_to(&node.name)
    );

    if let Some(size) = node.size {
        line.push_str(&format!(" ({})", format_bytes(size)));
    }

    if options.show_metadata && options.compact && !node.metadata.is_empty() {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        line.push_str(&format!(" [{}]", parts.join(", ")));
    }

    output.push_str(&line);
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !options.compact {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{child_prefix}    🏷️  {}: {}\n",
                meta_style.apply_to(key),
                value
            ));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i + 1 == node.children.len();
        render_node(
            child,
            output,
            &child_prefix,
            is_last_child,
            depth + 1,
            options,
        );
    }
}

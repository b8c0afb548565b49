//! Format tree snapshots as text or JSON.

use crate::tree::TreeNode;
use owo_colors::OwoColorize;

/// Render `root` as an indented outline.
///
/// Explored directories list their children whether open or not; the marker
/// shows the open state (`▾` open, `▸` closed). Unexplored directories are
/// tagged. `max_depth` limits how many levels below the root are printed.
pub fn format_tree_text(root: &TreeNode, max_depth: Option<usize>, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", label(root, color)));
    render_children(root, "", 1, max_depth, color, &mut out);
    out
}

fn render_children(
    node: &TreeNode,
    prefix: &str,
    depth: usize,
    max_depth: Option<usize>,
    color: bool,
    out: &mut String,
) {
    if max_depth.map_or(false, |max| depth > max) {
        return;
    }
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        out.push_str(&format!("{}{}{}\n", prefix, branch, label(child, color)));
        if child.is_explored() {
            let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_children(child, &next, depth + 1, max_depth, color, out);
        }
    }
}

fn label(node: &TreeNode, color: bool) -> String {
    if node.is_file() {
        return node.name.clone();
    }
    let marker = if node.is_open() { "▾" } else { "▸" };
    let name = format!("{}/", node.name);
    let name = if color {
        name.blue().bold().to_string()
    } else {
        name
    };
    if node.is_explored() {
        format!("{} {}", marker, name)
    } else if color {
        format!("{} {} {}", marker, name, "(unexplored)".dimmed())
    } else {
        format!("{} {} (unexplored)", marker, name)
    }
}

/// Serialize `root` with the same field names the presentation layer uses.
pub fn format_tree_json(root: &TreeNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(root)
}

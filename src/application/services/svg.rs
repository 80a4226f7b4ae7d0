//! Minimal box-and-line SVG rendering of an org forest.

use itertools::Itertools;

use crate::domain::{count_nodes, OrgNode};

pub const DEFAULT_SVG_WIDTH: u32 = 1200;

const NODE_WIDTH: f64 = 150.0;
const NODE_HEIGHT: f64 = 60.0;
const VERTICAL_SPACING: f64 = 100.0;
const CHILD_SLOT_WIDTH: f64 = 200.0;
const MIN_HEIGHT: f64 = 400.0;
const HEIGHT_PER_NODE: f64 = 80.0;
const TOP_MARGIN: f64 = 40.0;

/// Render the forest as a standalone SVG document.
///
/// Siblings share the available width evenly; each child row is centred
/// under its parent and gets at most `CHILD_SLOT_WIDTH` per child.
pub fn render_svg(tree: &[OrgNode], width: u32) -> String {
    let width = f64::from(width);
    let height = MIN_HEIGHT.max(count_nodes(tree) as f64 * HEIGHT_PER_NODE);

    let mut body = String::new();
    render_row(tree, 0.0, 0.0, width, &mut body);

    format!(
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <style>
      .org-node {{ fill: #3b82f6; stroke: #1d4ed8; stroke-width: 2; }}
      .org-text {{ fill: white; font-family: Arial, sans-serif; font-size: 12px; text-anchor: middle; }}
      .org-link {{ stroke: #6b7280; stroke-width: 2; fill: none; }}
    </style>
  </defs>
  <g transform="translate({cx}, {top})">
{body}  </g>
</svg>
"#,
        w = width,
        h = height,
        cx = width / 2.0,
        top = TOP_MARGIN,
        body = body,
    )
}

/// Horizontal centres for `count` siblings spread across `width`.
fn sibling_positions(count: usize, center_x: f64, width: f64) -> Vec<f64> {
    let spacing = width / (count as f64 + 1.0);
    let middle = (count as f64 - 1.0) / 2.0;
    (0..count)
        .map(|i| center_x + (i as f64 - middle) * spacing)
        .collect()
}

fn render_row(nodes: &[OrgNode], center_x: f64, y: f64, width: f64, out: &mut String) {
    let positions = sibling_positions(nodes.len(), center_x, width);
    for (node, x) in nodes.iter().zip(positions) {
        out.push_str(&format!(
            "    <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" class=\"org-node\" rx=\"8\"/>\n",
            x - NODE_WIDTH / 2.0,
            y - NODE_HEIGHT / 2.0,
            NODE_WIDTH,
            NODE_HEIGHT,
        ));
        out.push_str(&format!(
            "    <text x=\"{}\" y=\"{}\" class=\"org-text\">{}</text>\n",
            x,
            y - 5.0,
            escape_xml(&node.role_title),
        ));
        out.push_str(&format!(
            "    <text x=\"{}\" y=\"{}\" class=\"org-text\" style=\"font-size: 10px;\">FTE: {} | ${}</text>\n",
            x,
            y + 15.0,
            node.fte,
            group_thousands(node.annual_cost.unwrap_or(0)),
        ));

        if node.children.is_empty() {
            continue;
        }
        let child_y = y + VERTICAL_SPACING;
        let child_width = width.min(node.children.len() as f64 * CHILD_SLOT_WIDTH);
        for child_x in sibling_positions(node.children.len(), x, child_width) {
            out.push_str(&format!(
                "    <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" class=\"org-link\"/>\n",
                x,
                y + NODE_HEIGHT / 2.0,
                child_x,
                child_y - NODE_HEIGHT / 2.0,
            ));
        }
        render_row(&node.children, x, child_y, child_width, out);
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `1234567` → `1,234,567`
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .join(",");
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

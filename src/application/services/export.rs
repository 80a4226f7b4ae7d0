//! Chart export formats
//!
//! JSON (tree plus scenarios), flat CSV, and a nested hierarchy document
//! for chart libraries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{walk, OrgNode, Scenarios};

/// CSV header row, one column per exported node attribute.
pub const CSV_HEADER: [&str; 5] = ["Role Title", "FTE", "Annual Cost", "Level", "Parent ID"];

/// Name of the synthetic root in hierarchy documents.
pub const HIERARCHY_ROOT: &str = "Organization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Hierarchy,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Hierarchy => "hierarchy",
        };
        f.write_str(s)
    }
}

impl FromStr for ExportFormat {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "hierarchy" => Ok(ExportFormat::Hierarchy),
            other => Err(ApplicationError::Export {
                format: other.to_string(),
                message: "unsupported export format".to_string(),
            }),
        }
    }
}

/// Parsed form of a JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartExport {
    pub tree: Vec<OrgNode>,
    pub scenarios: Scenarios,
}

#[derive(Serialize)]
struct ChartExportRef<'a> {
    tree: &'a [OrgNode],
    scenarios: &'a Scenarios,
}

/// Render a chart in the requested format.
pub fn export_to_format(
    tree: &[OrgNode],
    scenarios: &Scenarios,
    format: ExportFormat,
) -> ApplicationResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&ChartExportRef {
            tree,
            scenarios,
        })?),
        ExportFormat::Csv => export_csv(tree),
        ExportFormat::Hierarchy => Ok(serde_json::to_string_pretty(&to_hierarchy(tree))?),
    }
}

/// Parse a document produced by `export_to_format(.., ExportFormat::Json)`.
pub fn parse_json_export(content: &str) -> ApplicationResult<ChartExport> {
    Ok(serde_json::from_str(content)?)
}

fn export_csv(tree: &[OrgNode]) -> ApplicationResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_err)?;

    for (node, _) in walk(tree) {
        writer
            .write_record([
                node.role_title.clone(),
                node.fte.to_string(),
                node.annual_cost.unwrap_or(0).to_string(),
                node.level.unwrap_or(0).to_string(),
                node.parent_id.clone().unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer.into_inner().map_err(|e| csv_err(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ApplicationError::Export {
        format: ExportFormat::Csv.to_string(),
        message: e.to_string(),
    })
}

fn csv_err(e: impl fmt::Display) -> ApplicationError {
    ApplicationError::Export {
        format: ExportFormat::Csv.to_string(),
        message: e.to_string(),
    }
}

/// Nested document with a synthetic root, as consumed by chart libraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyDocument {
    pub name: String,
    pub children: Vec<HierarchyNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    pub id: String,
    pub fte: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    pub data: HierarchyData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyData {
    pub id: String,
    pub role_title: String,
    pub fte: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_cost: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

pub fn to_hierarchy(tree: &[OrgNode]) -> HierarchyDocument {
    HierarchyDocument {
        name: HIERARCHY_ROOT.to_string(),
        children: tree.iter().map(hierarchy_node).collect(),
    }
}

fn hierarchy_node(node: &OrgNode) -> HierarchyNode {
    HierarchyNode {
        name: node.role_title.clone(),
        id: node.id.clone(),
        fte: node.fte,
        cost: node.annual_cost,
        data: HierarchyData {
            id: node.id.clone(),
            role_title: node.role_title.clone(),
            fte: node.fte,
            annual_cost: node.annual_cost,
            level: node.level,
        },
        children: node.children.iter().map(hierarchy_node).collect(),
    }
}

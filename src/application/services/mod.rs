//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services are concrete structs and free functions, not traits.

mod chart;
pub mod export;
pub mod svg;

pub use chart::{ChartBuildResult, ChartService};
pub use export::{
    export_to_format, parse_json_export, to_hierarchy, ChartExport, ExportFormat,
    HierarchyDocument,
};
pub use svg::{render_svg, DEFAULT_SVG_WIDTH};

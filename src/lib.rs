//! orgchart: turn flat role lists into costed org trees and restructuring scenarios.
//!
//! Layering follows the data flow: `domain` (pure tree logic) →
//! `application` (pipeline and exports) → `infrastructure` (files) → `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

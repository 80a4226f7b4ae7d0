//! Reading role and rate files, writing rendered output.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::expand_path;
use crate::domain::RoleRecord;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// Loads role records and custom rates from disk.
pub struct InputLoader {
    fs: Arc<dyn FileSystem>,
}

impl InputLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load role records from a `.json` array or a `.csv` file with a header row.
    #[instrument(level = "debug", skip(self))]
    pub fn load_roles(&self, path: &Path) -> InfraResult<Vec<RoleRecord>> {
        let path = expand_path(path);
        let content = self.read(&path)?;
        let roles = match extension(&path).as_deref() {
            Some("json") => parse_roles_json(&content).map_err(|e| InfraError::parse(&path, e))?,
            Some("csv") => parse_roles_csv(&content).map_err(|e| InfraError::parse(&path, e))?,
            _ => {
                return Err(InfraError::UnsupportedFormat {
                    path,
                    expected: ".json or .csv".to_string(),
                })
            }
        };
        debug!("loaded {} roles from {}", roles.len(), path.display());
        Ok(roles)
    }

    /// Load a title → rate map from a `.json` object or a flat `.toml` table.
    #[instrument(level = "debug", skip(self))]
    pub fn load_rates(&self, path: &Path) -> InfraResult<BTreeMap<String, f64>> {
        let path = expand_path(path);
        let content = self.read(&path)?;
        let rates: BTreeMap<String, f64> = match extension(&path).as_deref() {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| InfraError::parse(&path, e))?
            }
            Some("toml") => toml::from_str(&content).map_err(|e| InfraError::parse(&path, e))?,
            _ => {
                return Err(InfraError::UnsupportedFormat {
                    path,
                    expected: ".json or .toml".to_string(),
                })
            }
        };
        debug!("loaded {} rates from {}", rates.len(), path.display());
        Ok(rates)
    }

    /// Write rendered output, creating parent directories as needed.
    pub fn write_output(&self, path: &Path, content: &str) -> InfraResult<()> {
        let path = expand_path(path);
        self.fs
            .ensure_parent(&path)
            .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
        self.fs
            .write(&path, content)
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
    }

    fn read(&self, path: &Path) -> InfraResult<String> {
        if !self.fs.is_file(path) {
            return Err(InfraError::io(
                format!("read {}", path.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }
        self.fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn parse_roles_json(content: &str) -> Result<Vec<RoleRecord>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse roles from CSV with headers `id,roleTitle,fte,parentId,level`.
/// Empty cells in optional columns are read as missing.
pub fn parse_roles_csv(content: &str) -> Result<Vec<RoleRecord>, csv::Error> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes())
        .deserialize()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_csv_with_empty_cells_when_parsing_then_optionals_are_none() {
        let content = "id,roleTitle,fte,parentId,level\nA,CEO,1,,\nB,Manager,0.5,A,1\n";
        let roles = parse_roles_csv(content).unwrap();

        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].parent_id, None);
        assert_eq!(roles[0].level, None);
        assert_eq!(roles[1].parent_id.as_deref(), Some("A"));
        assert_eq!(roles[1].fte, 0.5);
        assert_eq!(roles[1].level, Some(1));
    }

    #[test]
    fn given_snake_case_json_when_parsing_then_aliases_accepted() {
        let content = r#"[{"id":"A","role_title":"CEO","fte":1,"parent_id":null}]"#;
        let roles = parse_roles_json(content).unwrap();
        assert_eq!(roles[0].role_title, "CEO");
        assert_eq!(roles[0].parent_id, None);
    }

    #[test]
    fn given_csv_missing_fte_when_parsing_then_errors() {
        let content = "id,roleTitle,parentId\nA,CEO,\n";
        assert!(parse_roles_csv(content).is_err());
    }
}

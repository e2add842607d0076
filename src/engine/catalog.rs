//! Static sinner/persona reference data
//!
//! Loaded once at startup and never mutated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Stable sinner identifier
pub type SinnerId = u32;

/// Catalog embedded at build time
const BUILTIN_CATALOG: &str = include_str!("../../assets/sinners.json");

/// A persona (identity) owned by a sinner. Its index within the sinner is its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A top-level selectable character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sinner {
    pub id: SinnerId,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub personas: Vec<Persona>,
}

/// Ordered collection of sinners
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sinners: Vec<Sinner>,
}

impl Catalog {
    /// Build from sinners, rejecting duplicate ids
    pub fn new(sinners: Vec<Sinner>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(sinners.len());
        for sinner in &sinners {
            if !seen.insert(sinner.id) {
                return Err(CatalogError::DuplicateId(sinner.id));
            }
        }
        Ok(Self { sinners })
    }

    /// Parse a JSON array of sinners
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let sinners: Vec<Sinner> = serde_json::from_str(json)?;
        Self::new(sinners)
    }

    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::from_json(BUILTIN_CATALOG)?;
        log::info!("Loaded catalog with {} sinners", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, id: SinnerId) -> Option<&Sinner> {
        self.sinners.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sinner> {
        self.sinners.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = SinnerId> + '_ {
        self.sinners.iter().map(|s| s.id)
    }

    pub fn len(&self) -> usize {
        self.sinners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 12);
        assert!(catalog.iter().all(|s| !s.personas.is_empty()));
        assert_eq!(catalog.get(1).map(|s| s.name.as_str()), Some("Yi Sang"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"[{"id": 7, "name": "A", "personas": [{"name": "P"}]}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let sinner = catalog.get(7).unwrap();
        assert_eq!(sinner.avatar, None);
        assert_eq!(sinner.personas[0].avatar, None);
    }
}

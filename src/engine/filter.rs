//! Sinner and persona filters
//!
//! A persona is excluded only by an explicit `false` override; a missing entry
//! means enabled. Persisted to LocalStorage so the settings page survives reloads.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Persona, Sinner, SinnerId};
use crate::error::ValidationError;
use crate::platform::storage;

/// Enabled sinners and per-sinner persona overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    enabled_sinners: BTreeSet<SinnerId>,
    /// sinner id -> persona index -> enabled
    #[serde(default)]
    persona_overrides: BTreeMap<SinnerId, BTreeMap<usize, bool>>,
    #[serde(skip)]
    unsaved_changes: bool,
}

impl FilterState {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "sinner_roulette_filters";

    /// Every sinner and persona enabled
    pub fn all_enabled(catalog: &Catalog) -> Self {
        Self {
            enabled_sinners: catalog.ids().collect(),
            persona_overrides: BTreeMap::new(),
            unsaved_changes: false,
        }
    }

    /// Enabled sinners in catalog order
    pub fn enabled_sinners<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Sinner> {
        catalog
            .iter()
            .filter(|s| self.enabled_sinners.contains(&s.id))
            .collect()
    }

    /// Enabled personas of a sinner, in persona order
    pub fn enabled_personas<'a>(&self, sinner: &'a Sinner) -> Vec<&'a Persona> {
        self.enabled_persona_indices(sinner)
            .into_iter()
            .map(|i| &sinner.personas[i])
            .collect()
    }

    /// Indices (into `sinner.personas`) of enabled personas
    pub fn enabled_persona_indices(&self, sinner: &Sinner) -> Vec<usize> {
        (0..sinner.personas.len())
            .filter(|&i| self.is_persona_enabled(sinner.id, i))
            .collect()
    }

    pub fn is_sinner_enabled(&self, id: SinnerId) -> bool {
        self.enabled_sinners.contains(&id)
    }

    pub fn is_persona_enabled(&self, id: SinnerId, index: usize) -> bool {
        self.persona_overrides
            .get(&id)
            .and_then(|m| m.get(&index))
            .copied()
            .unwrap_or(true)
    }

    pub fn set_sinner_enabled(&mut self, id: SinnerId, enabled: bool) {
        if enabled {
            self.enabled_sinners.insert(id);
        } else {
            self.enabled_sinners.remove(&id);
        }
        self.unsaved_changes = true;
    }

    pub fn set_persona_enabled(&mut self, id: SinnerId, index: usize, enabled: bool) {
        self.persona_overrides
            .entry(id)
            .or_default()
            .insert(index, enabled);
        self.unsaved_changes = true;
    }

    /// Toggle every persona of one sinner
    pub fn set_all_personas(&mut self, sinner: &Sinner, enabled: bool) {
        let overrides = self.persona_overrides.entry(sinner.id).or_default();
        for i in 0..sinner.personas.len() {
            overrides.insert(i, enabled);
        }
        self.unsaved_changes = true;
    }

    pub fn select_all(&mut self, catalog: &Catalog) {
        self.enabled_sinners = catalog.ids().collect();
        self.unsaved_changes = true;
    }

    pub fn deselect_all(&mut self) {
        self.enabled_sinners.clear();
        self.unsaved_changes = true;
    }

    /// Flip every sinner's enabled flag
    pub fn invert(&mut self, catalog: &Catalog) {
        self.enabled_sinners = catalog
            .ids()
            .filter(|id| !self.enabled_sinners.contains(id))
            .collect();
        self.unsaved_changes = true;
    }

    /// Check that the filters leave something to pick at both levels
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ValidationError> {
        let enabled = self.enabled_sinners(catalog);
        if enabled.is_empty() {
            return Err(ValidationError::NoSinnersEnabled);
        }

        let missing: Vec<String> = enabled
            .iter()
            .filter(|s| self.enabled_persona_indices(s).is_empty())
            .map(|s| s.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::SinnersWithoutPersonas(missing));
        }

        Ok(())
    }

    /// Validate, then mark the current filters as saved
    pub fn apply(&mut self, catalog: &Catalog) -> Result<(), ValidationError> {
        if let Err(e) = self.validate(catalog) {
            log::warn!("Filter validation failed: {}", e);
            return Err(e);
        }
        self.unsaved_changes = false;
        self.save();
        log::info!(
            "Filters applied ({}/{} sinners)",
            self.enabled_sinners.len(),
            catalog.len()
        );
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Drop ids that are not in the catalog
    fn retain_known(&mut self, catalog: &Catalog) {
        self.enabled_sinners.retain(|id| catalog.get(*id).is_some());
        self.persona_overrides.retain(|id, overrides| match catalog.get(*id) {
            Some(sinner) => {
                overrides.retain(|i, _| *i < sinner.personas.len());
                true
            }
            None => false,
        });
    }

    /// Load filters from LocalStorage, falling back to all enabled
    pub fn load(catalog: &Catalog) -> Self {
        match storage::load_json::<Self>(Self::STORAGE_KEY) {
            Some(mut filters) => {
                filters.retain_known(catalog);
                log::info!(
                    "Restored filters ({}/{} sinners)",
                    filters.enabled_sinners.len(),
                    catalog.len()
                );
                filters
            }
            None => {
                log::info!("Using default filters");
                Self::all_enabled(catalog)
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Filters saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"id": 1, "name": "A", "personas": [{"name": "A0"}, {"name": "A1"}]},
                {"id": 2, "name": "B", "personas": [{"name": "B0"}]},
                {"id": 3, "name": "C", "personas": [{"name": "C0"}, {"name": "C1"}, {"name": "C2"}]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_override_means_enabled() {
        let catalog = catalog();
        let filters = FilterState::all_enabled(&catalog);
        assert!(filters.is_persona_enabled(1, 0));
        assert!(filters.is_persona_enabled(1, 99));
        assert!(!filters.has_unsaved_changes());
    }

    #[test]
    fn test_explicit_false_excludes_persona() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.set_persona_enabled(3, 1, false);

        let names: Vec<_> = filters
            .enabled_personas(catalog.get(3).unwrap())
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["C0", "C2"]);
        assert_eq!(filters.enabled_persona_indices(catalog.get(3).unwrap()), [0, 2]);
        assert!(filters.has_unsaved_changes());
    }

    #[test]
    fn test_enabled_sinners_keep_catalog_order() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.set_sinner_enabled(2, false);
        let ids: Vec<_> = filters.enabled_sinners(&catalog).iter().map(|s| s.id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn test_validate_requires_a_sinner() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.deselect_all();
        assert_eq!(filters.validate(&catalog), Err(ValidationError::NoSinnersEnabled));
    }

    #[test]
    fn test_validate_names_sinner_without_personas() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.deselect_all();
        filters.set_sinner_enabled(1, true);
        filters.set_all_personas(catalog.get(1).unwrap(), false);

        assert_eq!(
            filters.validate(&catalog),
            Err(ValidationError::SinnersWithoutPersonas(vec!["A".to_string()]))
        );
    }

    #[test]
    fn test_disabled_sinner_personas_not_validated() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.set_all_personas(catalog.get(2).unwrap(), false);
        filters.set_sinner_enabled(2, false);
        assert!(filters.validate(&catalog).is_ok());
    }

    #[test]
    fn test_apply_clears_unsaved_changes_only_when_valid() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.deselect_all();
        assert!(filters.apply(&catalog).is_err());
        assert!(filters.has_unsaved_changes());

        filters.set_sinner_enabled(2, true);
        assert!(filters.apply(&catalog).is_ok());
        assert!(!filters.has_unsaved_changes());
    }

    #[test]
    fn test_invert_and_select_all() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.set_sinner_enabled(1, false);
        filters.invert(&catalog);
        assert!(filters.is_sinner_enabled(1));
        assert!(!filters.is_sinner_enabled(2));
        assert!(!filters.is_sinner_enabled(3));

        filters.select_all(&catalog);
        assert_eq!(filters.enabled_sinners(&catalog).len(), 3);
    }

    #[test]
    fn test_json_round_trip_drops_unknown_ids() {
        let catalog = catalog();
        let mut filters = FilterState::all_enabled(&catalog);
        filters.set_persona_enabled(1, 1, false);
        filters.set_sinner_enabled(42, true);
        filters.set_persona_enabled(42, 0, false);
        filters.set_persona_enabled(2, 5, false);

        let json = serde_json::to_string(&filters).unwrap();
        let mut restored: FilterState = serde_json::from_str(&json).unwrap();
        restored.retain_known(&catalog);

        assert!(!restored.is_sinner_enabled(42));
        assert!(!restored.persona_overrides.contains_key(&42));
        assert!(!restored.persona_overrides[&2].contains_key(&5));
        assert!(!restored.is_persona_enabled(1, 1));
        assert!(!restored.has_unsaved_changes());
    }
}

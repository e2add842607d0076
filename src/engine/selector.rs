//! Two-stage selection engine
//!
//! Owns the filters, the current selection, and one wheel (tiled list + scroll
//! animator) per stage. The winner of a spin is picked when the spin starts so the
//! snap can target it. Every filter mutation goes through `refresh`, which
//! rebuilds whichever list changed (aborting its session) and resets selection
//! that is no longer reachable.

use super::catalog::{Catalog, Sinner, SinnerId};
use super::filter::FilterState;
use super::random::{IndexPicker, SecureRandom};
use super::scroll::{ScrollAnimator, ScrollPhase, SessionToken, SnapPlan, StartOutcome};
use super::selection::{SelectionEvent, SelectionState, WheelKind};
use super::tiles::TiledList;
use crate::config::ScrollConfig;
use crate::error::ValidationError;

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStart {
    /// Spin running; drive it with `tick` and end it with `stop_spin`
    Spinning(SessionToken),
    /// Single candidate selected without a spin
    Immediate,
    /// This wheel is already spinning
    AlreadySpinning,
    /// The other wheel is busy
    Blocked,
}

/// Display data for one list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry<'a> {
    pub name: &'a str,
    pub avatar: Option<&'a str>,
}

/// One scrollable list and its animation
#[derive(Debug, Clone)]
struct Wheel {
    list: TiledList,
    animator: ScrollAnimator,
    /// Winner picked at spin start
    pending: Option<usize>,
}

impl Wheel {
    fn new(config: &ScrollConfig) -> Self {
        Self {
            list: TiledList::placeholder(config.row_height),
            animator: ScrollAnimator::new(config.clone()),
            pending: None,
        }
    }

    /// Replace the list. Any running session is destroyed.
    /// Returns true if a session was running.
    fn rebuild(&mut self, item_count: usize) -> bool {
        let aborted = self.animator.is_active();
        self.animator.reset();
        self.pending = None;
        self.list = TiledList::build(item_count, self.animator.config().row_height);
        aborted
    }
}

/// Sinner + persona randomizer
pub struct SelectionEngine<R: IndexPicker = SecureRandom> {
    catalog: Catalog,
    filters: FilterState,
    selection: SelectionState,
    /// Enabled sinner ids, in list order
    sinner_items: Vec<SinnerId>,
    /// Enabled persona indices of the selected sinner, in list order
    persona_items: Vec<usize>,
    sinner_wheel: Wheel,
    persona_wheel: Wheel,
    picker: R,
    max_extra_loops: usize,
    events: Vec<SelectionEvent>,
    /// Wheel whose running spin lost every item in the last refresh
    emptied: Option<WheelKind>,
}

impl<R: IndexPicker> SelectionEngine<R> {
    pub fn new(catalog: Catalog, filters: FilterState, picker: R, config: ScrollConfig) -> Self {
        let config = config.sanitized();
        let mut engine = Self {
            catalog,
            filters,
            selection: SelectionState::new(),
            sinner_items: Vec::new(),
            persona_items: Vec::new(),
            sinner_wheel: Wheel::new(&config),
            persona_wheel: Wheel::new(&config),
            picker,
            max_extra_loops: config.max_extra_loops,
            events: Vec::new(),
            emptied: None,
        };
        engine.refresh_with(true);
        engine
    }

    // === Accessors ===

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn list(&self, kind: WheelKind) -> &TiledList {
        &self.wheel(kind).list
    }

    pub fn phase(&self, kind: WheelKind) -> ScrollPhase {
        self.wheel(kind).animator.phase()
    }

    pub fn offset(&self, kind: WheelKind) -> f32 {
        self.wheel(kind).animator.offset()
    }

    pub fn snap_offset_at(&self, kind: WheelKind, elapsed_ms: f32) -> Option<f32> {
        self.wheel(kind).animator.snap_offset_at(elapsed_ms)
    }

    pub fn item_count(&self, kind: WheelKind) -> usize {
        match kind {
            WheelKind::Sinner => self.sinner_items.len(),
            WheelKind::Persona => self.persona_items.len(),
        }
    }

    /// Names and avatars of the filtered items, in list order
    pub fn entries(&self, kind: WheelKind) -> Vec<ListEntry<'_>> {
        match kind {
            WheelKind::Sinner => self
                .sinner_items
                .iter()
                .filter_map(|id| self.catalog.get(*id))
                .map(|s| ListEntry {
                    name: &s.name,
                    avatar: s.avatar.as_deref(),
                })
                .collect(),
            WheelKind::Persona => {
                let Some(sinner) = self.selection.sinner() else {
                    return Vec::new();
                };
                self.persona_items
                    .iter()
                    .filter_map(|&i| sinner.personas.get(i))
                    .map(|p| ListEntry {
                        name: &p.name,
                        avatar: p.avatar.as_deref().or(sinner.avatar.as_deref()),
                    })
                    .collect()
            }
        }
    }

    /// Whether the start button for `kind` should be enabled
    pub fn can_start(&self, kind: WheelKind) -> bool {
        let wheel = self.wheel(kind);
        !self.wheel(kind.other()).animator.is_active()
            && !wheel.animator.is_active()
            && wheel.list.is_spinnable()
            && (kind == WheelKind::Sinner || self.selection.sinner().is_some())
    }

    /// Whether the stop button for `kind` should be enabled
    pub fn can_stop(&self, kind: WheelKind) -> bool {
        self.phase(kind) == ScrollPhase::Spinning
    }

    /// Take pending notifications
    pub fn drain_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }

    // === Spins ===

    /// Start a spin. The winner is picked here.
    pub fn start_spin(&mut self, kind: WheelKind) -> Result<SpinStart, ValidationError> {
        if self.wheel(kind.other()).animator.is_active() {
            log::debug!("{} spin blocked while {} wheel is active", kind.as_str(), kind.other().as_str());
            return Ok(SpinStart::Blocked);
        }
        if kind == WheelKind::Persona && self.selection.sinner().is_none() {
            return Err(ValidationError::NoSinnerSelected);
        }

        let count = self.item_count(kind);
        match self.wheel_mut(kind).animator.start(count)? {
            StartOutcome::AlreadyActive => Ok(SpinStart::AlreadySpinning),
            StartOutcome::Immediate => {
                self.commit(kind, 0, true);
                Ok(SpinStart::Immediate)
            }
            StartOutcome::Spinning(token) => {
                let winner = self.picker.pick_index(count);
                let wheel = self.wheel_mut(kind);
                wheel.pending = Some(winner);
                wheel.list.clear_highlight();
                log::debug!("{} spin started over {} items", kind.as_str(), count);
                self.events.push(SelectionEvent::SpinStarted { wheel: kind });
                Ok(SpinStart::Spinning(token))
            }
        }
    }

    /// Advance a running spin by one tick
    pub fn tick(&mut self, kind: WheelKind) -> Option<f32> {
        self.wheel_mut(kind).animator.tick()
    }

    /// End the constant spin and get the snap to perform. `Ok(None)` when idle.
    pub fn stop_spin(&mut self, kind: WheelKind) -> Result<Option<SnapPlan>, ValidationError> {
        if self.phase(kind) != ScrollPhase::Spinning {
            return Ok(None);
        }

        // A list change aborts the session, so a spinning wheel has at least two items
        let count = self.item_count(kind);
        let pending = self.wheel_mut(kind).pending.take();
        let winner = pending
            .unwrap_or_else(|| self.picker.pick_index(count))
            .min(count.saturating_sub(1));
        let extra_loops = 1 + self.picker.pick_index(self.max_extra_loops);

        Ok(self.wheel_mut(kind).animator.stop(winner, extra_loops))
    }

    /// Complete the snap for `token`: highlight, publish, cascade.
    /// Returns false for a stale or unknown session.
    pub fn finish_spin(&mut self, kind: WheelKind, token: SessionToken) -> bool {
        let Some(winner) = self.wheel_mut(kind).animator.finish(token) else {
            return false;
        };
        if winner >= self.item_count(kind) {
            log::warn!("{} winner {} out of range after rebuild", kind.as_str(), winner);
            return false;
        }
        self.commit(kind, winner, false);
        true
    }

    // === Filters ===

    pub fn set_sinner_enabled(&mut self, id: SinnerId, enabled: bool) -> Result<(), ValidationError> {
        self.filters.set_sinner_enabled(id, enabled);
        self.refresh()
    }

    pub fn set_persona_enabled(
        &mut self,
        id: SinnerId,
        index: usize,
        enabled: bool,
    ) -> Result<(), ValidationError> {
        self.filters.set_persona_enabled(id, index, enabled);
        self.refresh()
    }

    /// Arbitrary filter edit followed by a refresh
    pub fn update_filters(
        &mut self,
        f: impl FnOnce(&mut FilterState, &Catalog),
    ) -> Result<(), ValidationError> {
        f(&mut self.filters, &self.catalog);
        self.refresh()
    }

    pub fn validate_filters(&self) -> Result<(), ValidationError> {
        self.filters.validate(&self.catalog)
    }

    /// Validate and persist the filters
    pub fn apply_filters(&mut self) -> Result<(), ValidationError> {
        self.filters.apply(&self.catalog)
    }

    /// Rebuild lists that no longer match the filters
    ///
    /// Fails with `NothingToSelect` when a running spin was cancelled because its
    /// list became empty. The filters and lists are updated either way.
    pub fn refresh(&mut self) -> Result<(), ValidationError> {
        self.emptied = None;
        self.refresh_with(false);
        match self.emptied.take() {
            Some(kind) => {
                log::warn!("{} collection emptied during spin", kind.as_str());
                Err(ValidationError::NothingToSelect)
            }
            None => Ok(()),
        }
    }

    fn refresh_with(&mut self, force: bool) {
        let items: Vec<SinnerId> = self
            .filters
            .enabled_sinners(&self.catalog)
            .iter()
            .map(|s| s.id)
            .collect();

        if force || items != self.sinner_items {
            self.sinner_items = items;
            if self.sinner_wheel.rebuild(self.sinner_items.len()) {
                log::info!("Sinner spin cancelled by filter change");
                if self.sinner_items.is_empty() {
                    self.emptied = Some(WheelKind::Sinner);
                }
            }

            match self.selection.sinner_id() {
                Some(id) => match self.sinner_items.iter().position(|&s| s == id) {
                    Some(pos) => self.sinner_wheel.list.highlight(pos),
                    None => {
                        self.selection.clear();
                        self.events.push(SelectionEvent::SelectionCleared);
                        log::info!("Selected sinner filtered out, selection cleared");
                    }
                },
                None => {}
            }
        }

        let lone = (self.sinner_items.len() == 1).then(|| self.sinner_items[0]);
        match lone {
            Some(id) if self.selection.sinner_id() != Some(id) => {
                self.commit(WheelKind::Sinner, 0, true);
            }
            _ => {
                self.rebuild_personas(force);
                self.publish_result();
            }
        }
    }

    /// Rebuild the persona list from the selected sinner's enabled personas
    fn rebuild_personas(&mut self, force: bool) {
        let indices = match self.selection.sinner() {
            Some(sinner) => self.filters.enabled_persona_indices(sinner),
            None => Vec::new(),
        };
        if !force && indices == self.persona_items {
            return;
        }

        self.persona_items = indices;
        if self.persona_wheel.rebuild(self.persona_items.len()) {
            log::info!("Persona spin cancelled by list rebuild");
            if self.persona_items.is_empty() {
                self.emptied = Some(WheelKind::Persona);
            }
        }
        self.events.push(SelectionEvent::PersonaListRebuilt {
            count: self.persona_items.len(),
        });

        // Keep a persona that is still enabled, otherwise drop it
        let kept = match (self.selection.sinner(), self.selection.persona()) {
            (Some(sinner), Some(persona)) => self
                .persona_items
                .iter()
                .position(|&i| sinner.personas.get(i) == Some(persona)),
            _ => None,
        };
        match kept {
            Some(pos) => self.persona_wheel.list.highlight(pos),
            None => self.selection.clear_persona(),
        }

        if self.persona_items.len() == 1 && self.selection.persona().is_none() {
            self.commit(WheelKind::Persona, 0, true);
        }
    }

    // === Internals ===

    fn commit(&mut self, kind: WheelKind, index: usize, auto: bool) {
        match kind {
            WheelKind::Sinner => self.commit_sinner(index, auto),
            WheelKind::Persona => self.commit_persona(index, auto),
        }
    }

    fn commit_sinner(&mut self, index: usize, auto: bool) {
        let Some(sinner) = self
            .sinner_items
            .get(index)
            .and_then(|id| self.catalog.get(*id))
            .cloned()
        else {
            return;
        };

        self.sinner_wheel.list.highlight(index);
        log::info!("Sinner selected: {}{}", sinner.name, if auto { " (auto)" } else { "" });
        self.events.push(SelectionEvent::SinnerSelected {
            id: sinner.id,
            name: sinner.name.clone(),
            auto,
        });
        self.selection.set_sinner(sinner);

        self.rebuild_personas(true);
        self.publish_result();
    }

    fn commit_persona(&mut self, index: usize, auto: bool) {
        let Some(sinner) = self.selection.sinner() else {
            return;
        };
        let Some(persona) = self
            .persona_items
            .get(index)
            .and_then(|&i| sinner.personas.get(i))
            .cloned()
        else {
            return;
        };
        let sinner_name = sinner.name.clone();

        self.persona_wheel.list.highlight(index);
        log::info!("Persona selected: {}{}", persona.name, if auto { " (auto)" } else { "" });
        self.events.push(SelectionEvent::PersonaSelected {
            sinner: sinner_name.clone(),
            persona: persona.name.clone(),
            auto,
        });
        self.events.push(SelectionEvent::EasterEggCheck {
            sinner: sinner_name,
            persona: persona.name.clone(),
        });
        self.selection.set_persona(persona);
        self.publish_result();
    }

    fn publish_result(&mut self) {
        let (sinner, persona) = self.selection.names();
        let event = SelectionEvent::ResultUpdated {
            sinner: sinner.map(str::to_string),
            persona: persona.map(str::to_string),
            sinner_count: self.sinner_items.len(),
        };
        self.events.push(event);
    }

    fn wheel(&self, kind: WheelKind) -> &Wheel {
        match kind {
            WheelKind::Sinner => &self.sinner_wheel,
            WheelKind::Persona => &self.persona_wheel,
        }
    }

    fn wheel_mut(&mut self, kind: WheelKind) -> &mut Wheel {
        match kind {
            WheelKind::Sinner => &mut self.sinner_wheel,
            WheelKind::Persona => &mut self.persona_wheel,
        }
    }

    /// The selected sinner's catalog entry
    pub fn selected_sinner(&self) -> Option<&Sinner> {
        self.selection.sinner()
    }
}

//! Current selection and the events published when it changes

use super::catalog::{Persona, Sinner, SinnerId};

/// The chosen sinner and persona
///
/// Choosing a sinner always clears the persona.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    sinner: Option<Sinner>,
    persona: Option<Persona>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sinner(&self) -> Option<&Sinner> {
        self.sinner.as_ref()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn sinner_id(&self) -> Option<SinnerId> {
        self.sinner.as_ref().map(|s| s.id)
    }

    pub fn set_sinner(&mut self, sinner: Sinner) {
        self.sinner = Some(sinner);
        self.persona = None;
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = Some(persona);
    }

    pub fn clear_persona(&mut self) {
        self.persona = None;
    }

    pub fn clear(&mut self) {
        self.sinner = None;
        self.persona = None;
    }

    pub fn is_empty(&self) -> bool {
        self.sinner.is_none()
    }

    /// Display names (sinner, persona)
    pub fn names(&self) -> (Option<&str>, Option<&str>) {
        (
            self.sinner.as_ref().map(|s| s.name.as_str()),
            self.persona.as_ref().map(|p| p.name.as_str()),
        )
    }
}

/// Notifications for result display, ranking, and easter-egg consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A spin started on a wheel
    SpinStarted { wheel: WheelKind },
    SinnerSelected {
        id: SinnerId,
        name: String,
        /// Chosen without a spin (single candidate)
        auto: bool,
    },
    PersonaSelected {
        sinner: String,
        persona: String,
        auto: bool,
    },
    /// A persona was settled; consumers decide whether the pair is special
    EasterEggCheck { sinner: String, persona: String },
    /// Selection cleared by a filter change
    SelectionCleared,
    /// Persona list was rebuilt (new sinner or filter change)
    PersonaListRebuilt { count: usize },
    /// Result panel should refresh
    ResultUpdated {
        sinner: Option<String>,
        persona: Option<String>,
        sinner_count: usize,
    },
}

/// Which of the two lists an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelKind {
    Sinner,
    Persona,
}

impl WheelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WheelKind::Sinner => "sinner",
            WheelKind::Persona => "persona",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            WheelKind::Sinner => WheelKind::Persona,
            WheelKind::Persona => WheelKind::Sinner,
        }
    }
}

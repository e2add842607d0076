//! Selection engine
//!
//! Pure, platform-independent logic. The browser layer only renders what this
//! module computes:
//! - No DOM or timer access
//! - Randomness only through `IndexPicker`
//! - All state owned by `SelectionEngine`

pub mod catalog;
pub mod filter;
pub mod random;
pub mod scroll;
pub mod selection;
pub mod selector;
pub mod tiles;

pub use catalog::{Catalog, Persona, Sinner, SinnerId};
pub use filter::FilterState;
pub use random::{IndexPicker, SecureRandom, SeededRandom};
pub use scroll::{ScrollAnimator, ScrollPhase, SessionToken, SnapPlan, StartOutcome, target_offset};
pub use selection::{SelectionEvent, SelectionState, WheelKind};
pub use selector::{ListEntry, SelectionEngine, SpinStart};
pub use tiles::{ListLayout, Row, TiledList, visible_rows};

//! Sinner Roulette - pick a random sinner, then one of their personas
//!
//! Core modules:
//! - `engine`: Filters, random selection, tiled lists, and scroll animation
//! - `platform`: Browser DOM and LocalStorage glue
//! - `ranking`: Personal records and the leaderboard data contract
//! - `timer`: Run timer feeding personal records
//! - `config`: Runtime configuration

pub mod config;
pub mod engine;
pub mod error;
pub mod platform;
pub mod ranking;
pub mod timer;

pub use config::{AppConfig, ScrollConfig};
pub use engine::{Catalog, FilterState, SelectionEngine, WheelKind};
pub use error::{CatalogError, InitError, RankingError, ValidationError};
pub use timer::RunTimer;

/// Configuration constants
pub mod consts {
    /// Row height (pixels)
    pub const ROW_HEIGHT: f32 = 50.0;
    /// Copies of the filtered collection in a spinnable list
    pub const TILE_COUNT: usize = 10;
    /// Tile copy the snap lands in before extra loops
    pub const TILE_DEPTH: usize = 5;

    /// Viewport shows between 3 and 5 rows
    pub const MIN_VISIBLE_ROWS: usize = 3;
    pub const MAX_VISIBLE_ROWS: usize = 5;

    /// Spin speed (pixels per tick)
    pub const SPIN_SPEED: f32 = 15.0;
    /// Spin tick interval (ms)
    pub const SPIN_TICK_MS: u32 = 10;
    /// Spin wraps after half of the tiled list
    pub const SPIN_LOOP_MULTIPLIER: f32 = 0.5;

    /// Snap transition
    pub const SNAP_DURATION_MS: u32 = 800;
    pub const SNAP_EASING: &str = "cubic-bezier(0.2, 0.8, 0.2, 1)";
    /// Extra loops added to a snap are drawn from 1..=MAX_EXTRA_LOOPS
    pub const MAX_EXTRA_LOOPS: usize = 3;

    /// Run timer resolution (ms)
    pub const RUN_TIMER_TICK_MS: u32 = 1000;

    pub const DEFAULT_RANKING_API_URL: &str = "https://limbus-service-sbqqgqwpja.cn-beijing.fcapp.run";
}

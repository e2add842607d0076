//! Runtime configuration
//!
//! Defaults come from `crate::consts`. In the browser, `window.appConfig`
//! (set by `config.js`) may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Scroll animation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollConfig {
    /// Row height in pixels
    pub row_height: f32,
    /// Pixels advanced per spin tick
    pub spin_speed: f32,
    /// Spin tick interval (ms)
    pub tick_interval_ms: u32,
    /// Spin offset wraps at `tiled rows * row_height * spin_loop_multiplier`
    pub spin_loop_multiplier: f32,
    /// Tile copy the snap lands in (must leave rows below for the window)
    pub tile_depth: usize,
    /// Snap transition duration (ms)
    pub snap_duration_ms: u32,
    /// Upper bound for the random extra loops added to a snap (at least 1)
    pub max_extra_loops: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            row_height: ROW_HEIGHT,
            spin_speed: SPIN_SPEED,
            tick_interval_ms: SPIN_TICK_MS,
            spin_loop_multiplier: SPIN_LOOP_MULTIPLIER,
            tile_depth: TILE_DEPTH,
            snap_duration_ms: SNAP_DURATION_MS,
            max_extra_loops: MAX_EXTRA_LOOPS,
        }
    }
}

impl ScrollConfig {
    /// Clamp values that would break snap targeting
    pub fn sanitized(mut self) -> Self {
        if self.row_height <= 0.0 {
            self.row_height = ROW_HEIGHT;
        }
        // Past the default the spin can overrun the snap target and run it backwards
        if self.spin_loop_multiplier <= 0.0 || self.spin_loop_multiplier > SPIN_LOOP_MULTIPLIER {
            self.spin_loop_multiplier = SPIN_LOOP_MULTIPLIER;
        }
        self.tick_interval_ms = self.tick_interval_ms.max(1);
        self.max_extra_loops = self.max_extra_loops.clamp(1, MAX_EXTRA_LOOPS);
        // Deepest landing tile must keep the lower half of the window inside the list
        let max_depth = TILE_COUNT.saturating_sub(self.max_extra_loops + 2);
        self.tile_depth = self.tile_depth.clamp(TILE_DEPTH, max_depth.max(TILE_DEPTH));
        self
    }
}

/// Leaderboard collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingConfig {
    pub api_url: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_RANKING_API_URL.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scroll: ScrollConfig,
    pub ranking: RankingConfig,
}

impl AppConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.scroll = config.scroll.sanitized();
        Ok(config)
    }

    /// Read `window.appConfig` (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        use wasm_bindgen::JsValue;

        let value = web_sys::window()
            .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("appConfig")).ok())
            .filter(|v| !v.is_undefined() && !v.is_null());

        if let Some(value) = value {
            if let Some(json) = js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded window.appConfig");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring invalid window.appConfig: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AppConfig::from_json(r#"{"scroll": {"rowHeight": 60}}"#).unwrap();
        assert_eq!(config.scroll.row_height, 60.0);
        assert_eq!(config.scroll.spin_speed, SPIN_SPEED);
        assert_eq!(config.ranking.api_url, DEFAULT_RANKING_API_URL);
    }

    #[test]
    fn test_ranking_url_override() {
        let config =
            AppConfig::from_json(r#"{"ranking": {"apiUrl": "https://example.test"}}"#).unwrap();
        assert_eq!(config.ranking.api_url, "https://example.test");
        assert_eq!(config.scroll, ScrollConfig::default());
    }

    #[test]
    fn test_sanitize_rejects_unusable_values() {
        let config = ScrollConfig {
            row_height: 0.0,
            tick_interval_ms: 0,
            tile_depth: 9,
            max_extra_loops: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.row_height, ROW_HEIGHT);
        assert_eq!(config.tick_interval_ms, 1);
        assert_eq!(config.max_extra_loops, 1);
        assert!(config.tile_depth + config.max_extra_loops + 2 <= TILE_COUNT);
    }

    #[test]
    fn test_sanitize_bounds_loops_depth_and_multiplier() {
        let config = AppConfig::from_json(
            r#"{"scroll": {"maxExtraLoops": 8, "tileDepth": 1, "spinLoopMultiplier": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(config.scroll.max_extra_loops, MAX_EXTRA_LOOPS);
        assert_eq!(config.scroll.tile_depth, TILE_DEPTH);
        assert_eq!(config.scroll.spin_loop_multiplier, SPIN_LOOP_MULTIPLIER);

        let slower = ScrollConfig {
            spin_loop_multiplier: 0.25,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(slower.spin_loop_multiplier, 0.25);
    }

    #[test]
    fn test_default_is_already_sane() {
        assert_eq!(ScrollConfig::default().sanitized(), ScrollConfig::default());
    }
}

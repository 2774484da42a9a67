use serde::{Deserialize, Serialize};

/// Atlas build configuration.
///   - `width`/`height` is the fixed canvas; a 1px border at the top and left stays empty
///   - `trials` is the number of seeds (`0..trials`) the layout search evaluates
///   - `time_budget_ms` and `parallel` affect how the trials are run, never which layout wins
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasConfig {
    /// Atlas width in pixels.
    pub width: u32,
    /// Atlas height in pixels.
    pub height: u32,
    /// Number of packing trials (seeds `0..trials`).
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Draw a 1px opaque border around every sprite (debug).
    #[serde(default)]
    pub draw_padding: bool,
    /// Number of leading path segments removed from image identifiers.
    #[serde(default)]
    pub strip: usize,

    /// Optional time budget for the sequential search (milliseconds). None or 0 disables.
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    /// Evaluate trials in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            trials: default_trials(),
            draw_padding: false,
            strip: 0,
            time_budget_ms: None,
            parallel: default_parallel(),
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Either dimension is 1 or less (no room left after the 1px border)
    /// - `trials` is zero
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.width <= 1 || self.height <= 1 {
            return Err(AtlasError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.trials == 0 {
            return Err(AtlasError::InvalidConfig(
                "trials must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_trials() -> u32 {
    1000
}
fn default_parallel() -> bool {
    false
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn with_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn trials(mut self, v: u32) -> Self {
        self.cfg.trials = v;
        self
    }
    pub fn draw_padding(mut self, v: bool) -> Self {
        self.cfg.draw_padding = v;
        self
    }
    pub fn strip(mut self, v: usize) -> Self {
        self.cfg.strip = v;
        self
    }
    pub fn time_budget_ms(mut self, v: Option<u64>) -> Self {
        self.cfg.time_budget_ms = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

impl AtlasConfig {
    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

//! Renderer configuration.

/// Window size under which keyed matching scans linearly instead of
/// building a key table.
pub const DEFAULT_LINEAR_SCAN_THRESHOLD: usize = 32;

/// Consecutive scheduler flush rounds before a flush is abandoned as an
/// update loop.
pub const DEFAULT_MAX_FLUSH_ROUNDS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    /// Emit diagnostics for malformed input (duplicate keys, missing portal
    /// targets). Never turns them into hard failures.
    pub dev_mode: bool,
    pub linear_scan_threshold: usize,
    pub max_flush_rounds: usize,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            dev_mode: cfg!(debug_assertions),
            linear_scan_threshold: DEFAULT_LINEAR_SCAN_THRESHOLD,
            max_flush_rounds: DEFAULT_MAX_FLUSH_ROUNDS,
        }
    }
}

impl RendererOptions {
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    pub fn linear_scan_threshold(mut self, threshold: usize) -> Self {
        self.linear_scan_threshold = threshold;
        self
    }

    pub fn max_flush_rounds(mut self, rounds: usize) -> Self {
        self.max_flush_rounds = rounds.max(1);
        self
    }

    /// Defaults overridden by `ARBOR_DEV` and `ARBOR_LINEAR_SCAN_THRESHOLD`.
    pub fn from_env() -> Self {
        Self::default().with_lookup(|name| std::env::var(name).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("ARBOR_DEV") {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.dev_mode = true,
                "0" | "false" | "no" | "off" => self.dev_mode = false,
                other => log::warn!("ignoring ARBOR_DEV={other:?}"),
            }
        }
        if let Some(value) = lookup("ARBOR_LINEAR_SCAN_THRESHOLD") {
            match value.trim().parse::<usize>() {
                Ok(threshold) => self.linear_scan_threshold = threshold,
                Err(err) => log::warn!("ignoring ARBOR_LINEAR_SCAN_THRESHOLD={value:?}: {err}"),
            }
        }
        self
    }
}

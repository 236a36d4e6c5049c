//! Configuration for a [`FileHashLookup`](crate::FileHashLookup).

use std::time::Duration;

use folder_diff_common::DEFAULT_REPORT_INTERVAL_MS;
use folder_diff_filesystem::ExcludeScope;

/// Options for a file hash lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// Minimum time between two progress callbacks. `Duration::ZERO` disables reporting.
    pub report_interval: Duration,

    /// Whether paths compare without regard to ASCII case.
    /// Defaults to true on Windows and macOS.
    pub case_insensitive: bool,

    /// Where exclude patterns without a root apply.
    pub exclude_scope: ExcludeScope,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_millis(DEFAULT_REPORT_INTERVAL_MS),
            case_insensitive: cfg!(any(windows, target_os = "macos")),
            exclude_scope: ExcludeScope::AllRoots,
        }
    }
}

impl LookupOptions {
    /// Set the minimum time between progress callbacks.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Disable progress callbacks.
    pub fn without_reporting(mut self) -> Self {
        self.report_interval = Duration::ZERO;
        self
    }

    /// Set case-insensitive path comparison.
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Set where root-less exclude patterns apply.
    pub fn with_exclude_scope(mut self, scope: ExcludeScope) -> Self {
        self.exclude_scope = scope;
        self
    }
}

//! Version compatibility gate.
//!
//! A flow document may record the server version it was last tested
//! with. Before a pull mutates the server, the recorded marker is compared
//! with the live version as trimmed strings (no semver ordering).

use super::types::{Confirm, Prompt, SyncOutcome, VersionMode};

/// Whether the pull may go ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    /// Stop with the given skip outcome.
    Skip(SyncOutcome),
}

/// Gate configuration for one pull run.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionGate {
    /// Bypass the comparison entirely.
    pub ignore: bool,
}

impl VersionGate {
    #[must_use]
    pub const fn new(ignore: bool) -> Self {
        Self { ignore }
    }

    /// Whether the gate needs the live version for this marker at all.
    #[must_use]
    pub fn needs_live_version(&self, recorded: Option<&str>) -> bool {
        !self.ignore && recorded.is_some_and(|r| !r.trim().is_empty())
    }

    /// Decide for one flow.
    ///
    /// An absent marker, an absent live version or the ignore flag always
    /// proceed. On mismatch, silent mode skips and interactive mode asks.
    pub fn check(
        &self,
        flow_name: &str,
        recorded: Option<&str>,
        live: Option<&str>,
        mode: VersionMode,
        confirm: &dyn Confirm,
    ) -> GateDecision {
        if self.ignore {
            return GateDecision::Proceed;
        }
        let (Some(recorded), Some(live)) = (recorded.map(str::trim), live.map(str::trim)) else {
            return GateDecision::Proceed;
        };
        if recorded.is_empty() || live.is_empty() || recorded == live {
            return GateDecision::Proceed;
        }

        match mode {
            VersionMode::Silent => GateDecision::Skip(SyncOutcome::SkippedVersionMismatch),
            VersionMode::Interactive => {
                let prompt = Prompt::VersionMismatch {
                    flow_name: flow_name.to_string(),
                    recorded: recorded.to_string(),
                    live: live.to_string(),
                };
                if confirm.confirm(&prompt) {
                    GateDecision::Proceed
                } else {
                    GateDecision::Skip(SyncOutcome::SkippedUserDeclined)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::Always;
    use std::cell::Cell;

    #[test]
    fn test_no_marker_proceeds() {
        let gate = VersionGate::default();
        assert_eq!(
            gate.check("f", None, Some("1.3.0"), VersionMode::Silent, &Always(false)),
            GateDecision::Proceed
        );
        assert!(!gate.needs_live_version(None));
        assert!(!gate.needs_live_version(Some("  ")));
    }

    #[test]
    fn test_matching_after_trim_proceeds() {
        let gate = VersionGate::default();
        assert_eq!(
            gate.check("f", Some(" 1.3.0 "), Some("1.3.0\n"), VersionMode::Silent, &Always(false)),
            GateDecision::Proceed
        );
    }

    #[test]
    fn test_mismatch_silent_skips_without_prompt() {
        let asked = Cell::new(false);
        let confirm = |_: &Prompt| {
            asked.set(true);
            true
        };
        let decision = VersionGate::default().check(
            "f",
            Some("1.2.0"),
            Some("1.3.0"),
            VersionMode::Silent,
            &confirm,
        );
        assert_eq!(decision, GateDecision::Skip(SyncOutcome::SkippedVersionMismatch));
        assert!(!asked.get());
    }

    #[test]
    fn test_mismatch_interactive_asks() {
        let gate = VersionGate::default();
        assert_eq!(
            gate.check("f", Some("1.2.0"), Some("1.3.0"), VersionMode::Interactive, &Always(true)),
            GateDecision::Proceed
        );
        assert_eq!(
            gate.check("f", Some("1.2.0"), Some("1.3.0"), VersionMode::Interactive, &Always(false)),
            GateDecision::Skip(SyncOutcome::SkippedUserDeclined)
        );
    }

    #[test]
    fn test_not_semver_ordered() {
        // "1.3" and "1.3.0" are different strings.
        let gate = VersionGate::default();
        assert_eq!(
            gate.check("f", Some("1.3"), Some("1.3.0"), VersionMode::Silent, &Always(true)),
            GateDecision::Skip(SyncOutcome::SkippedVersionMismatch)
        );
    }

    #[test]
    fn test_ignore_flag_overrides() {
        let gate = VersionGate::new(true);
        assert!(!gate.needs_live_version(Some("1.2.0")));
        assert_eq!(
            gate.check("f", Some("1.2.0"), Some("1.3.0"), VersionMode::Silent, &Always(false)),
            GateDecision::Proceed
        );
    }
}

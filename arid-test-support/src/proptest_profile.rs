//! Environment-driven tuning for property suites.
//!
//! Every property suite in the workspace builds its configuration through
//! [`proptest_config`] so one pair of environment variables controls all of
//! them.

use std::env;

use ::tracing::warn;
use proptest::test_runner::Config;

/// Overrides the number of cases each property runs.
pub const CASES_ENV_KEY: &str = "ARID_PROPTEST_CASES";
/// Runs each property case in a forked subprocess when truthy.
pub const FORK_ENV_KEY: &str = "ARID_PROPTEST_FORK";

/// Case count and fork mode resolved from the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads the overrides, falling back to the supplied defaults when a
    /// variable is unset or malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use arid_test_support::proptest_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_or(CASES_ENV_KEY, default_cases, parse_cases),
            fork: override_or(FORK_ENV_KEY, default_fork, parse_flag),
        }
    }

    /// Number of cases per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether cases run in forked subprocesses.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }

    /// Converts the profile into a proptest runner configuration.
    #[must_use]
    pub fn into_config(self) -> Config {
        Config {
            cases: self.cases,
            fork: self.fork,
            ..Config::default()
        }
    }
}

/// Builds the runner configuration for a suite whose default case count is
/// `default_cases`.
#[must_use]
pub fn proptest_config(default_cases: u32) -> Config {
    ProptestRunProfile::load(default_cases, false).into_config()
}

fn override_or<T>(key: &'static str, default: T, parse: fn(&str) -> Result<T, String>) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|reason| {
        warn!(env = key, raw = %raw, reason = %reason, "ignoring malformed proptest override");
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("case count must be positive".to_owned()),
        Ok(cases) => Ok(cases),
        Err(err) => Err(format!("not a case count: {err}")),
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true/false, 1/0, yes/no or on/off".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("1", Ok(1))]
    #[case(" 512 ", Ok(512))]
    #[case("0", Err(()))]
    #[case("-3", Err(()))]
    #[case("many", Err(()))]
    fn parse_cases_accepts_positive_integers(#[case] raw: &str, #[case] expected: Result<u32, ()>) {
        assert_eq!(parse_cases(raw).map_err(|_| ()), expected);
    }

    #[rstest]
    #[case("TRUE", Ok(true))]
    #[case("on", Ok(true))]
    #[case("1", Ok(true))]
    #[case("No", Ok(false))]
    #[case("off", Ok(false))]
    #[case("", Err(()))]
    #[case("2", Err(()))]
    fn parse_flag_accepts_common_spellings(#[case] raw: &str, #[case] expected: Result<bool, ()>) {
        assert_eq!(parse_flag(raw).map_err(|_| ()), expected);
    }

    #[test]
    fn into_config_carries_cases_and_fork() {
        let profile = ProptestRunProfile {
            cases: 17,
            fork: true,
        };
        let config = profile.into_config();
        assert_eq!(config.cases, 17);
        assert!(config.fork);
    }
}

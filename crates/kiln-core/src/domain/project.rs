//! Variables injected automatically for every new package.
//!
//! | Namespace | Key            | Example (`foo_bar-baz`, 2026-03-07) |
//! |-----------|----------------|-------------------------------------|
//! | path      | `PACKAGE_NAME` | `foo_bar-baz`                       |
//! | path      | `REQUIRE_NAME` | `foo_bar/baz`                       |
//! | path      | `YEAR`         | `2026`                              |
//! | path      | `MONTH`        | `03`                                |
//! | path      | `DAY`          | `07`                                |
//! | path      | `DATE`         | `2026-03-07`                        |
//! | content   | `package_name` | `foo_bar-baz`                       |
//! | content   | `require_name` | `foo_bar/baz`                       |
//! | content   | `namespace`    | `FooBar::Baz`                       |
//! | content   | `version`      | `0.0.1`                             |
//! | content   | `description`  | user supplied                       |
//! | content   | `summary`      | user supplied                       |
//! | content   | `timestamp`    | RFC 3339 time of the run            |
//! | content   | `date`         | `2026-03-07`                        |

use chrono::{DateTime, Datelike, FixedOffset, Local, SecondsFormat};

use crate::domain::variables::VariableMap;

/// Version written into freshly generated packages.
pub const INITIAL_VERSION: &str = "0.0.1";

/// Inputs for the auto-injected variable maps.
#[derive(Debug, Clone)]
pub struct ProjectVariables {
    package_name: String,
    description: String,
    summary: String,
    version: String,
    now: DateTime<FixedOffset>,
}

impl ProjectVariables {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            description: String::new(),
            summary: String::new(),
            version: INITIAL_VERSION.to_owned(),
            now: Local::now().fixed_offset(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Pin the clock, mostly for tests.
    pub fn at(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// `foo-bar` → `foo/bar`, the conventional require path.
    pub fn require_name(&self) -> String {
        self.package_name.replace('-', "/")
    }

    /// `foo_bar-baz` → `FooBar::Baz`.
    pub fn namespace(&self) -> String {
        self.package_name
            .split('-')
            .map(camelize)
            .collect::<Vec<_>>()
            .join("::")
    }

    fn iso_date(&self) -> String {
        self.now.format("%Y-%m-%d").to_string()
    }

    pub fn path_variables(&self) -> VariableMap {
        VariableMap::new()
            .with("PACKAGE_NAME", self.package_name.as_str())
            .with("REQUIRE_NAME", self.require_name())
            .with("YEAR", self.now.year().to_string())
            .with("MONTH", format!("{:02}", self.now.month()))
            .with("DAY", format!("{:02}", self.now.day()))
            .with("DATE", self.iso_date())
    }

    pub fn content_variables(&self) -> VariableMap {
        VariableMap::new()
            .with("package_name", self.package_name.as_str())
            .with("require_name", self.require_name())
            .with("namespace", self.namespace())
            .with("version", self.version.as_str())
            .with("description", self.description.as_str())
            .with("summary", self.summary.as_str())
            .with(
                "timestamp",
                self.now.to_rfc3339_opts(SecondsFormat::Secs, false),
            )
            .with("date", self.iso_date())
    }
}

/// Upper-case the first letter of every `_`-separated word and drop the
/// underscores.
fn camelize(segment: &str) -> String {
    segment
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-07T09:30:00+01:00").unwrap()
    }

    #[test]
    fn namespace_camelizes_and_nests() {
        let vars = ProjectVariables::new("foo_bar-baz");
        assert_eq!(vars.namespace(), "FooBar::Baz");
        assert_eq!(ProjectVariables::new("widget").namespace(), "Widget");
    }

    #[test]
    fn require_name_nests_dashed_names() {
        assert_eq!(ProjectVariables::new("foo-bar").require_name(), "foo/bar");
        assert_eq!(ProjectVariables::new("foo_bar").require_name(), "foo_bar");
    }

    #[test]
    fn path_variables_carry_date_parts() {
        let vars = ProjectVariables::new("widget").at(fixed()).path_variables();
        assert_eq!(vars.get("PACKAGE_NAME"), Some("widget"));
        assert_eq!(vars.get("YEAR"), Some("2026"));
        assert_eq!(vars.get("MONTH"), Some("03"));
        assert_eq!(vars.get("DAY"), Some("07"));
        assert_eq!(vars.get("DATE"), Some("2026-03-07"));
    }

    #[test]
    fn content_variables_defaults() {
        let vars = ProjectVariables::new("widget")
            .summary("A widget")
            .at(fixed())
            .content_variables();
        assert_eq!(vars.get("version"), Some(INITIAL_VERSION));
        assert_eq!(vars.get("summary"), Some("A widget"));
        assert_eq!(vars.get("description"), Some(""));
        assert_eq!(vars.get("timestamp"), Some("2026-03-07T09:30:00+01:00"));
    }
}

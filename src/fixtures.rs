use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The complete fixture corpus, in run order.
pub const FULL_SUITE: [&str; 8] = [
    "Underscore 1.4.1",
    "Backbone 0.9.2",
    "CodeMirror 2.34",
    "MooTools 1.4.1",
    "jQuery 1.8.2",
    "jQuery.Mobile 1.2.0",
    "Angular 1.0.2",
    "three.js r51",
];

/// A representative three-fixture sample of the full corpus.
pub const QUICK_SUITE: [&str; 3] = ["Backbone 0.9.2", "jQuery 1.8.2", "Angular 1.0.2"];

/// Suite selector accepted on the command line and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Suite {
    /// Three-fixture sample for fast feedback.
    Quick,
    /// All eight corpus fixtures.
    Full,
}

impl Suite {
    /// Ordered fixture display names belonging to this suite.
    pub fn fixtures(self) -> &'static [&'static str] {
        match self {
            Suite::Quick => &QUICK_SUITE,
            Suite::Full => &FULL_SUITE,
        }
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suite::Quick => write!(f, "quick"),
            Suite::Full => write!(f, "full"),
        }
    }
}

/// Derive the stable identifier for a fixture display name.
///
/// Lowercases the name, collapses every `.js` occurrence to `js` and every
/// whitespace character to `-`. The result keys the source table and forms
/// the on-disk/URL path suffix.
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .replace(".js", "js")
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Relative storage location of a fixture, shared by the HTTP and local
/// filesystem layouts.
pub fn fixture_path(slug: &str) -> String {
    format!("3rdparty/{slug}.js")
}

/// Render a byte count as kibibytes with one decimal place.
pub fn size_label(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_normalizes_display_names() {
        assert_eq!(slug("three.js r51"), "threejs-r51");
        assert_eq!(slug("Backbone 0.9.2"), "backbone-0.9.2");
        // Only `.js` collapses; other dots survive.
        assert_eq!(slug("jQuery.Mobile 1.2.0"), "jquery.mobile-1.2.0");
    }

    #[test]
    fn slug_is_idempotent() {
        for name in FULL_SUITE {
            let once = slug(name);
            assert_eq!(slug(&once), once);
        }
    }

    #[test]
    fn suites_are_fixed_ordered_sequences() {
        assert_eq!(Suite::Full.fixtures().len(), 8);
        assert_eq!(Suite::Quick.fixtures().len(), 3);
        assert_eq!(
            Suite::Quick.fixtures(),
            ["Backbone 0.9.2", "jQuery 1.8.2", "Angular 1.0.2"]
        );
        for name in Suite::Quick.fixtures() {
            assert!(Suite::Full.fixtures().contains(name));
        }
    }

    #[test]
    fn fixture_path_uses_slug() {
        assert_eq!(fixture_path(&slug("three.js r51")), "3rdparty/threejs-r51.js");
    }

    #[test]
    fn size_label_renders_kibibytes() {
        assert_eq!(size_label(1024), "1.0");
        assert_eq!(size_label(600), "0.6");
        assert_eq!(size_label(100), "0.1");
    }
}

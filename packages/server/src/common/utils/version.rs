use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

fn numeric_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version pattern is valid")
    })
}

/// Loose coercion of a catalog version string into a semantic version.
///
/// Takes the first `major[.minor[.patch]]` run of digits, fills missing parts
/// with zero and drops any prerelease or build suffix. Returns `None` when
/// the string holds no digits or a component overflows.
pub fn coerce_version(raw: &str) -> Option<Version> {
    let caps = numeric_run().captures(raw)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_version_unchanged() {
        assert_eq!(coerce_version("1.2.3"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_missing_parts_filled() {
        assert_eq!(coerce_version("1"), Some(Version::new(1, 0, 0)));
        assert_eq!(coerce_version("v1.2"), Some(Version::new(1, 2, 0)));
    }

    #[test]
    fn test_prerelease_and_build_dropped() {
        assert_eq!(coerce_version("2.0.0-beta.1"), Some(Version::new(2, 0, 0)));
        assert_eq!(coerce_version("3.1.4+build.9"), Some(Version::new(3, 1, 4)));
    }

    #[test]
    fn test_extra_components_ignored() {
        assert_eq!(coerce_version("1.2.3.4"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(coerce_version("latest"), None);
        assert_eq!(coerce_version(""), None);
    }
}

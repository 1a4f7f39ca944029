//! API version ordering
//!
//! Versions follow `v<major>[alpha|beta]<minor>`. A GA version always ranks
//! above beta, and beta above alpha, regardless of the numbers. Within a
//! channel the higher major wins, then the higher minor.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(\d+)(alpha|beta|)(\d*)$").expect("version pattern is valid")
});

/// An API version string such as `v1`, `v2beta1` or `v1alpha1`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiVersion(String);

impl ApiVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rank tuple (channel, major, minor); `None` for strings outside the grammar
    fn rank(&self) -> Option<(u8, u64, u64)> {
        let caps = VERSION_PATTERN.captures(&self.0)?;
        let major = caps[1].parse().ok()?;
        let channel = match &caps[2] {
            "" => 2,
            "beta" => 1,
            _ => 0,
        };
        let minor = match &caps[3] {
            "" => 0,
            digits => digits.parse().ok()?,
        };
        Some((channel, major, minor))
    }

    /// Version with the first letter upper-cased, as it appears in operation IDs
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Greater means newer.
impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| other.0.cmp(&self.0))
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApiVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ApiVersion {
        ApiVersion::new(s)
    }

    #[test]
    fn test_ga_beats_beta_beats_alpha() {
        assert!(v("v1") > v("v1beta1"));
        assert!(v("v1beta1") > v("v1alpha1"));
        assert!(v("v1") > v("v2beta1"));
        assert!(v("v1beta1") > v("v2alpha1"));
    }

    #[test]
    fn test_numbers_within_channel() {
        assert!(v("v2") > v("v1"));
        assert!(v("v2beta2") > v("v2beta1"));
        assert!(v("v2beta1") > v("v1beta1"));
        assert!(v("v10") > v("v9"));
        assert!(v("v1beta10") > v("v1beta9"));
    }

    #[test]
    fn test_strict_total_order() {
        let mut versions = vec![
            v("v1alpha1"),
            v("v2"),
            v("v1beta2"),
            v("v1"),
            v("v1beta1"),
            v("v2beta1"),
            v("v1alpha2"),
        ];
        versions.sort_by(|a, b| b.cmp(a));
        let ordered: Vec<&str> = versions.iter().map(ApiVersion::as_str).collect();
        assert_eq!(
            ordered,
            vec!["v2", "v1", "v2beta1", "v1beta2", "v1beta1", "v1alpha2", "v1alpha1"]
        );

        for a in &versions {
            for b in &versions {
                if a != b {
                    assert_ne!(a.cmp(b), Ordering::Equal, "{a} vs {b}");
                    assert_eq!(a.cmp(b), b.cmp(a).reverse());
                }
            }
        }
    }

    #[test]
    fn test_unparseable_versions_rank_lowest() {
        assert!(v("v1alpha1") > v("resource"));
        assert_ne!(v("resource").cmp(&v("other")), Ordering::Equal);
    }

    #[test]
    fn test_capitalized() {
        assert_eq!(v("v1beta1").capitalized(), "V1beta1");
        assert_eq!(v("").capitalized(), "");
    }
}

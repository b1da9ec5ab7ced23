/// A host name pattern verification can be scoped to
///
/// A plain pattern matches exactly one host, `*.example.com` matches every host below
/// `example.com` (but not `example.com` itself), and `*.*` matches everything.
/// Matching is case insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pattern: String,
}

impl Host {
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            pattern: pattern.as_ref().to_ascii_lowercase(),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();

        if self.pattern == "*.*" {
            return true;
        }

        if let Some(base) = self.pattern.strip_prefix("*.") {
            return host
                .strip_suffix(base)
                .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1);
        }

        host == self.pattern
    }
}

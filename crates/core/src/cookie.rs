//! Cookie header parsing
//!
//! The single place where a `Cookie` header (`a=1; b=2`) is split into
//! name/value pairs. Session lookups go through [`CookieJar::get`].

/// Parsed cookie header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    pairs: Vec<(String, String)>,
}

impl CookieJar {
    /// Parse a `Cookie` header value.
    ///
    /// Pairs without `=` are skipped, whitespace around names and values is
    /// trimmed and values may themselves contain `=`.
    pub fn parse(header: &str) -> Self {
        let pairs = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { pairs }
    }

    /// Value of the first cookie called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

//! Oncology product gating.
//!
//! Adapters decide inclusion through the [`ProductLookup`] capability; the
//! shipped implementation matches configured keywords against candidate
//! text. A client for an external drug-dictionary service can implement the
//! same trait and be injected without touching the adapters.

/// Maps a candidate product name or body text to a canonical product name,
/// or `None` when the candidate is not in the approved vocabulary.
pub trait ProductLookup: Send + Sync {
    fn lookup(&self, candidate: &str) -> Option<String>;

    /// Convenience boolean gate over [`ProductLookup::lookup`].
    fn matches(&self, candidate: &str) -> bool {
        self.lookup(candidate).is_some()
    }
}

/// Case-insensitive keyword gate.
///
/// An empty keyword list accepts everything (the source is pre-filtered or
/// the operator disabled gating), mirroring `require_oncology: false`
/// semantics.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    #[must_use]
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl ProductLookup for KeywordFilter {
    fn lookup(&self, candidate: &str) -> Option<String> {
        if self.keywords.is_empty() {
            return Some(candidate.trim().to_owned());
        }
        let hay = candidate.to_lowercase();
        self.keywords
            .iter()
            .find(|k| hay.contains(k.as_str()))
            .map(|_| candidate.trim().to_owned())
    }
}

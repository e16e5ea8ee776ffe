use std::collections::BTreeMap;
use std::fmt;

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Named device/OS/browser checks a classifier declares.
///
/// Names are matched case-insensitively, so `is_device("ipad")` and
/// `is_device("iPad")` hit the same entry.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: BTreeMap<String, (String, Predicate)>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, replacing any previous entry with the same name.
    pub fn register<F>(&mut self, name: &str, predicate: F) -> &mut Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.entries.insert(
            name.to_ascii_lowercase(),
            (name.to_owned(), Box::new(predicate)),
        );
        self
    }

    /// Evaluate `name` against `user_agent`; `None` for an unknown name.
    pub fn classify(&self, name: &str, user_agent: &str) -> Option<bool> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, predicate)| predicate(user_agent))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Declared names, as registered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

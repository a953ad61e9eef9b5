//! Deduplicating message store.
//!
//! Messages are keyed by `(singular, plural)`: the same singular with and
//! without a plural form are different messages. Recording an existing key only
//! grows its occurrence set.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// A place in source code where a message was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    /// Project-relative path with `/` separators.
    pub path: String,
    /// 1-based line number.
    pub line: usize,
}

impl Occurrence {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// Case-insensitive path, then line. The exact path only breaks ties between
/// paths that differ in case, keeping the order consistent with `Eq`.
impl Ord for Occurrence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .to_lowercase()
            .cmp(&other.path.to_lowercase())
            .then(self.line.cmp(&other.line))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for Occurrence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// Identity of a message. Derived ordering is `(singular, has_plural, plural)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageKey {
    pub singular: String,
    pub plural: Option<String>,
}

impl MessageKey {
    pub fn new(singular: impl Into<String>, plural: Option<String>) -> Self {
        Self {
            singular: singular.into(),
            plural,
        }
    }
}

/// Where a message sat in the previously persisted catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Positioned(usize),
    /// Newly discovered; not yet part of any persisted catalog.
    Unordered,
}

/// Positioned messages come first, by position; unordered ones follow.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Position::Positioned(a), Position::Positioned(b)) => a.cmp(b),
            (Position::Positioned(_), Position::Unordered) => Ordering::Less,
            (Position::Unordered, Position::Positioned(_)) => Ordering::Greater,
            (Position::Unordered, Position::Unordered) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableMessage {
    pub key: MessageKey,
    pub occurrences: BTreeSet<Occurrence>,
    pub position: Position,
}

impl TranslatableMessage {
    pub fn new(key: MessageKey) -> Self {
        Self {
            key,
            occurrences: BTreeSet::new(),
            position: Position::Unordered,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn singular(&self) -> &str {
        &self.key.singular
    }

    pub fn plural(&self) -> Option<&str> {
        self.key.plural.as_deref()
    }

    /// Catalog order: position first, then key.
    pub fn catalog_cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.key.cmp(&other.key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: BTreeMap<MessageKey, TranslatableMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `(singular, plural)`.
    ///
    /// Returns `true` when this created a new message.
    pub fn record(
        &mut self,
        singular: impl Into<String>,
        plural: Option<String>,
        occurrence: Occurrence,
    ) -> bool {
        let key = MessageKey::new(singular, plural);
        match self.messages.get_mut(&key) {
            Some(message) => {
                message.occurrences.insert(occurrence);
                false
            }
            None => {
                let mut message = TranslatableMessage::new(key.clone());
                message.occurrences.insert(occurrence);
                self.messages.insert(key, message);
                true
            }
        }
    }

    /// Insert a whole message, unioning occurrences with an existing entry.
    ///
    /// An existing entry keeps its position unless it had none.
    pub fn insert(&mut self, message: TranslatableMessage) {
        match self.messages.get_mut(&message.key) {
            Some(existing) => {
                existing.occurrences.extend(message.occurrences);
                if existing.position == Position::Unordered {
                    existing.position = message.position;
                }
            }
            None => {
                self.messages.insert(message.key.clone(), message);
            }
        }
    }

    /// Fold another store into this one with the same semantics as [`record`](Self::record).
    pub fn merge(&mut self, other: MessageStore) {
        for message in other.messages.into_values() {
            self.insert(message);
        }
    }

    pub fn merged(mut self, other: MessageStore) -> Self {
        self.merge(other);
        self
    }

    pub fn get(&self, key: &MessageKey) -> Option<&TranslatableMessage> {
        self.messages.get(key)
    }

    pub fn find(&self, singular: &str, plural: Option<&str>) -> Option<&TranslatableMessage> {
        self.get(&MessageKey::new(singular, plural.map(String::from)))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn remove(&mut self, key: &MessageKey) -> Option<TranslatableMessage> {
        self.messages.remove(key)
    }

    pub fn occurrence_count(&self) -> usize {
        self.messages.values().map(|m| m.occurrences.len()).sum()
    }

    /// Messages in catalog order.
    pub fn sorted(&self) -> Vec<&TranslatableMessage> {
        let mut messages: Vec<_> = self.messages.values().collect();
        messages.sort_by(|a, b| a.catalog_cmp(b));
        messages
    }

    pub fn into_messages(self) -> impl Iterator<Item = TranslatableMessage> {
        self.messages.into_values()
    }
}

impl FromIterator<TranslatableMessage> for MessageStore {
    fn from_iter<T: IntoIterator<Item = TranslatableMessage>>(iter: T) -> Self {
        let mut store = MessageStore::new();
        for message in iter {
            store.insert(message);
        }
        store
    }
}

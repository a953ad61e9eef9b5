//! Reconciliation of a freshly extracted store with the previous catalog.

use tracing::debug;

use crate::core::store::{MessageStore, Position};

/// What [`synchronize`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Messages found now that the previous catalog did not have.
    pub added: usize,
    /// Messages found now that the previous catalog already had.
    pub matched: usize,
    /// Msgids of previous-only messages that were kept, in catalog order.
    pub retained: Vec<String>,
    /// Previous-only messages dropped.
    pub removed: usize,
}

/// Reconcile `fresh` against the store read from the previous catalog.
///
/// - without a previous store, `fresh` is returned unchanged;
/// - a message in both keeps the previous position but only fresh occurrences;
/// - a previous-only message is kept with its old occurrences, or dropped when
///   `remove_unused` is set;
/// - a fresh-only message stays unordered.
pub fn synchronize(
    fresh: MessageStore,
    previous: Option<MessageStore>,
    remove_unused: bool,
) -> (MessageStore, SyncSummary) {
    let Some(mut previous) = previous else {
        let summary = SyncSummary {
            added: fresh.len(),
            ..Default::default()
        };
        return (fresh, summary);
    };

    let mut summary = SyncSummary::default();
    let mut result = MessageStore::new();

    for mut message in fresh.into_messages() {
        match previous.remove(&message.key) {
            Some(old) => {
                summary.matched += 1;
                message.position = old.position;
            }
            None => {
                summary.added += 1;
                message.position = Position::Unordered;
            }
        }
        result.insert(message);
    }

    let mut unused: Vec<_> = previous.into_messages().collect();
    unused.sort_by(|a, b| a.catalog_cmp(b));
    for old in unused {
        if remove_unused {
            debug!(msgid = %old.key.singular, "dropping unused message");
            summary.removed += 1;
        } else {
            summary.retained.push(old.key.singular.clone());
            result.insert(old);
        }
    }

    (result, summary)
}

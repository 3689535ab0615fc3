use pulse_grid_core::TriggerEntry;

/// Ordered activations waiting for the next step.
///
/// Entries are never deduplicated; the same target may appear several times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerQueue {
    entries: Vec<TriggerEntry>,
}

impl TriggerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry behind every entry already queued.
    pub fn push(&mut self, entry: TriggerEntry) {
        self.entries.push(entry);
    }

    /// Entries in resolution order.
    #[must_use]
    pub fn entries(&self) -> &[TriggerEntry] {
        &self.entries
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no entries are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<TriggerEntry> for TriggerQueue {
    fn from_iter<I: IntoIterator<Item = TriggerEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

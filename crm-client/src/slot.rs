//! Generation-guarded cache slots.

/// One cache slot plus its request-generation bookkeeping.
///
/// A fetch takes a generation number at issue time via [`Slot::begin`];
/// the response is applied via [`Slot::commit`] only if no later-issued
/// fetch has been applied in the meantime. A superseded response is
/// dropped instead of clobbering the slot, so the slot deterministically
/// holds the last-*issued* fetch regardless of arrival order.
#[derive(Debug, Default)]
pub(crate) struct Slot<T> {
    value: T,
    issued: u64,
    applied: u64,
}

impl<T> Slot<T> {
    pub(crate) fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns whether the value was applied.
    pub(crate) fn commit(&mut self, generation: u64, value: T) -> bool {
        if generation <= self.applied {
            return false;
        }
        self.applied = generation;
        self.value = value;
        true
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }
}

impl<T: Default> Slot<T> {
    /// Empty the slot and discard every response still in flight.
    pub(crate) fn reset(&mut self) {
        self.applied = self.issued;
        self.value = T::default();
    }
}

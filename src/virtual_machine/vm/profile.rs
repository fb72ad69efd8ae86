use crate::virtual_machine::isa::OpCategory;

/// Count of executed instructions per [`OpCategory`].
///
/// Backed by a flat array indexed by category discriminant so recording on
/// the hot path is a single add.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionProfile {
    counts: [u64; OpCategory::COUNT],
}

impl ExecutionProfile {
    /// Creates a new empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one executed instruction.
    #[inline(always)]
    pub fn record(&mut self, category: OpCategory) {
        let slot = &mut self.counts[category as usize];
        *slot = slot.saturating_add(1);
    }

    /// Returns the number of instructions executed in `category`.
    pub fn count(&self, category: OpCategory) -> u64 {
        self.counts[category as usize]
    }

    /// Returns the total number of executed instructions.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// Returns an iterator over all categories and their counts.
    pub fn iter(&self) -> impl Iterator<Item = (OpCategory, u64)> {
        OpCategory::ALL.into_iter().zip(self.counts)
    }
}

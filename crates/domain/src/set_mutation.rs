use std::collections::BTreeSet;

use tenantry_core::{AppError, AppResult};

/// Add/remove request against an identifier set.
///
/// Applying a mutation adds every `add` member first and then removes every
/// `remove` member, so an identifier present in both ends up absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMutation<T: Ord> {
    add: BTreeSet<T>,
    remove: BTreeSet<T>,
}

impl<T: Ord + Clone> SetMutation<T> {
    /// Builds a mutation, rejecting requests with nothing to change.
    pub fn new(
        add: impl IntoIterator<Item = T>,
        remove: impl IntoIterator<Item = T>,
    ) -> AppResult<Self> {
        let add: BTreeSet<T> = add.into_iter().collect();
        let remove: BTreeSet<T> = remove.into_iter().collect();

        if add.is_empty() && remove.is_empty() {
            return Err(AppError::Validation("nothing to update".to_owned()));
        }

        Ok(Self { add, remove })
    }

    /// Identifiers to insert.
    #[must_use]
    pub fn add(&self) -> &BTreeSet<T> {
        &self.add
    }

    /// Identifiers to drop.
    #[must_use]
    pub fn remove(&self) -> &BTreeSet<T> {
        &self.remove
    }

    /// Every identifier the mutation references, deduplicated.
    #[must_use]
    pub fn referenced(&self) -> BTreeSet<T> {
        self.add.union(&self.remove).cloned().collect()
    }

    /// Applies the mutation to a stored set.
    pub fn apply_to(&self, target: &mut BTreeSet<T>) {
        target.extend(self.add.iter().cloned());
        target.retain(|value| !self.remove.contains(value));
    }
}

//! Per-atom visibility, in load order.

use crate::error::ViewerError;

/// One boolean per atom. Every mutator reports whether anything changed so
/// the view only emits `update_visibility` for real changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMask {
    visible: Vec<bool>,
}

impl VisibilityMask {
    /// All atoms visible.
    #[must_use]
    pub fn new(n_atoms: usize) -> Self {
        Self {
            visible: vec![true; n_atoms],
        }
    }

    /// Number of atoms covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    /// Whether the mask covers no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Whether atom `index` is shown. Out-of-range atoms are not.
    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    /// Ascending zero-based indices of shown atoms.
    #[must_use]
    pub fn visible_indices(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, &shown)| shown.then_some(i))
            .collect()
    }

    /// Hide every atom.
    pub fn hide_all(&mut self) -> bool {
        self.fill(false)
    }

    /// Show every atom.
    pub fn show_all(&mut self) -> bool {
        self.fill(true)
    }

    /// Hide the given atoms, leaving the rest untouched.
    pub fn hide(&mut self, indices: &[usize]) -> Result<bool, ViewerError> {
        self.set(indices, false)
    }

    /// Show the given atoms in addition to those already shown.
    pub fn show(&mut self, indices: &[usize]) -> Result<bool, ViewerError> {
        self.set(indices, true)
    }

    /// Show exactly the given atoms.
    pub fn isolate(&mut self, indices: &[usize]) -> Result<bool, ViewerError> {
        self.check(indices)?;
        let mut next = vec![false; self.visible.len()];
        for &i in indices {
            if let Some(slot) = next.get_mut(i) {
                *slot = true;
            }
        }
        let changed = next != self.visible;
        self.visible = next;
        Ok(changed)
    }

    fn fill(&mut self, value: bool) -> bool {
        let changed = self.visible.iter().any(|&v| v != value);
        self.visible.fill(value);
        changed
    }

    fn set(
        &mut self,
        indices: &[usize],
        value: bool,
    ) -> Result<bool, ViewerError> {
        self.check(indices)?;
        let mut changed = false;
        for &i in indices {
            if let Some(slot) = self.visible.get_mut(i) {
                changed |= *slot != value;
                *slot = value;
            }
        }
        Ok(changed)
    }

    /// Reject the whole batch before touching anything.
    fn check(&self, indices: &[usize]) -> Result<(), ViewerError> {
        let n = self.visible.len();
        match indices.iter().find(|&&i| i >= n) {
            Some(bad) => Err(ViewerError::validation(format!(
                "atom index {bad} out of range for {n} atoms"
            ))),
            None => Ok(()),
        }
    }
}

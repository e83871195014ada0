//! Selection-driven visibility for [`MolSysView`].

use super::MolSysView;
use crate::command::{Command, VisibilityOptions};
use crate::error::ViewerError;
use crate::mask::VisibilityMask;
use crate::molsys::Selection;
use crate::queue::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaskOp {
    Hide,
    Show,
    Isolate,
}

impl<T: Transport> MolSysView<T> {
    /// Hide the selected atoms. `all` hides everything.
    pub fn hide(&mut self, selection: &Selection) -> Result<(), ViewerError> {
        self.update_mask(selection, MaskOp::Hide)
    }

    /// Show the selected atoms in addition to the visible ones. `all`
    /// resets to fully visible.
    pub fn show(&mut self, selection: &Selection) -> Result<(), ViewerError> {
        self.update_mask(selection, MaskOp::Show)
    }

    /// Show only the selected atoms. `all` is the same as `show(all)`.
    pub fn isolate(
        &mut self,
        selection: &Selection,
    ) -> Result<(), ViewerError> {
        self.update_mask(selection, MaskOp::Isolate)
    }

    /// Visible atom indices, ascending, if a system is loaded.
    #[must_use]
    pub fn visible_atom_indices(&self) -> Option<Vec<usize>> {
        self.mask.as_ref().map(VisibilityMask::visible_indices)
    }

    /// Apply `op`, then send `update_visibility` if anything changed.
    fn update_mask(
        &mut self,
        selection: &Selection,
        op: MaskOp,
    ) -> Result<(), ViewerError> {
        let (Some(system), Some(mask)) =
            (self.system.as_deref(), self.mask.as_mut())
        else {
            return Err(ViewerError::NoSystemLoaded);
        };

        let changed = if selection.is_all() {
            match op {
                MaskOp::Hide => mask.hide_all(),
                MaskOp::Show | MaskOp::Isolate => mask.show_all(),
            }
        } else {
            let indices = selection.resolve(system, mask.len())?;
            match op {
                MaskOp::Hide => mask.hide(&indices)?,
                MaskOp::Show => mask.show(&indices)?,
                MaskOp::Isolate => mask.isolate(&indices)?,
            }
        };

        if !changed {
            log::debug!("{op:?} '{selection}' left visibility unchanged");
            return Ok(());
        }
        let visible_atom_indices = mask.visible_indices();
        log::debug!(
            "{op:?} '{selection}': {} of {} atoms visible",
            visible_atom_indices.len(),
            mask.len()
        );
        self.queue.send(&Command::UpdateVisibility {
            options: VisibilityOptions {
                visible_atom_indices,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::molsys::{StructureIndices, SystemSource};
    use crate::queue::RecordingTransport;

    fn loaded_view() -> MolSysView<RecordingTransport> {
        let mut view = MolSysView::new(RecordingTransport::new());
        view.load(
            &SystemSource::Document(json!({
                "atoms": {
                    "atom_id": [1, 2, 3, 4, 5],
                    "chain_id": ["A", "A", "B", "B", "C"],
                },
                "frames": [{ "positions": [[0, 0, 0], [1, 0, 0], [2, 0, 0],
                                            [3, 0, 0], [4, 0, 0]] }],
            })),
            &Selection::All,
            &StructureIndices::All,
            None,
        )
        .unwrap();
        let _ = view.on_ready();
        view
    }

    fn all() -> Selection {
        Selection::from("all")
    }

    fn last_visibility(view: &MolSysView<RecordingTransport>) -> Vec<usize> {
        let last = view.transport().messages.last().unwrap();
        assert_eq!(last["op"], json!("update_visibility"));
        serde_json::from_value(
            last["options"]["visible_atom_indices"].clone(),
        )
        .unwrap()
    }

    #[test]
    fn hide_all_then_show_all_restores_load_state() {
        let mut view = loaded_view();
        let loaded = view.visible_atom_indices();
        view.hide(&all()).unwrap();
        assert_eq!(view.visible_atom_indices(), Some(vec![]));
        view.show(&all()).unwrap();
        assert_eq!(view.visible_atom_indices(), loaded);
        assert_eq!(last_visibility(&view), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn isolate_then_isolate_all_is_full_reset() {
        let mut view = loaded_view();
        view.isolate(&Selection::from("chain_id B")).unwrap();
        assert_eq!(last_visibility(&view), vec![2, 3]);
        view.isolate(&all()).unwrap();
        assert_eq!(view.visible_atom_indices(), Some(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn show_adds_to_visible_atoms() {
        let mut view = loaded_view();
        view.hide(&all()).unwrap();
        view.show(&Selection::from("chain_id A")).unwrap();
        view.show(&Selection::from(vec![4])).unwrap();
        assert_eq!(last_visibility(&view), vec![0, 1, 4]);
    }

    #[test]
    fn hide_selection_keeps_the_rest() {
        let mut view = loaded_view();
        view.hide(&Selection::from("chain_id A C")).unwrap();
        assert_eq!(last_visibility(&view), vec![2, 3]);
    }

    #[test]
    fn unchanged_mask_sends_nothing() {
        let mut view = loaded_view();
        let before = view.transport().messages.len();
        view.show(&all()).unwrap();
        view.hide(&Selection::from("chain_id Z")).unwrap();
        assert_eq!(view.transport().messages.len(), before);
    }

    #[test]
    fn bad_selections_surface() {
        let mut view = loaded_view();
        let err = view.hide(&Selection::from(vec![5])).unwrap_err();
        assert!(matches!(err, ViewerError::Validation(_)));
        let err = view.hide(&Selection::from("bfactor 10")).unwrap_err();
        assert!(matches!(err, ViewerError::Conversion(_)));
        assert_eq!(view.visible_atom_indices(), Some(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn clear_all_requires_a_new_load() {
        let mut view = loaded_view();
        view.clear_all().unwrap();
        assert_eq!(view.visible_atom_indices(), None);
        let err = view.isolate(&all()).unwrap_err();
        assert!(matches!(err, ViewerError::NoSystemLoaded));
    }
}

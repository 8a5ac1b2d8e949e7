use crate::surface::MarkerHandle;

/// Tracks which marker, if any, has its popup open.
pub struct SelectionState {
    pub marker: Option<MarkerHandle>,
}

impl SelectionState {
    pub fn new() -> SelectionState {
        Self { marker: None }
    }

    /// If the provided marker is already selected, it will be deselected.
    /// Otherwise, it will be selected.
    pub fn toggle_marker(&mut self, marker: MarkerHandle) {
        if self.marker == Some(marker) {
            self.marker = None;
        } else {
            self.marker = Some(marker);
        }
    }
}

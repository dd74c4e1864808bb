// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Artwork, ArtworkId};

/// Immutable snapshot of the visible ordering, taken when one row is opened.
/// Carries only identifiers and a position across the view boundary; the
/// detail view re-fetches full records by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCapture {
    pub ids: Vec<ArtworkId>,
    pub current_index: usize,
}

impl NavigationCapture {
    /// Capture the visible sequence at the moment row `index` is opened.
    /// Returns None when the index is out of bounds.
    pub fn from_visible(visible: &[Artwork], index: usize) -> Option<Self> {
        if index >= visible.len() {
            return None;
        }
        Some(Self {
            ids: visible.iter().map(|row| row.id).collect(),
            current_index: index,
        })
    }

    pub fn current_id(&self) -> Option<ArtworkId> {
        self.ids.get(self.current_index).copied()
    }

    pub fn prev_id(&self) -> Option<ArtworkId> {
        if self.current_index == 0 {
            return None;
        }
        self.ids.get(self.current_index - 1).copied()
    }

    pub fn next_id(&self) -> Option<ArtworkId> {
        if self.current_index + 1 >= self.ids.len() {
            return None;
        }
        self.ids.get(self.current_index + 1).copied()
    }

    /// Re-issue a capture pointing at `target`, re-locating it in the same
    /// id list rather than incrementing the index, so chained prev/next stays
    /// consistent. Returns None when the target is not in the capture.
    pub fn advance_to(&self, target: ArtworkId) -> Option<Self> {
        let index = self.ids.iter().position(|id| *id == target)?;
        Some(Self {
            ids: self.ids.clone(),
            current_index: index,
        })
    }
}

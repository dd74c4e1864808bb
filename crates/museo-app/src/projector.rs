// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Artwork, SortDir, SortKey};

/// Live filter/sort controls for the browse view. Owned by the view, reset on
/// mount, never persisted across navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseControls {
    pub query: String,
    pub department: String,
    pub with_image_only: bool,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
}

impl Default for BrowseControls {
    fn default() -> Self {
        Self {
            query: String::new(),
            department: String::new(),
            with_image_only: true,
            sort_key: SortKey::Title,
            sort_dir: SortDir::Asc,
        }
    }
}

/// Distinct non-empty departments present in the working set, sorted
/// case-insensitively. Recomputed whenever the working set is replaced; a
/// selected department missing from the new set simply matches nothing.
pub fn department_options(rows: &[Artwork]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for row in rows {
        if !row.department.is_empty() && !options.contains(&row.department) {
            options.push(row.department.clone());
        }
    }
    options.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    options
}

/// Derive the visible ordered sequence from the working set and the current
/// controls. Pure: identical inputs always produce identical output.
pub fn visible_sequence(rows: &[Artwork], controls: &BrowseControls) -> Vec<Artwork> {
    let query = controls.query.trim().to_lowercase();

    let mut out: Vec<Artwork> = rows
        .iter()
        .filter(|row| {
            query.is_empty()
                || row.title.to_lowercase().contains(&query)
                || row.artist.to_lowercase().contains(&query)
        })
        .filter(|row| controls.department.is_empty() || row.department == controls.department)
        .filter(|row| !controls.with_image_only || row.has_image)
        .cloned()
        .collect();

    // sort_by is stable, so equal keys keep working-set order either direction
    out.sort_by(|a, b| {
        let left = sort_field(a, controls.sort_key).to_lowercase();
        let right = sort_field(b, controls.sort_key).to_lowercase();
        let ordering = left.cmp(&right);
        match controls.sort_dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });

    out
}

// `date` is the API's free-text display string; sorting it is lexicographic
// on purpose, not chronological.
fn sort_field(artwork: &Artwork, key: SortKey) -> &str {
    match key {
        SortKey::Title => &artwork.title,
        SortKey::Date => &artwork.date,
    }
}

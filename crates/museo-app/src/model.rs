// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// Title shown when the remote record has none.
pub const UNTITLED: &str = "Untitled";
/// Artist shown when the remote record has none.
pub const UNKNOWN_ARTIST: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtworkId(i64);

impl ArtworkId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ArtworkId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Normalized card/detail record. `has_image` is the single source of truth
/// for image presence; `image_url` always agrees with it (placeholder iff
/// `has_image` is false).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    pub artist: String,
    pub date: String,
    pub department: String,
    pub medium: String,
    pub image_url: String,
    pub has_image: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Title,
    Date,
}

impl SortKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Title => Self::Date,
            Self::Date => Self::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use museo_app::{Artwork, ArtworkId};
use museo_catalog::{CARD_IMAGE_WIDTH, DEFAULT_IIIF_BASE_URL, image_url};

pub fn artwork(
    id: i64,
    title: &str,
    artist: &str,
    date: &str,
    department: &str,
    medium: &str,
    image_id: Option<&str>,
) -> Artwork {
    Artwork {
        id: ArtworkId::new(id),
        title: title.to_owned(),
        artist: artist.to_owned(),
        date: date.to_owned(),
        department: department.to_owned(),
        medium: medium.to_owned(),
        image_url: image_url(DEFAULT_IIIF_BASE_URL, image_id, CARD_IMAGE_WIDTH),
        has_image: image_id.is_some_and(|image_id| !image_id.is_empty()),
    }
}

/// Fixture catalog used by tests and the offline launch mode. Twelve
/// well-known works plus two records without images so the image filter has
/// something to exclude.
pub fn sample_artworks() -> Vec<Artwork> {
    vec![
        artwork(1, "The Bedroom", "Vincent van Gogh", "1889", "European Painting", "Oil on canvas", Some("aic-1")),
        artwork(2, "Self-Portrait", "Vincent van Gogh", "1887", "European Painting", "Oil on canvas", Some("aic-2")),
        artwork(3, "Water Lilies", "Claude Monet", "1906", "European Painting", "Oil on canvas", Some("aic-3")),
        artwork(4, "American Gothic", "Grant Wood", "1930", "American Art", "Oil on beaverboard", Some("aic-4")),
        artwork(5, "Untitled (Film Still)", "Cindy Sherman", "1979", "Photography", "Gelatin silver print", Some("aic-5")),
        artwork(6, "The Old Guitarist", "Pablo Picasso", "1903", "European Painting", "Oil on panel", Some("aic-6")),
        artwork(7, "Nighthawks", "Edward Hopper", "1942", "American Art", "Oil on canvas", Some("aic-7")),
        artwork(8, "The Banjo Lesson", "Henry Ossawa Tanner", "1893", "American Art", "Oil on canvas", Some("aic-8")),
        artwork(9, "Broadway Boogie Woogie", "Piet Mondrian", "1943", "Modern Art", "Oil on canvas", Some("aic-9")),
        artwork(10, "Campbell's Soup Cans", "Andy Warhol", "1962", "Modern Art", "Synthetic polymer paint", Some("aic-10")),
        artwork(11, "Dunes", "Ansel Adams", "1948", "Photography", "Gelatin silver print", Some("aic-11")),
        artwork(12, "The Great Wave", "Katsushika Hokusai", "1831", "Prints & Drawings", "Woodblock print", Some("aic-12")),
        artwork(13, "Study for a Mural", "Unknown", "", "Modern Art", "Graphite on paper", None),
        artwork(14, "Untitled", "—", "c. 1950", "", "", None),
    ]
}

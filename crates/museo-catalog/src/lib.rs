// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use museo_app::{Artwork, ArtworkId, UNKNOWN_ARTIST, UNTITLED};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";
pub const DEFAULT_IIIF_BASE_URL: &str = "https://www.artic.edu/iiif/2";

/// Shared fallback for records without a real image. `Artwork::image_url`
/// equals this constant exactly when `has_image` is false.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/1/14/No_Image_Available.jpg";

pub const FIELDS: &str = "id,title,artist_display,date_display,department_title,medium_display,image_id,is_public_domain,thumbnail";

pub const CARD_IMAGE_WIDTH: u32 = 800;
pub const PAGE_SIZE: u32 = 40;
/// Pages 1..=PREFETCH_PAGES are merged into one working set per load cycle.
pub const PREFETCH_PAGES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawArtwork {
    pub id: i64,
    pub title: Option<String>,
    pub artist_display: Option<String>,
    pub date_display: Option<String>,
    pub department_title: Option<String>,
    pub medium_display: Option<String>,
    pub image_id: Option<String>,
    pub is_public_domain: Option<bool>,
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Thumbnail {
    pub lqip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pagination {
    pub total: Option<i64>,
    pub current_page: Option<i64>,
    pub total_pages: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListResponse {
    pub data: Vec<RawArtwork>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct DetailResponse {
    data: Option<RawArtwork>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    iiif_base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, iiif_base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("catalog.base_url must not be empty");
        }
        let iiif_base_url = iiif_base_url.trim_end_matches('/').to_owned();
        if iiif_base_url.is_empty() {
            bail!("catalog.iiif_base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            iiif_base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn iiif_base_url(&self) -> &str {
        &self.iiif_base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch one unfiltered page of the catalog.
    pub fn browse(&self, page: u32, limit: u32) -> Result<ListResponse> {
        let url = format!(
            "{}/artworks?fields={}&page={}&limit={}",
            self.base_url, FIELDS, page, limit
        );
        self.get_list(&url)
    }

    /// Fetch one page of free-text search results.
    pub fn search(&self, query: &str, page: u32, limit: u32) -> Result<ListResponse> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let url = format!(
            "{}/artworks/search?q={}&fields={}&page={}&limit={}",
            self.base_url, encoded, FIELDS, page, limit
        );
        self.get_list(&url)
    }

    /// Fetch a single record. A missing record is absence, not an error.
    pub fn fetch_one(&self, id: ArtworkId) -> Result<Option<RawArtwork>> {
        let url = format!("{}/artworks/{}?fields={}", self.base_url, id.get(), FIELDS);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            bail!("catalog returned {}", status.as_u16());
        }

        let parsed: DetailResponse = response.json().context("decode artwork detail")?;
        Ok(parsed.data)
    }

    /// Map a raw record to the normalized shape. Pure aside from reading the
    /// configured IIIF base.
    pub fn normalize(&self, raw: &RawArtwork) -> Artwork {
        let has_image = raw
            .image_id
            .as_deref()
            .is_some_and(|image_id| !image_id.is_empty());
        Artwork {
            id: ArtworkId::new(raw.id),
            title: raw
                .title
                .clone()
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| UNTITLED.to_owned()),
            artist: raw
                .artist_display
                .clone()
                .filter(|artist| !artist.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_owned()),
            date: raw.date_display.clone().unwrap_or_default(),
            department: raw.department_title.clone().unwrap_or_default(),
            medium: raw.medium_display.clone().unwrap_or_default(),
            image_url: image_url(&self.iiif_base_url, raw.image_id.as_deref(), CARD_IMAGE_WIDTH),
            has_image,
        }
    }

    /// One load cycle's worth of data: pages 1..=PREFETCH_PAGES fetched
    /// sequentially (so accumulator order is page order), merged, normalized.
    /// Any page failure abandons the rest of the cycle.
    pub fn collect_working_set(&self, query: &str) -> Result<Vec<Artwork>> {
        let mut raw: Vec<RawArtwork> = Vec::new();
        for page in 1..=PREFETCH_PAGES {
            let response = if query.is_empty() {
                self.browse(page, PAGE_SIZE)
            } else {
                self.search(query, page, PAGE_SIZE)
            }
            .with_context(|| format!("fetch catalog page {page}"))?;
            raw.extend(response.data);
        }
        Ok(raw.iter().map(|record| self.normalize(record)).collect())
    }

    fn get_list(&self, url: &str) -> Result<ListResponse> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            bail!("catalog returned {}", status.as_u16());
        }

        response.json().context("decode artwork list")
    }
}

/// IIIF display URL for an image id at the given pixel width, or the shared
/// placeholder when the id is absent.
pub fn image_url(iiif_base_url: &str, image_id: Option<&str>, width: u32) -> String {
    match image_id {
        Some(image_id) if !image_id.is_empty() => {
            format!("{iiif_base_url}/{image_id}/full/{width},/0/default.jpg")
        }
        _ => PLACEHOLDER_IMAGE_URL.to_owned(),
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!("cannot reach catalog at {} ({})", base_url, error)
}

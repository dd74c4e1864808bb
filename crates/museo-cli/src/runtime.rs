// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use museo_app::{Artwork, ArtworkId};
use museo_catalog::Client;
use museo_tui::{CatalogRuntime, DetailFetchEvent, InternalEvent, LoadCycleEvent};
use std::sync::mpsc::Sender;
use std::thread;

/// Runtime backed by the live catalog API. Each spawn hook moves the blocking
/// request onto a short-lived worker thread and reports back over the internal
/// channel; the event loop drops any response whose request id was superseded.
pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl CatalogRuntime for HttpRuntime {
    fn load_working_set(&mut self, query: &str) -> Result<Vec<Artwork>> {
        self.client.collect_working_set(query)
    }

    fn fetch_artwork(&mut self, id: ArtworkId) -> Result<Option<Artwork>> {
        Ok(self
            .client
            .fetch_one(id)?
            .map(|raw| self.client.normalize(&raw)))
    }

    fn spawn_load_cycle(
        &mut self,
        request_id: u64,
        query: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let query = query.to_owned();
        thread::spawn(move || {
            let event = match client.collect_working_set(&query) {
                Ok(rows) => LoadCycleEvent::Completed { request_id, rows },
                Err(_) => LoadCycleEvent::Failed { request_id },
            };
            let _ = tx.send(InternalEvent::LoadCycle(event));
        });
        Ok(())
    }

    fn spawn_detail_fetch(
        &mut self,
        request_id: u64,
        id: ArtworkId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let event = match client.fetch_one(id) {
                Ok(raw) => DetailFetchEvent::Loaded {
                    request_id,
                    artwork: Box::new(raw.map(|raw| client.normalize(&raw))),
                },
                Err(_) => DetailFetchEvent::Failed { request_id },
            };
            let _ = tx.send(InternalEvent::DetailFetch(event));
        });
        Ok(())
    }
}

/// Runtime over the bundled fixture catalog for `--offline`. Everything is
/// in memory, so the default synchronous spawn hooks are fine.
pub struct OfflineRuntime {
    rows: Vec<Artwork>,
}

impl OfflineRuntime {
    pub fn new() -> Self {
        Self {
            rows: museo_testkit::sample_artworks(),
        }
    }
}

impl Default for OfflineRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogRuntime for OfflineRuntime {
    fn load_working_set(&mut self, query: &str) -> Result<Vec<Artwork>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(self.rows.clone());
        }
        Ok(self
            .rows
            .iter()
            .filter(|row| {
                row.title.to_lowercase().contains(&needle)
                    || row.artist.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn fetch_artwork(&mut self, id: ArtworkId) -> Result<Option<Artwork>> {
        Ok(self.rows.iter().find(|row| row.id == id).cloned())
    }
}

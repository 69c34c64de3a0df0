/// Portrait module
///
/// This module handles:
/// - Building primary and placeholder URLs (resolver.rs)
/// - Downloading and validating images (fetch.rs)
/// - Per-portrait load state and an in-memory image cache (here)

pub mod fetch;
pub mod resolver;

use std::collections::HashMap;

use iced::widget::image::Handle;
use tracing::{debug, warn};

use crate::state::data::{Actor, ActorId, Role};
use fetch::FetchError;
use resolver::{ImageResolver, PortraitSize, PortraitState};

/// Where a portrait is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortraitSlot {
    /// The big card for a role on the main view
    Card(Role),
    /// A row of the roster overlay
    Roster(ActorId),
}

/// Loaded images by URL, kept for the process lifetime
#[derive(Debug, Default)]
pub struct PortraitCache {
    images: HashMap<String, Handle>,
}

impl PortraitCache {
    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.images.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.images.insert(url, handle);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
}

/// A download for one render of a portrait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortraitRequest {
    pub generation: u64,
    pub url: String,
}

/// One rendered portrait: its image state plus the loaded image
#[derive(Debug, Clone)]
pub struct Portrait {
    state: PortraitState,
    image: Option<Handle>,
}

impl Portrait {
    pub fn new(size: PortraitSize) -> Self {
        Self {
            state: PortraitState::new(size),
            image: None,
        }
    }

    /// Show `subject`; returns the download still needed, if any
    pub fn show(
        &mut self,
        subject: Option<(ActorId, &Actor)>,
        resolver: &ImageResolver,
        cache: &PortraitCache,
    ) -> Option<PortraitRequest> {
        if subject.map(|(id, _)| id) == self.state.subject() {
            return None;
        }
        self.image = None;
        let url = self.state.show(subject, resolver)?.to_string();
        self.take_cached(url, cache)
    }

    /// A download finished.
    ///
    /// Results from an earlier render, or for a URL no longer shown, are
    /// dropped. The first failure of a render returns the placeholder
    /// download; later failures are absorbed.
    pub fn loaded(
        &mut self,
        request: &PortraitRequest,
        result: Result<Handle, FetchError>,
        cache: &mut PortraitCache,
    ) -> Option<PortraitRequest> {
        let url = request.url.as_str();
        if request.generation != self.state.generation() || self.state.current_url() != Some(url) {
            debug!(url, "dropping stale portrait");
            return None;
        }

        match result {
            Ok(handle) => {
                cache.insert(request.url.clone(), handle.clone());
                self.image = Some(handle);
                None
            }
            Err(err) if self.state.has_fallen_back() => {
                debug!(url, %err, "placeholder failed too");
                None
            }
            Err(err) => {
                let fallback = self.state.on_load_failure()?.to_string();
                warn!(url, %err, "portrait failed, using placeholder");
                self.take_cached(fallback, cache)
            }
        }
    }

    pub fn image(&self) -> Option<&Handle> {
        self.image.as_ref()
    }

    pub fn state(&self) -> &PortraitState {
        &self.state
    }

    fn take_cached(&mut self, url: String, cache: &PortraitCache) -> Option<PortraitRequest> {
        match cache.get(&url) {
            Some(handle) => {
                self.image = Some(handle.clone());
                None
            }
            None => Some(PortraitRequest {
                generation: self.state.generation(),
                url,
            }),
        }
    }
}

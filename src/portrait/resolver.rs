/// Portrait URL resolution
///
/// Every actor gets a primary URL from a thumbnail search endpoint and,
/// if that fails to load, exactly one generated placeholder URL.

use thiserror::Error;
use url::Url;

use crate::state::config::PortraitConfig;
use crate::state::data::{Actor, ActorId};

/// Search thumbnail dimensions (3:4-ish, portrait orientation)
const SEARCH_WIDTH: u32 = 400;
const SEARCH_HEIGHT: u32 = 550;

#[derive(Debug, Error)]
#[error("invalid portrait endpoint {endpoint:?}: {source}")]
pub struct ResolveError {
    endpoint: String,
    #[source]
    source: url::ParseError,
}

/// Rendered size of a portrait, which shapes the placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortraitSize {
    /// Large card on the main view
    Card,
    /// Small round thumbnail in the roster
    Thumbnail,
}

impl PortraitSize {
    fn placeholder_params(self) -> (&'static str, &'static str) {
        match self {
            PortraitSize::Card => ("400", "0.33"),
            PortraitSize::Thumbnail => ("64", "0.4"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    search: Url,
    fallback: Url,
    query_suffix: String,
}

impl ImageResolver {
    pub fn new(config: &PortraitConfig) -> Result<Self, ResolveError> {
        let parse = |endpoint: &str| {
            Url::parse(endpoint).map_err(|source| ResolveError {
                endpoint: endpoint.to_string(),
                source,
            })
        };

        Ok(Self {
            search: parse(&config.search_endpoint)?,
            fallback: parse(&config.fallback_endpoint)?,
            query_suffix: config.query_suffix.clone(),
        })
    }

    /// Primary portrait URL. Pure: only builds the reference.
    pub fn resolve(&self, actor: &Actor) -> String {
        let query = if self.query_suffix.is_empty() {
            actor.photo_query().to_string()
        } else {
            format!("{} {}", actor.photo_query(), self.query_suffix)
        };

        let mut url = self.search.clone();
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("w", &SEARCH_WIDTH.to_string())
            .append_pair("h", &SEARCH_HEIGHT.to_string())
            // smart crop, focused on faces
            .append_pair("c", "7")
            .append_pair("rs", "1")
            .append_pair("p", "0");
        url.into()
    }

    /// Generated avatar with the actor's name on the role accent color
    pub fn fallback(&self, actor: &Actor, size: PortraitSize) -> String {
        let (pixels, font_size) = size.placeholder_params();

        let mut url = self.fallback.clone();
        url.query_pairs_mut()
            .append_pair("name", &actor.name)
            .append_pair("background", actor.role.accent_hex())
            .append_pair("color", "fff")
            .append_pair("size", pixels)
            .append_pair("font-size", font_size)
            .append_pair("bold", "true");
        url.into()
    }
}

/// Image state of one rendered portrait.
///
/// Tracks which actor is shown, the URL currently displayed and whether
/// the single allowed fallback has been used.
#[derive(Debug, Clone)]
pub struct PortraitState {
    size: PortraitSize,
    subject: Option<ActorId>,
    current_url: Option<String>,
    fallback_url: Option<String>,
    has_fallen_back: bool,
    /// Bumped on every reset; downloads started for an older value are stale
    generation: u64,
}

impl PortraitState {
    pub fn new(size: PortraitSize) -> Self {
        Self {
            size,
            subject: None,
            current_url: None,
            fallback_url: None,
            has_fallen_back: false,
            generation: 0,
        }
    }

    /// Point this portrait at `subject` (or at nothing).
    ///
    /// Resets as if freshly created when the identity changes and returns
    /// the URL to load. Returns `None` if nothing changed or there is
    /// nothing to show.
    pub fn show(
        &mut self,
        subject: Option<(ActorId, &Actor)>,
        resolver: &ImageResolver,
    ) -> Option<&str> {
        let id = subject.map(|(id, _)| id);
        if id == self.subject {
            return None;
        }

        let generation = self.generation + 1;
        *self = Self::new(self.size);
        self.generation = generation;
        let (id, actor) = subject?;
        self.subject = Some(id);
        self.current_url = Some(resolver.resolve(actor));
        self.fallback_url = Some(resolver.fallback(actor, self.size));
        self.current_url.as_deref()
    }

    /// The current URL failed to load.
    ///
    /// The first failure switches to the placeholder and returns its URL.
    /// Later failures change nothing and return that same URL again.
    pub fn on_load_failure(&mut self) -> Option<&str> {
        if self.has_fallen_back || self.subject.is_none() {
            return self.current_url.as_deref();
        }
        self.has_fallen_back = true;
        self.current_url = self.fallback_url.take();
        self.current_url.as_deref()
    }

    pub fn subject(&self) -> Option<ActorId> {
        self.subject
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn has_fallen_back(&self) -> bool {
        self.has_fallen_back
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod portrait;
mod state;
mod ui;

use portrait::fetch::{FetchError, PortraitFetcher};
use portrait::resolver::{ImageResolver, PortraitSize, ResolveError};
use portrait::{Portrait, PortraitCache, PortraitRequest, PortraitSlot};
use state::catalog::{ActorCatalog, CatalogError};
use state::config::AppConfig;
use state::data::{ActorId, Role};
use state::pairing::{DrawTicket, PairingError, PairingSelector, SelectionPhase};
use ui::roster::RosterOverlay;

/// Shown when a role has nobody to draw from
const NO_CANDIDATES_NOTICE: &str = "Insufficient data to generate a pair.";

/// Errors that stop the application from starting
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("failed to build HTTP client: {0}")]
    Fetch(#[from] FetchError),
    #[error("ui failed: {0}")]
    Ui(#[from] iced::Error),
}

/// Main application state
struct PairingApp {
    catalog: Arc<ActorCatalog>,
    /// The two selection slots and the draw phase
    selector: PairingSelector,
    resolver: ImageResolver,
    fetcher: PortraitFetcher,
    cache: PortraitCache,
    settle_delay: Duration,
    alpha_card: Portrait,
    omega_card: Portrait,
    roster: RosterOverlay,
    /// User-visible, dismissible notice
    notice: Option<&'static str>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Random" button
    RandomizePressed,
    /// The settle delay of a draw elapsed
    DrawSettled(DrawTicket),
    OpenRoster,
    CloseRoster,
    /// User clicked an actor in the roster
    SelectActor(ActorId),
    /// A portrait download finished
    PortraitLoaded {
        slot: PortraitSlot,
        request: PortraitRequest,
        result: Result<Handle, FetchError>,
    },
    DismissNotice,
}

impl PairingApp {
    fn new(
        catalog: Arc<ActorCatalog>,
        resolver: ImageResolver,
        fetcher: PortraitFetcher,
        settle_delay: Duration,
    ) -> Self {
        Self {
            selector: PairingSelector::new(catalog.clone()),
            roster: RosterOverlay::new(&catalog),
            catalog,
            resolver,
            fetcher,
            cache: PortraitCache::default(),
            settle_delay,
            alpha_card: Portrait::new(PortraitSize::Card),
            omega_card: Portrait::new(PortraitSize::Card),
            notice: None,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::RandomizePressed => match self.selector.begin_random() {
                Ok(ticket) => {
                    self.notice = None;
                    let settle = Task::perform(tokio::time::sleep(self.settle_delay), move |_| {
                        Message::DrawSettled(ticket)
                    });
                    Task::batch([self.sync_cards(), settle])
                }
                Err(err @ PairingError::NoCandidates { .. }) => {
                    warn!(%err, "cannot draw a pairing");
                    self.notice = Some(NO_CANDIDATES_NOTICE);
                    Task::none()
                }
                Err(err) => {
                    debug!(%err, "randomize ignored");
                    Task::none()
                }
            },
            Message::DrawSettled(ticket) => {
                match self.selector.finish_random(ticket, &mut rand::rng()) {
                    Ok(_) => self.sync_cards(),
                    Err(err) => {
                        debug!(%err, "draw not applied");
                        Task::none()
                    }
                }
            }
            Message::OpenRoster => {
                let downloads = self.roster.open(&self.catalog, &self.resolver, &self.cache);
                debug!(count = downloads.len(), "roster opened");
                Task::batch(
                    downloads
                        .into_iter()
                        .map(|(slot, request)| self.fetch(slot, request)),
                )
            }
            Message::CloseRoster => {
                self.roster.close();
                Task::none()
            }
            Message::SelectActor(id) => {
                if let Err(err) = self.selector.select_manual(id) {
                    warn!(%err, "selection rejected");
                }
                self.sync_cards()
            }
            Message::PortraitLoaded {
                slot,
                request,
                result,
            } => {
                let portrait = match slot {
                    PortraitSlot::Card(Role::Alpha) => Some(&mut self.alpha_card),
                    PortraitSlot::Card(Role::Omega) => Some(&mut self.omega_card),
                    PortraitSlot::Roster(id) => self.roster.portrait_mut(id),
                };
                let Some(portrait) = portrait else {
                    return Task::none();
                };

                match portrait.loaded(&request, result, &mut self.cache) {
                    Some(fallback) => self.fetch(slot, fallback),
                    None => {
                        debug!(cached = self.cache.len(), "portrait settled");
                        Task::none()
                    }
                }
            }
            Message::DismissNotice => {
                self.notice = None;
                Task::none()
            }
        }
    }

    /// Point both cards at the current selection, downloading what changed
    fn sync_cards(&mut self) -> Task<Message> {
        let mut downloads = Vec::new();
        for role in Role::ALL {
            let subject = self
                .selector
                .selected_id(role)
                .and_then(|id| self.catalog.get(id).map(|actor| (id, actor)));
            let card = match role {
                Role::Alpha => &mut self.alpha_card,
                Role::Omega => &mut self.omega_card,
            };
            if let Some(request) = card.show(subject, &self.resolver, &self.cache) {
                downloads.push((PortraitSlot::Card(role), request));
            }
        }

        Task::batch(
            downloads
                .into_iter()
                .map(|(slot, request)| self.fetch(slot, request)),
        )
    }

    /// Download one portrait; the result carries the render it was for
    fn fetch(&self, slot: PortraitSlot, request: PortraitRequest) -> Task<Message> {
        let fetcher = self.fetcher.clone();
        Task::perform(fetcher.fetch(request.url.clone()), move |result| {
            Message::PortraitLoaded {
                slot,
                request: request.clone(),
                result,
            }
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let randomizing = self.selector.phase() == SelectionPhase::Randomizing;
        let complete = self.selector.is_complete();

        let header = column![
            text("社群标签驱动 CP 生成器").size(40),
            text("Social Tag-Driven Pairing Generator").size(18).color(ui::MUTED),
        ]
        .spacing(8)
        .align_x(Alignment::Center);

        let heart = column![
            text(if complete { "♥" } else { "♡" })
                .size(56)
                .color(if complete { ui::MATCH_PINK } else { ui::MUTED }),
            text(if complete { "MATCHED" } else { " " })
                .size(14)
                .color(ui::MATCH_PINK),
        ]
        .spacing(4)
        .align_x(Alignment::Center);

        let cards = row![
            ui::card::view(
                Role::Alpha,
                self.selector.selected(Role::Alpha),
                &self.alpha_card,
                randomizing,
            ),
            heart,
            ui::card::view(
                Role::Omega,
                self.selector.selected(Role::Omega),
                &self.omega_card,
                randomizing,
            ),
        ]
        .spacing(32)
        .align_y(Alignment::Center);

        let controls = row![
            button(text("名册 (Roster)").size(18))
                .padding([12, 24])
                .style(button::secondary)
                .on_press_maybe((!randomizing).then_some(Message::OpenRoster)),
            button(
                text(if randomizing { "正在匹配..." } else { "随机拉郎 (Random)" }).size(18)
            )
            .padding([12, 32])
            .style(button::primary)
            .on_press_maybe((!randomizing).then_some(Message::RandomizePressed)),
        ]
        .spacing(16);

        let notice = self.notice.map(|notice| {
            container(
                row![
                    text(notice),
                    button(text("✕")).on_press(Message::DismissNotice).style(button::text),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            )
            .padding([8, 16])
            .style(container::rounded_box)
        });

        let footer = column![
            text("Data is loaded locally based on predefined role types.")
                .size(13)
                .color(ui::MUTED),
            text(format!("© {} CP Generator. Just for fun.", Local::now().year()))
                .size(13)
                .color(ui::MUTED),
        ]
        .spacing(6)
        .align_x(Alignment::Center);

        let content: Column<Message> = column![header, cards, controls]
            .push_maybe(notice)
            .push(footer)
            .spacing(32)
            .padding(40)
            .align_x(Alignment::Center);

        let base = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill);

        if self.roster.is_open() {
            ui::modal(base, self.roster.view(&self.selector), Message::CloseRoster)
        } else {
            base.into()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::load_or_create() {
        Ok((config, path)) => {
            info!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            warn!(%err, "config unavailable, using defaults");
            AppConfig::default()
        }
    };

    let catalog = match &config.catalog_path {
        Some(path) => ActorCatalog::from_path(path)?,
        None => ActorCatalog::bundled()?,
    };
    let resolver = ImageResolver::new(&config.portrait)?;
    let fetcher = PortraitFetcher::new(&config.portrait)?;

    info!(actors = catalog.len(), "pairing generator initialized");
    let app = PairingApp::new(Arc::new(catalog), resolver, fetcher, config.settle_delay());

    iced::application("CP Generator", PairingApp::update, PairingApp::view)
        .theme(PairingApp::theme)
        .centered()
        .run_with(move || (app, Task::none()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::config::PortraitConfig;
    use crate::state::data::Actor;

    fn actor(name: &str, role: Role) -> Actor {
        Actor {
            name: name.to_string(),
            photo_query: None,
            tags: vec![],
            role,
        }
    }

    fn app(master: Vec<Actor>) -> PairingApp {
        let config = PortraitConfig::default();
        PairingApp::new(
            Arc::new(ActorCatalog::partition(master)),
            ImageResolver::new(&config).unwrap(),
            PortraitFetcher::new(&config).unwrap(),
            Duration::ZERO,
        )
    }

    /// The download a card is currently waiting on
    fn current_request(card: &Portrait) -> PortraitRequest {
        PortraitRequest {
            generation: card.state().generation(),
            url: card.state().current_url().unwrap().to_string(),
        }
    }

    #[tokio::test]
    async fn test_randomize_without_candidates_shows_notice() {
        let mut app = app(vec![actor("Carol", Role::Omega)]);
        let carol = ActorId::new(Role::Omega, 0);

        let _ = app.update(Message::SelectActor(carol));
        assert_eq!(app.omega_card.state().subject(), Some(carol));

        let _ = app.update(Message::RandomizePressed);
        assert_eq!(app.notice, Some(NO_CANDIDATES_NOTICE));
        assert_eq!(app.selector.phase(), SelectionPhase::Idle);
        assert_eq!(app.selector.selected_id(Role::Omega), Some(carol));
        assert_eq!(app.omega_card.state().subject(), Some(carol));
        assert!(app.alpha_card.state().subject().is_none());

        let _ = app.update(Message::DismissNotice);
        assert!(app.notice.is_none());
    }

    #[tokio::test]
    async fn test_settled_draw_updates_both_cards() {
        let mut app = app(vec![
            actor("Alice", Role::Alpha),
            actor("Bob", Role::Alpha),
            actor("Carol", Role::Omega),
        ]);

        let _ = app.update(Message::SelectActor(ActorId::new(Role::Alpha, 1)));
        let _ = app.update(Message::RandomizePressed);
        assert_eq!(app.selector.phase(), SelectionPhase::Randomizing);
        assert!(app.alpha_card.state().subject().is_none());
        assert!(app.omega_card.state().subject().is_none());

        let ticket = app.selector.pending_draw().unwrap();
        let _ = app.update(Message::DrawSettled(ticket));
        assert_eq!(app.selector.phase(), SelectionPhase::Idle);
        assert!(app.selector.is_complete());
        for (role, card) in [(Role::Alpha, &app.alpha_card), (Role::Omega, &app.omega_card)] {
            assert!(card.state().subject().is_some());
            assert_eq!(card.state().subject(), app.selector.selected_id(role));
        }
    }

    #[tokio::test]
    async fn test_randomize_during_draw_is_ignored() {
        let mut app = app(vec![actor("Alice", Role::Alpha), actor("Carol", Role::Omega)]);

        let _ = app.update(Message::RandomizePressed);
        let ticket = app.selector.pending_draw().unwrap();

        let _ = app.update(Message::RandomizePressed);
        assert_eq!(app.selector.pending_draw(), Some(ticket));
        assert!(app.notice.is_none());

        // A second settle of the same draw is stale
        let _ = app.update(Message::DrawSettled(ticket));
        let _ = app.update(Message::DrawSettled(ticket));
        assert_eq!(app.selector.phase(), SelectionPhase::Idle);
    }

    #[tokio::test]
    async fn test_redrawn_actor_ignores_earlier_download() {
        let mut app = app(vec![actor("Alice", Role::Alpha), actor("Carol", Role::Omega)]);
        let alice = ActorId::new(Role::Alpha, 0);

        let _ = app.update(Message::SelectActor(alice));
        let earlier = current_request(&app.alpha_card);

        // The only Alpha candidate is drawn again
        let _ = app.update(Message::RandomizePressed);
        let ticket = app.selector.pending_draw().unwrap();
        let _ = app.update(Message::DrawSettled(ticket));
        assert_eq!(app.alpha_card.state().subject(), Some(alice));
        let current = current_request(&app.alpha_card);
        assert_eq!(earlier.url, current.url);

        let _ = app.update(Message::PortraitLoaded {
            slot: PortraitSlot::Card(Role::Alpha),
            request: earlier,
            result: Err(FetchError::Status(403)),
        });
        assert!(!app.alpha_card.state().has_fallen_back());

        let _ = app.update(Message::PortraitLoaded {
            slot: PortraitSlot::Card(Role::Alpha),
            request: current,
            result: Ok(Handle::from_bytes(vec![0u8; 4])),
        });
        assert!(app.alpha_card.image().is_some());
    }
}

use iced::widget::{button, column, container, row, scrollable, text, Column, Space};
use iced::{Alignment, Border, Element, Length, Theme};

use super::{accent, portrait_view, tint, MUTED};
use crate::portrait::resolver::{ImageResolver, PortraitSize};
use crate::portrait::{Portrait, PortraitCache, PortraitRequest, PortraitSlot};
use crate::state::catalog::ActorCatalog;
use crate::state::data::{ActorId, Role};
use crate::state::pairing::PairingSelector;
use crate::Message;

const THUMBNAIL: f32 = 48.0;

/// The roster overlay: both partitions side by side, click to select.
///
/// Selecting does not close the overlay, so both roles can be picked in
/// one visit.
#[derive(Debug)]
pub struct RosterOverlay {
    open: bool,
    alpha: Vec<Portrait>,
    omega: Vec<Portrait>,
}

impl RosterOverlay {
    pub fn new(catalog: &ActorCatalog) -> Self {
        let thumbnails = |role| {
            vec![Portrait::new(PortraitSize::Thumbnail); catalog.roster(role).len()]
        };
        Self {
            open: false,
            alpha: thumbnails(Role::Alpha),
            omega: thumbnails(Role::Omega),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the overlay. Returns the thumbnails that still need a download;
    /// rows that were shown before keep their state.
    pub fn open(
        &mut self,
        catalog: &ActorCatalog,
        resolver: &ImageResolver,
        cache: &PortraitCache,
    ) -> Vec<(PortraitSlot, PortraitRequest)> {
        self.open = true;

        let mut downloads = Vec::new();
        for role in Role::ALL {
            for (id, actor) in catalog.entries(role) {
                let Some(portrait) = self.portrait_mut(id) else {
                    continue;
                };
                if let Some(request) = portrait.show(Some((id, actor)), resolver, cache) {
                    downloads.push((PortraitSlot::Roster(id), request));
                }
            }
        }
        downloads
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn portrait_mut(&mut self, id: ActorId) -> Option<&mut Portrait> {
        match id.role {
            Role::Alpha => self.alpha.get_mut(id.index),
            Role::Omega => self.omega.get_mut(id.index),
        }
    }

    fn portrait(&self, id: ActorId) -> Option<&Portrait> {
        match id.role {
            Role::Alpha => self.alpha.get(id.index),
            Role::Omega => self.omega.get(id.index),
        }
    }

    pub fn view<'a>(&'a self, selector: &'a PairingSelector) -> Element<'a, Message> {
        let header = row![
            text("📖 演员名册").size(22),
            text("Roster Selection").size(14).color(MUTED),
            Space::with_width(Length::Fill),
            button(text("✕").size(18))
                .on_press(Message::CloseRoster)
                .style(button::text),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .padding([12, 20]);

        let columns = row![
            self.column(selector, Role::Alpha),
            self.column(selector, Role::Omega),
        ]
        .spacing(12)
        .height(Length::Fill);

        let footer = container(text("点击列表头像直接选择 / Click to select").size(13).color(MUTED))
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding(12);

        container(column![header, columns, footer])
            .width(Length::Fixed(880.0))
            .height(Length::Fixed(640.0))
            .style(container::rounded_box)
            .into()
    }

    fn column<'a>(&'a self, selector: &'a PairingSelector, role: Role) -> Element<'a, Message> {
        let catalog = selector.catalog();
        let selected = selector.selected_id(role);

        let heading = container(
            text(format!("{} - {}人", role.title(), catalog.roster(role).len()))
                .size(15)
                .color(accent(role)),
        )
        .width(Length::Fill)
        .padding([10, 16])
        .style(move |_theme| container::Style {
            background: Some(tint(role).into()),
            ..container::Style::default()
        });

        let rows = catalog.entries(role).filter_map(|(id, actor)| {
            let portrait = self.portrait(id)?;
            let marked = is_marked(selected, id);

            let check: Element<'a, Message> = if marked {
                text("✓").size(16).color(accent(role)).into()
            } else {
                Space::with_width(Length::Fixed(16.0)).into()
            };

            let item = row![
                portrait_view(portrait, THUMBNAIL, THUMBNAIL),
                column![
                    text(actor.name.as_str()).size(15),
                    text(actor.headline_tag().unwrap_or_default()).size(12).color(MUTED),
                ]
                .spacing(2)
                .width(Length::Fill),
                check,
            ]
            .spacing(12)
            .align_y(Alignment::Center);

            Some(
                button(item)
                    .width(Length::Fill)
                    .padding(8)
                    .on_press(Message::SelectActor(id))
                    .style(move |theme, status| row_style(theme, status, role, marked))
                    .into(),
            )
        });

        column![
            heading,
            scrollable(Column::with_children(rows).spacing(8).padding(12)).height(Length::Fill),
        ]
        .width(Length::FillPortion(1))
        .into()
    }
}

/// Whether a row is the current selection for its role
pub fn is_marked(selected: Option<ActorId>, id: ActorId) -> bool {
    selected == Some(id)
}

fn row_style(theme: &Theme, status: button::Status, role: Role, marked: bool) -> button::Style {
    let base = button::text(theme, status);
    if marked {
        button::Style {
            background: Some(iced::Color::WHITE.into()),
            border: Border {
                color: accent(role),
                width: 2.0,
                radius: 10.0.into(),
            },
            ..base
        }
    } else {
        button::Style {
            border: Border {
                radius: 10.0.into(),
                ..base.border
            },
            ..base
        }
    }
}

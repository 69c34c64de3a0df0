use iced::widget::{column, container, text};
use iced::{Alignment, Border, Element, Length, Shadow, Theme};
use iced_aw::Wrap;

use super::{accent, portrait_view, tag_chip, tint, MUTED};
use crate::portrait::Portrait;
use crate::state::data::{Actor, Role};
use crate::Message;

const CARD_WIDTH: f32 = 320.0;
const PORTRAIT_HEIGHT: f32 = 420.0;

/// The big card for one role.
///
/// Shows a spinner while a random draw is settling, a `?` when the slot is
/// empty, and the portrait, name and first tags otherwise.
pub fn view<'a>(
    role: Role,
    actor: Option<&'a Actor>,
    portrait: &'a Portrait,
    randomizing: bool,
) -> Element<'a, Message> {
    let filled = actor.is_some();

    let title = text(role.title())
        .size(20)
        .color(if filled { accent(role) } else { MUTED });

    let picture: Element<'a, Message> = if randomizing {
        column![
            text("◌").size(48).color(MUTED),
            text("Matching...").color(MUTED),
        ]
        .spacing(12)
        .align_x(Alignment::Center)
        .into()
    } else if filled {
        portrait_view(portrait, CARD_WIDTH, PORTRAIT_HEIGHT)
    } else {
        text("?").size(64).color(MUTED).into()
    };

    let frame = container(picture)
        .width(Length::Fill)
        .height(Length::Fixed(PORTRAIT_HEIGHT))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(PORTRAIT_HEIGHT))
        .style(move |_theme| container::Style {
            background: Some(tint(role).into()),
            ..container::Style::default()
        });

    let details: Element<'a, Message> = match actor {
        Some(actor) => column![
            text(actor.name.as_str()).size(26),
            Wrap::with_elements(actor.display_tags().map(|tag| tag_chip(tag, role)).collect()),
        ]
        .spacing(12)
        .align_x(Alignment::Center)
        .into(),
        None => text("等待配对...").color(MUTED).into(),
    };

    container(
        column![title, frame, details]
            .spacing(16)
            .padding(16)
            .align_x(Alignment::Center),
    )
    .width(Length::Fixed(CARD_WIDTH + 32.0))
    .style(move |theme| style(theme, role, filled))
    .into()
}

fn style(theme: &Theme, role: Role, filled: bool) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.base.color.into()),
        border: Border {
            color: if filled { accent(role) } else { MUTED },
            width: 2.0,
            radius: 12.0.into(),
        },
        shadow: Shadow {
            color: iced::Color {
                a: 0.15,
                ..iced::Color::BLACK
            },
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: 16.0,
        },
        ..container::Style::default()
    }
}

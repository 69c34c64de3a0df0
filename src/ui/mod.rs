/// UI building blocks
///
/// - `card.rs` - the large per-role card on the main view
/// - `roster.rs` - the roster overlay with both partitions

pub mod card;
pub mod roster;

use iced::widget::{center, container, mouse_area, opaque, stack, text, Image};
use iced::{Border, Color, ContentFit, Element, Length};

use crate::portrait::Portrait;
use crate::state::data::Role;
use crate::Message;

/// Secondary text and empty-state glyphs
pub const MUTED: Color = Color::from_rgb(0.6, 0.62, 0.66);

/// Heart and MATCHED badge
pub const MATCH_PINK: Color = Color::from_rgb(0.93, 0.29, 0.6);

pub fn accent(role: Role) -> Color {
    match role {
        Role::Alpha => Color::from_rgb8(0x40, 0x9e, 0xff),
        Role::Omega => Color::from_rgb8(0xf5, 0x6c, 0x6c),
    }
}

/// Pale version of the accent, used behind portraits
pub fn tint(role: Role) -> Color {
    Color {
        a: 0.12,
        ..accent(role)
    }
}

/// A `#tag` badge
pub fn tag_chip<'a>(tag: &'a str, role: Role) -> Element<'a, Message> {
    let chip = container(text(format!("#{tag}")).size(14).color(accent(role)))
        .padding([4, 12])
        .style(move |_theme| container::Style {
            background: Some(tint(role).into()),
            border: Border {
                radius: 12.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

    container(chip).padding([4, 4]).into()
}

/// The loaded image, or a placeholder glyph while it is still loading
/// (or after both the primary and the fallback failed).
pub fn portrait_view<'a>(portrait: &Portrait, width: f32, height: f32) -> Element<'a, Message> {
    match portrait.image() {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("…").size(height / 3.0).color(MUTED))
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .center_x(Length::Fixed(width))
            .center_y(Length::Fixed(height))
            .into(),
    }
}

/// Show `content` above `base`, dimming it. Clicking the backdrop emits
/// `on_blur`.
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| container::Style {
                background: Some(
                    Color {
                        a: 0.6,
                        ..Color::from_rgb(0.06, 0.09, 0.16)
                    }
                    .into()
                ),
                ..container::Style::default()
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

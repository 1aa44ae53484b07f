use iced::widget::{column, container, row, text, Space};
use iced::{Color, Element, Length, Theme};

use icaowatch_core::display::evaluator::{IndicatorState, WarningLevel};

use crate::app::{scaled, Message};
use crate::theme::tertiary_color;

const DOT: &str = "\u{25CF}";

/// The three indicator colors. Hosts may override any of them; the
/// defaults follow the conventional green / red / orange scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPalette {
    pub no_warning: Color,
    pub warning: Color,
    pub indeterminate: Color,
}

impl Default for PanelPalette {
    fn default() -> Self {
        Self {
            no_warning: Color::from_rgb8(0x1e, 0x8e, 0x3e),
            warning: Color::from_rgb8(0xd9, 0x30, 0x25),
            indeterminate: Color::from_rgb8(0xe8, 0x8b, 0x00),
        }
    }
}

impl PanelPalette {
    pub fn color_for(&self, level: WarningLevel) -> Color {
        match level {
            WarningLevel::NoWarning => self.no_warning,
            WarningLevel::Warning => self.warning,
            WarningLevel::Indeterminate => self.indeterminate,
        }
    }
}

/// Renders the evaluated indicator table as two columns of colored labels.
pub fn view<'a>(
    states: &[IndicatorState],
    palette: &PanelPalette,
    fs: f32,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let header = row![
        text("ICAO Warnings").size(scaled(16.0, fs)),
        Space::new().width(10),
        text(format!("{} checks", states.len()))
            .size(scaled(13.0, fs))
            .color(tertiary),
    ]
    .align_y(iced::Alignment::Center);

    let mid = states.len().div_ceil(2);
    let (left, right) = states.split_at(mid);

    let columns = row![
        indicator_column(left, palette, fs),
        indicator_column(right, palette, fs),
    ]
    .spacing(24)
    .width(Length::Fill);

    let body = container(columns)
        .padding([14, 16])
        .style(container::rounded_box)
        .width(Length::Fill);

    column![header, Space::new().height(10), body]
        .spacing(0)
        .width(Length::Fill)
        .into()
}

fn indicator_column<'a>(
    states: &[IndicatorState],
    palette: &PanelPalette,
    fs: f32,
) -> Element<'a, Message> {
    let rows: Vec<Element<'a, Message>> = states
        .iter()
        .map(|state| {
            let color = palette.color_for(state.level);
            row![
                text(DOT).size(scaled(10.0, fs)).color(color),
                text(state.text.clone()).size(scaled(14.0, fs)).color(color),
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center)
            .into()
        })
        .collect();

    column(rows).spacing(6).width(Length::Fill).into()
}

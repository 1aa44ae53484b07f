use std::path::Path;

use iced::widget::{button, column, container, row, text, Space};
use iced::{Element, Length, Theme};

use icaowatch_core::display::evaluator::IndicatorState;

use crate::app::{scaled, FeedStatus, Message};
use crate::theme::tertiary_color;
use crate::widgets::icao_panel::{self, PanelPalette};

pub fn view<'a>(
    fs: f32,
    status: &FeedStatus,
    states: &[IndicatorState],
    palette: &PanelPalette,
    scenario_path: Option<&Path>,
    theme: &Theme,
) -> Element<'a, Message> {
    let tertiary = tertiary_color(theme);

    let source = scenario_path
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "built-in demo".to_string());

    let (status_text, running) = match status {
        FeedStatus::Idle => ("Stopped".to_string(), false),
        FeedStatus::Playing(label) if label.is_empty() => ("Playing\u{2026}".to_string(), true),
        FeedStatus::Playing(label) => (format!("Playing: {label}"), true),
        FeedStatus::Finished => ("Scenario finished".to_string(), false),
        FeedStatus::Error(e) => (format!("Feed failed: {e}"), false),
    };

    let toggle = if running {
        button(text("Stop").size(scaled(13.0, fs)))
            .on_press(Message::StopFeed)
            .padding([8, 20])
            .style(button::secondary)
    } else {
        button(text("Start").size(scaled(13.0, fs)))
            .on_press(Message::StartFeed)
            .padding([8, 20])
    };

    let status_card = container(
        row![
            column![
                text(format!("SCENARIO: {}", source.to_uppercase()))
                    .size(scaled(11.0, fs))
                    .color(tertiary),
                text(status_text).size(scaled(15.0, fs)),
            ]
            .spacing(2)
            .width(Length::Fill),
            toggle,
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center),
    )
    .padding([14, 16])
    .style(container::rounded_box)
    .width(Length::Fill);

    column![
        status_card,
        Space::new().height(16),
        icao_panel::view(states, palette, fs, theme),
    ]
    .spacing(0)
    .width(Length::Fill)
    .into()
}

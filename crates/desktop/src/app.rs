use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};

use icaowatch_core::analysis::domain::face::Face;
use icaowatch_core::binding::attribute_binding::AttributeBinding;
use icaowatch_core::display::evaluator::{evaluate, IndicatorState};
use icaowatch_core::replay::scenario::Scenario;

use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::widgets::icao_panel::PanelPalette;
use crate::workers::feed_worker::{self, FeedMessage, FeedParams};

const TICK_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Main,
    Appearance,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Main, Tab::Appearance];

    fn label(self) -> &'static str {
        match self {
            Tab::Main => "Main",
            Tab::Appearance => "Appearance",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    StartFeed,
    StopFeed,
    Tick,
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    PollSystemTheme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Playing(String),
    Finished,
    Error(String),
}

struct FeedHandle {
    rx: Receiver<FeedMessage>,
    cancelled: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    panel_palette: PanelPalette,
    binding: AttributeBinding,
    states: Vec<IndicatorState>,
    feed: Option<FeedHandle>,
    feed_status: FeedStatus,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                active_tab: Tab::Main,
                settings: Settings::load(),
                panel_palette: PanelPalette::default(),
                binding: AttributeBinding::new(),
                states: evaluate(None),
                feed: None,
                feed_status: FeedStatus::Idle,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::StartFeed => {
                if self.feed.is_none() {
                    self.start_feed();
                }
            }
            Message::StopFeed => {
                if let Some(handle) = &self.feed {
                    handle.cancelled.store(true, Ordering::Relaxed);
                }
            }
            Message::Tick => {
                self.drain_feed();
                if self.binding.pump() {
                    self.states = evaluate(self.binding.snapshot().as_ref());
                }
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render,
                // so just requesting a redraw is enough.
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;

        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let theme = self.theme();
        let content: Element<'_, Message> = match self.active_tab {
            Tab::Main => tabs::main_tab::view(
                fs,
                &self.feed_status,
                &self.states,
                &self.panel_palette,
                self.settings.scenario_path.as_deref(),
                &theme,
            ),
            Tab::Appearance => tabs::appearance_tab::view(&self.settings, &self.panel_palette),
        };

        let tab_content = container(scrollable(content).height(Length::Fill))
            .padding(16)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subs = Vec::new();
        if self.feed.is_some() {
            subs.push(iced::time::every(TICK_INTERVAL).map(|_| Message::Tick));
        }
        if self.settings.appearance == Appearance::System {
            subs.push(iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme));
        }
        Subscription::batch(subs)
    }

    fn start_feed(&mut self) {
        let scenario = match &self.settings.scenario_path {
            Some(path) => match Scenario::load(path) {
                Ok(scenario) => scenario,
                Err(e) => {
                    log::warn!("could not load scenario {}: {e}", path.display());
                    self.feed_status = FeedStatus::Error(e.to_string());
                    return;
                }
            },
            None => Scenario::demo(),
        };

        let face = Arc::new(Face::new());
        if self.binding.set_face(Some(face.clone())) {
            self.states = evaluate(self.binding.snapshot().as_ref());
        }

        let (rx, cancelled) = feed_worker::spawn(FeedParams {
            face,
            scenario,
            loop_playback: true,
        });
        self.feed = Some(FeedHandle { rx, cancelled });
        self.feed_status = FeedStatus::Playing(String::new());
    }

    fn drain_feed(&mut self) {
        let mut done = false;
        if let Some(handle) = &self.feed {
            for msg in handle.rx.try_iter() {
                match msg {
                    FeedMessage::Step(label) => {
                        self.feed_status = FeedStatus::Playing(label);
                    }
                    FeedMessage::Finished => {
                        self.feed_status = FeedStatus::Finished;
                        done = true;
                    }
                    FeedMessage::Cancelled => {
                        self.feed_status = FeedStatus::Idle;
                        done = true;
                    }
                    FeedMessage::Error(e) => {
                        log::error!("feed worker failed: {e}");
                        self.feed_status = FeedStatus::Error(e);
                        done = true;
                    }
                }
            }
        }
        if done {
            self.feed = None;
            if self.binding.set_face(None) {
                self.states = evaluate(None);
            }
        }
    }
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}

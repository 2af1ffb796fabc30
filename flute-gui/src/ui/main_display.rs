//! # Main Display Module
//!
//! Layout of the game window: title and score on top, the board in the
//! middle, the note readout and the buttons on the side.

use iced::widget::{button, column, container, horizontal_space, row, text, Space};
use iced::{Alignment, Element, Length};

use super::{board, legend};
use crate::{AppDisplayData, AudioStatus, Message};

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    if let AudioStatus::Failed(reason) = &data.audio_status {
        return container(
            column![
                text("No microphone").size(40),
                text(reason.clone()).size(16),
                button(text("Exit")).on_press(Message::Exit).padding([6, 10]),
            ]
            .spacing(20)
            .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into();
    }

    let score = data.last_frame.as_ref().map_or(0, |f| f.score);
    let header = row![
        text("Galileu's Flute").size(28),
        horizontal_space(),
        text(format!("Score: {score}")).size(28),
    ]
    .align_y(Alignment::Center);

    let lines = board::compose_board(data.last_frame.as_ref(), data.viewport_width, data.alignment_column);
    let mut board_column = column![].spacing(5).padding(15);
    for (i, line) in composition_heading(&data.composition_name, &data.composition_description)
        .into_iter()
        .enumerate()
    {
        board_column = board_column.push(text(line).size(if i == 0 { 18 } else { 14 }));
    }
    let board_panel = container(
        board_column
            .push(Space::with_height(10))
            .push(board::view(&lines)),
    )
    .width(Length::Fill);

    let mut main_column = column![header, Space::with_height(20), board_panel]
        .width(Length::Fill)
        .spacing(10);
    if data.legend_visible {
        main_column = main_column.push(legend::view());
    }

    let main_content = row![main_column, Space::with_width(10), create_sidebar(data)]
        .align_y(Alignment::Start)
        .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Title lines above the board: the piece name, then its description when
/// there is one.
fn composition_heading(name: &str, description: &str) -> Vec<String> {
    let mut lines = vec![name.to_string()];
    let description = description.trim();
    if !description.is_empty() {
        lines.push(description.to_string());
    }
    lines
}

/// Note readout, audio status and controls.
fn create_sidebar(data: &AppDisplayData) -> Element<'static, Message> {
    let (note_name, freq_text, confidence) = match data.last_frame.as_ref() {
        Some(frame) => {
            let note = frame.note.reference().label.to_string();
            match frame.pitch.filter(|p| p.is_pitched()) {
                Some(pitch) => (
                    note,
                    format!("{:.1} Hz", pitch.frequency),
                    format!("{:.0}%", pitch.confidence * 100.0),
                ),
                None => (note, "-- Hz".to_string(), "0%".to_string()),
            }
        }
        None => ("--".to_string(), "-- Hz".to_string(), "0%".to_string()),
    };

    let status = match &data.audio_status {
        AudioStatus::Starting => "Opening microphone...".to_string(),
        AudioStatus::Running { sample_rate } => format!("Listening at {sample_rate} Hz"),
        AudioStatus::Failed(_) => "Microphone failed".to_string(),
        AudioStatus::Stopped => "Stopped".to_string(),
    };

    let legend_label = if data.legend_visible { "Hide manual" } else { "Show manual" };

    let sidebar = column![
        text("Note").size(14),
        text(note_name).size(22),
        text(freq_text).size(16),
        row![text("Confidence").size(14), horizontal_space(), text(confidence).size(14)],
        Space::with_height(10),
        text(status).size(12),
        Space::with_height(20),
        sidebar_button(legend_label, Message::ToggleLegend),
        sidebar_button("Restart", Message::Restart),
        sidebar_button("Exit", Message::Exit),
    ]
    .spacing(8)
    .padding(15);

    container(sidebar)
        .width(Length::Fixed(220.0))
        .height(Length::Fill)
        .into()
}

fn sidebar_button(label: &'static str, message: Message) -> Element<'static, Message> {
    button(text(label).size(14).width(Length::Fill))
        .on_press(message)
        .padding([6, 10])
        .width(Length::Fill)
        .into()
}

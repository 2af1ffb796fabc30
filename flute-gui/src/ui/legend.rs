//! The in-game manual.

use iced::widget::{column, container, text, Space};
use iced::{Element, Font, Length};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    ("Recorder", &[("O", "open hole, lift the finger"), ("#", "closed hole, cover it")]),
    (
        "Score",
        &[
            ("S", "a note from Do to Si"),
            ("_", "keep holding the same note"),
            ("D", "the high Do"),
            (".", "nothing to play"),
        ],
    ),
    (
        "Judgment line",
        &[
            ("X", "right note, 10 points"),
            ("@", "wrong note, minus 1 point"),
            ("|", "the line itself"),
        ],
    ),
];

pub fn view() -> Element<'static, crate::Message> {
    let mut content = column![
        text("How to play").size(18),
        text("Play the note on the judgment line as the score scrolls left.").size(14),
        Space::with_height(5),
    ]
    .spacing(4);

    for (title, entries) in SECTIONS {
        content = content.push(text(*title).size(16));
        for (glyph, meaning) in entries.iter() {
            content = content.push(text(format!("  '{glyph}'  {meaning}")).font(Font::MONOSPACE).size(14));
        }
    }

    container(content.padding(15)).width(Length::Fill).into()
}

//! Card rendering: formats derived notes into the two text fields a
//! spaced-repetition app imports, with light HTML for layout.

use crate::domain::model::{DerivedNote, RenderedCard};

const LINE_BREAK: &str = "<br>";

/// Renders one note into a front/back card. The front shows the song title
/// in small caps, an ambiguity marker when the prompt has several answers,
/// then the prompt lines; the back is the answer line alone.
pub fn render_card(title: &str, note: &DerivedNote) -> RenderedCard {
    let mut front = String::new();
    front.push_str("<span style=\"font-variant: small-caps\">");
    front.push_str(&html_escape(title));
    front.push_str("</span>");
    front.push_str(LINE_BREAK);

    if let Some(mark) = &note.disambiguation {
        front.push_str("<span style=\"font-size: small\">★ ");
        front.push_str(&mark.rank.to_string());
        front.push('/');
        front.push_str(&mark.of.to_string());
        front.push_str("</span>");
        front.push_str(LINE_BREAK);
    }

    let prompt_lines: Vec<String> = note.prompt.iter().map(|line| html_escape(line)).collect();
    front.push_str(&prompt_lines.join(LINE_BREAK));

    RenderedCard {
        front,
        back: html_escape(&note.answer),
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

//! Screen furniture drawn over the scene: intro gate, header and footer,
//! the memory modal, and the error screen.

use galaxy_config::OverlayText;
use galaxy_core::{Memory, Rgb};
use galaxy_scene::UiEffects;
use image::RgbImage;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Widget, Wrap},
};

use crate::recovery::RenderError;

const LOVE_PINK: Rgb = Rgb(0xff, 0x6b, 0xcb);
const SOFT_LAVENDER: Rgb = Rgb(0xe0, 0xb0, 0xff);
const MODAL_BG: Rgb = Rgb(0x12, 0x04, 0x1f);
const ERROR_BG: Rgb = Rgb(0x22, 0x00, 0x33);

/// Intro gate and sound toggle.
#[derive(Debug)]
pub struct OverlayState {
    started: bool,
    muted: bool,
    show_help: bool,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            started: false,
            muted: true,
            show_help: false,
        }
    }
}

impl OverlayState {
    pub fn started(&self) -> bool {
        self.started
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Leave the intro screen, starting the soundtrack. Returns `false` if
    /// already entered.
    pub fn enter(&mut self, effects: &mut dyn UiEffects) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        self.toggle_sound(effects);
        true
    }

    /// Flip the sound label and start or stop the soundtrack. The label
    /// follows the request even if playback fails.
    pub fn toggle_sound(&mut self, effects: &mut dyn UiEffects) {
        if self.muted {
            effects.play_ambient();
        } else {
            effects.stop_ambient();
        }
        self.muted = !self.muted;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

fn sound_label(muted: bool) -> &'static str {
    if muted { "SOUND OFF" } else { "SOUND ON" }
}

/// Where the clickable sound label sits for a screen `area`.
pub fn sound_label_area(area: Rect, muted: bool) -> Rect {
    let width = (sound_label(muted).chars().count() as u16).min(area.width);
    Rect::new(
        area.right().saturating_sub(width + 2),
        area.y.saturating_add(1).min(area.bottom().saturating_sub(1)),
        width,
        1.min(area.height),
    )
}

/// Space the letters out.
fn tracked(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, c) in text.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Gradient from pink to lavender across the text.
fn gradient_line(text: &str) -> Line<'static> {
    let count = text.chars().count().max(2) - 1;
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let color = LOVE_PINK.mix(SOFT_LAVENDER, i as f32 / count as f32);
            Span::styled(c.to_string(), Style::new().fg(color.into()).add_modifier(Modifier::BOLD))
        })
        .collect::<Vec<_>>()
        .into()
}

/// Darken everything already drawn in `area`.
fn dim(area: Rect, buf: &mut Buffer, factor: f32) {
    let darken = |color: Color| -> Color {
        match color {
            Color::Rgb(r, g, b) => Rgb(r, g, b).scale(factor).into(),
            _ => Color::Rgb(0, 0, 0),
        }
    };
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                let (fg, bg) = (darken(cell.fg), darken(cell.bg));
                cell.set_fg(fg).set_bg(bg);
            }
        }
    }
}

/// Full-screen "enter" gate shown until the first click or key.
pub struct IntroScreen<'a> {
    pub text: &'a OverlayText,
}

impl Widget for IntroScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        dim(area, buf, 0.3);
        let [title, _, hint] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(area);

        Paragraph::new(gradient_line(&tracked(&self.text.intro_title)))
            .alignment(Alignment::Center)
            .render(title, buf);
        Paragraph::new(self.text.intro_hint.to_uppercase())
            .style(Style::new().fg(Color::Rgb(0x80, 0x80, 0x80)))
            .alignment(Alignment::Center)
            .render(hint, buf);
    }
}

/// Header, sound label, footer and optional help line.
pub struct Hud<'a> {
    pub text: &'a OverlayText,
    pub muted: bool,
    pub show_help: bool,
    /// Seconds left in a running capture.
    pub recording: Option<f32>,
}

impl Widget for Hud<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [_, header, _, help, footer, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);
        let header = header.inner(ratatui::layout::Margin::new(2, 0));

        Line::from(self.text.header.as_str())
            .style(Style::new().fg(Color::Rgb(0xcc, 0xcc, 0xcc)))
            .render(header, buf);

        let mut right = vec![];
        if let Some(left) = self.recording {
            right.push(Span::from(format!("● REC {left:.0}s  ")).red().bold());
        }
        right.push(
            sound_label(self.muted)
                .fg(Color::Rgb(0x99, 0x99, 0x99))
                .add_modifier(Modifier::BOLD),
        );
        Line::from(right).right_aligned().render(header, buf);

        if self.show_help {
            let key = |k: &'static str| k.bold().fg(LOVE_PINK);
            Line::from(vec![
                key("q"),
                " quit  ".dark_gray(),
                key("s"),
                " sound  ".dark_gray(),
                key("r"),
                " record  ".dark_gray(),
                key("←↑→↓"),
                " orbit  ".dark_gray(),
                key("+/-"),
                " zoom  ".dark_gray(),
                key("x"),
                " close  ".dark_gray(),
                key("?"),
                " help".dark_gray(),
            ])
            .centered()
            .render(help, buf);
        }

        Line::from(self.text.footer.as_str())
            .style(Style::new().fg(Color::Rgb(0x55, 0x55, 0x55)))
            .centered()
            .render(footer, buf);
    }
}

/// Centered box the modal occupies.
pub fn modal_area(area: Rect) -> Rect {
    let [area] = Layout::horizontal([Constraint::Percentage(70)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Percentage(80)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Image region inside the modal and its size in pixels (two per cell row).
pub fn modal_image_area(area: Rect) -> (Rect, u32, u32) {
    let inner = Block::bordered().inner(modal_area(area));
    let [image, _] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(inner);
    (image, image.width as u32, image.height as u32 * 2)
}

/// The selected memory: picture and caption.
pub struct MemoryModal<'a> {
    pub memory: &'a Memory,
    pub image: Option<&'a RgbImage>,
}

impl Widget for MemoryModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        dim(area, buf, 0.5);
        let modal = modal_area(area);
        Clear.render(modal, buf);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(LOVE_PINK.into()))
            .style(Style::new().bg(MODAL_BG.into()))
            .title_bottom(Line::from(" x / Esc / click to close ").centered().dark_gray());
        let inner = block.inner(modal);
        block.render(modal, buf);

        let (image_area, _, _) = modal_image_area(area);
        let [_, caption] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(inner);

        match self.image {
            Some(image) => render_half_blocks(image, image_area, buf),
            None => {
                let [placeholder] = Layout::vertical([Constraint::Length(1)])
                    .flex(Flex::Center)
                    .areas(image_area);
                Paragraph::new(format!("✧ {} ✧", self.memory.image.display()))
                    .style(Style::new().fg(SOFT_LAVENDER.into()).add_modifier(Modifier::ITALIC))
                    .alignment(Alignment::Center)
                    .render(placeholder, buf);
            }
        }

        Paragraph::new(self.memory.message.as_str())
            .style(Style::new().fg(Color::White).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(caption, buf);
    }
}

/// Two pixels per cell: `▀` with the upper pixel as foreground and the
/// lower as background. The image is centred in `area`.
fn render_half_blocks(image: &RgbImage, area: Rect, buf: &mut Buffer) {
    let columns = (image.width() as u16).min(area.width);
    let rows = (image.height().div_ceil(2) as u16).min(area.height);
    let left = area.x + (area.width - columns) / 2;
    let top = area.y + (area.height - rows) / 2;

    let pixel = |x: u32, y: u32| -> Color {
        match image.get_pixel_checked(x, y) {
            Some(p) => Color::Rgb(p[0], p[1], p[2]),
            None => MODAL_BG.into(),
        }
    };
    for row in 0..rows {
        for column in 0..columns {
            if let Some(cell) = buf.cell_mut((left + column, top + row)) {
                let (x, y) = (column as u32, row as u32 * 2);
                cell.set_char('▀').set_fg(pixel(x, y)).set_bg(pixel(x, y + 1));
            }
        }
    }
}

/// Permanent fallback after a frame fails.
pub struct ErrorScreen<'a> {
    pub error: &'a RenderError,
}

impl Widget for ErrorScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let lines = vec![
            Line::from("Something went wrong.").bold(),
            Line::default(),
            Line::from(self.error.to_string()),
            Line::default(),
            Line::from(vec!["q".bold(), " quit".dark_gray()]),
        ];
        Paragraph::new(lines)
            .style(Style::new().fg(Color::White).bg(ERROR_BG.into()))
            .wrap(Wrap { trim: false })
            .block(Block::new().padding(ratatui::widgets::Padding::uniform(2)))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_core::CursorKind;

    #[derive(Default)]
    struct Sink {
        playing: bool,
        plays: usize,
    }

    impl UiEffects for Sink {
        fn set_cursor(&mut self, _: CursorKind) {}

        fn play_ambient(&mut self) {
            self.playing = true;
            self.plays += 1;
        }

        fn stop_ambient(&mut self) {
            self.playing = false;
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn screen_text(buf: &Buffer) -> String {
        (buf.area.top()..buf.area.bottom())
            .map(|y| row_text(buf, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_enter_starts_sound_once() {
        let mut state = OverlayState::default();
        let mut sink = Sink::default();
        assert!(state.muted());

        assert!(state.enter(&mut sink));
        assert!(state.started());
        assert!(!state.muted());
        assert!(sink.playing);

        assert!(!state.enter(&mut sink));
        assert_eq!(sink.plays, 1);

        state.toggle_sound(&mut sink);
        assert!(state.muted());
        assert!(!sink.playing);
    }

    #[test]
    fn test_intro_screen_text() {
        let text = OverlayText::default();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        IntroScreen { text: &text }.render(area, &mut buf);
        let screen = screen_text(&buf);
        assert!(screen.contains("E N T E R   G A L A X Y"));
        assert!(screen.contains("CLICK TO BEGIN"));
    }

    #[test]
    fn test_hud_labels() {
        let text = OverlayText::default();
        let area = Rect::new(0, 0, 70, 12);
        let mut buf = Buffer::empty(area);
        Hud {
            text: &text,
            muted: true,
            show_help: false,
            recording: None,
        }
        .render(area, &mut buf);
        let screen = screen_text(&buf);
        assert!(row_text(&buf, 1).contains("MY LOVE"));
        assert!(row_text(&buf, 1).contains("SOUND OFF"));
        assert!(screen.contains("DRAG TO EXPLORE • CLICK MEMORIES"));
        assert!(!screen.contains("quit"));

        let label = sound_label_area(area, true);
        let under: String = (label.left()..label.right())
            .map(|x| buf[(x, label.y)].symbol().to_string())
            .collect();
        assert_eq!(under, "SOUND OFF");
    }

    #[test]
    fn test_modal_placeholder_and_caption() {
        let memory = Memory::new("cp-2.jpeg", "Our first trip");
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        MemoryModal {
            memory: &memory,
            image: None,
        }
        .render(area, &mut buf);
        let screen = screen_text(&buf);
        assert!(screen.contains("cp-2.jpeg"));
        assert!(screen.contains("Our first trip"));
    }

    #[test]
    fn test_modal_draws_half_blocks() {
        let memory = Memory::new("a.png", "");
        let image = RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        MemoryModal {
            memory: &memory,
            image: Some(&image),
        }
        .render(area, &mut buf);

        let blocks: Vec<_> = buf
            .content()
            .iter()
            .filter(|cell| cell.symbol() == "▀")
            .collect();
        assert_eq!(blocks.len(), 4 * 2);
        assert!(blocks.iter().all(|cell| cell.fg == Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn test_error_screen() {
        let error = RenderError::Panicked("boom".into());
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        ErrorScreen { error: &error }.render(area, &mut buf);
        let screen = screen_text(&buf);
        assert!(screen.contains("Something went wrong."));
        assert!(screen.contains("panicked: boom"));
    }
}

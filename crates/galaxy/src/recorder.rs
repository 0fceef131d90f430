//! Fixed-length screen captures in asciicast v2 format.
//!
//! A capture is a JSON header line followed by one `[time, "o", data]`
//! line per rendered frame, where `data` redraws the whole screen with
//! ANSI escapes. Any player that understands asciinema casts can replay it.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::{buffer::Buffer, style::Color};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("a recording is already in progress")]
    Busy,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode frame: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Header<'a> {
    version: u8,
    width: u16,
    height: u16,
    timestamp: i64,
    title: &'a str,
}

struct Recording {
    path: PathBuf,
    writer: BufWriter<File>,
    frames: usize,
}

/// Records at most one capture at a time.
pub struct Recorder {
    directory: PathBuf,
    duration: Duration,
    active: Option<Recording>,
}

impl Recorder {
    pub fn new(directory: PathBuf, duration: Duration) -> Self {
        Self {
            directory,
            duration,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Open a new capture file named after `now`.
    pub fn start(
        &mut self,
        width: u16,
        height: u16,
        now: DateTime<Local>,
    ) -> Result<PathBuf, RecordError> {
        if self.active.is_some() {
            return Err(RecordError::Busy);
        }
        fs::create_dir_all(&self.directory)?;
        let path = self
            .directory
            .join(format!("galaxy-{}.cast", now.format("%Y%m%d-%H%M%S")));
        let mut writer = BufWriter::new(File::create(&path)?);
        let header = Header {
            version: 2,
            width,
            height,
            timestamp: now.timestamp(),
            title: "galaxy",
        };
        serde_json::to_writer(&mut writer, &header)?;
        writer.write_all(b"\n")?;

        log::info!("recording started: {}", path.display());
        self.active = Some(Recording {
            path: path.clone(),
            writer,
            frames: 0,
        });
        Ok(path)
    }

    /// Append a frame taken `elapsed` after the capture started. The capture
    /// closes itself once `elapsed` reaches the configured duration. Returns
    /// the file path when it does.
    pub fn capture(&mut self, buffer: &Buffer, elapsed: Duration) -> Option<PathBuf> {
        if self.active.is_some() && elapsed >= self.duration {
            return self.finish();
        }
        let recording = self.active.as_mut()?;
        let event = (elapsed.as_secs_f64(), "o", to_ansi(buffer));
        let written = serde_json::to_writer(&mut recording.writer, &event)
            .map_err(RecordError::from)
            .and_then(|()| Ok(recording.writer.write_all(b"\n")?));
        match written {
            Ok(()) => recording.frames += 1,
            Err(err) => {
                log::warn!("recording aborted: {err}");
                self.active = None;
            }
        }
        None
    }

    /// Close the capture early, if one is running.
    pub fn finish(&mut self) -> Option<PathBuf> {
        let mut recording = self.active.take()?;
        if let Err(err) = recording.writer.flush() {
            log::warn!("could not finish recording: {err}");
            return None;
        }
        log::info!(
            "recording saved: {} ({} frames)",
            recording.path.display(),
            recording.frames
        );
        Some(recording.path)
    }
}

fn sgr_color(out: &mut String, color: Color, foreground: bool) {
    let base = if foreground { 38 } else { 48 };
    match color {
        Color::Rgb(r, g, b) => {
            let _ = write!(out, "\x1b[{base};2;{r};{g};{b}m");
        }
        Color::Indexed(i) => {
            let _ = write!(out, "\x1b[{base};5;{i}m");
        }
        _ => {
            let _ = write!(out, "\x1b[{}m", base + 1);
        }
    }
}

/// Redraw the whole buffer from the top-left corner.
fn to_ansi(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::with_capacity(area.width as usize * area.height as usize * 4);
    out.push_str("\x1b[H");
    for y in area.top()..area.bottom() {
        let mut fg = None;
        let mut bg = None;
        for x in area.left()..area.right() {
            let cell = &buffer[(x, y)];
            if fg != Some(cell.fg) {
                sgr_color(&mut out, cell.fg, true);
                fg = Some(cell.fg);
            }
            if bg != Some(cell.bg) {
                sgr_color(&mut out, cell.bg, false);
                bg = Some(cell.bg);
            }
            out.push_str(cell.symbol());
        }
        out.push_str("\x1b[0m");
        if y + 1 < area.bottom() {
            out.push_str("\r\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::layout::Rect;

    fn dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("galaxy-rec-{}-{name}", std::process::id()))
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 2, 14, 20, 30, 0).unwrap()
    }

    #[test]
    fn test_ansi_frame() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 2, 2));
        buffer[(0, 0)].set_char('a').set_fg(Color::Rgb(1, 2, 3));
        let ansi = to_ansi(&buffer);
        assert!(ansi.starts_with("\x1b[H\x1b[38;2;1;2;3m"));
        assert!(ansi.contains('a'));
        assert_eq!(ansi.matches("\r\n").count(), 1);
    }

    #[test]
    fn test_capture_writes_cast() {
        let directory = dir("cast");
        let mut recorder = Recorder::new(directory.clone(), Duration::from_secs(5));
        let path = recorder.start(4, 2, now()).unwrap();
        assert_eq!(path.file_name().unwrap(), "galaxy-20240214-203000.cast");
        assert!(matches!(recorder.start(4, 2, now()), Err(RecordError::Busy)));

        let buffer = Buffer::empty(Rect::new(0, 0, 4, 2));
        assert_eq!(recorder.capture(&buffer, Duration::from_millis(0)), None);
        assert_eq!(recorder.capture(&buffer, Duration::from_millis(33)), None);
        assert_eq!(recorder.capture(&buffer, Duration::from_secs(5)), Some(path.clone()));
        assert!(!recorder.is_recording());

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(header["version"], 2);
        assert_eq!(header["width"], 4);
        let event: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(event[1], "o");
        assert!((event[0].as_f64().unwrap() - 0.033).abs() < 1e-9);

        fs::remove_dir_all(directory).unwrap();
    }

    #[test]
    fn test_capture_without_recording_is_noop() {
        let mut recorder = Recorder::new(dir("idle"), Duration::from_secs(5));
        let buffer = Buffer::empty(Rect::new(0, 0, 1, 1));
        assert_eq!(recorder.capture(&buffer, Duration::ZERO), None);
        assert_eq!(recorder.finish(), None);
    }

    #[test]
    fn test_unwritable_directory_is_error() {
        let file = dir("blocker");
        fs::write(&file, b"").unwrap();
        let mut recorder = Recorder::new(file.join("sub"), Duration::from_secs(5));
        assert!(matches!(recorder.start(1, 1, now()), Err(RecordError::Io(_))));
        assert!(!recorder.is_recording());
        fs::remove_file(file).unwrap();
    }
}

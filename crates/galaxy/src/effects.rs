//! Terminal implementation of the scene's UI side effects.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use galaxy_config::AudioConfig;
use galaxy_core::CursorKind;
use galaxy_scene::UiEffects;

/// Tracks the cursor for the view and runs the soundtrack through an
/// external player process.
#[derive(Debug)]
pub struct TerminalEffects {
    cursor: CursorKind,
    player: Vec<String>,
    soundtrack: PathBuf,
    volume: f32,
    child: Option<Child>,
}

impl TerminalEffects {
    /// Effects playing `soundtrack` with the configured player.
    pub fn new(audio: &AudioConfig, soundtrack: PathBuf) -> Self {
        Self {
            cursor: CursorKind::Default,
            player: audio.player.clone(),
            soundtrack,
            volume: audio.volume.clamp(0.0, 1.0),
            child: None,
        }
    }

    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    /// Whether a player process is running.
    pub fn is_playing(&mut self) -> bool {
        match &mut self.child {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn command(&self) -> Option<Command> {
        let (program, args) = self.player.split_first()?;
        let volume = ((self.volume * 100.0).round() as u32).to_string();
        let path = self.soundtrack.to_string_lossy();
        let mut command = Command::new(program);
        command
            .args(
                args.iter()
                    .map(|arg| arg.replace("{path}", &path).replace("{volume}", &volume)),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Some(command)
    }
}

impl UiEffects for TerminalEffects {
    fn set_cursor(&mut self, kind: CursorKind) {
        self.cursor = kind;
    }

    fn play_ambient(&mut self) {
        if self.is_playing() {
            return;
        }
        if !self.soundtrack.exists() {
            log::warn!("soundtrack {} not found", self.soundtrack.display());
            return;
        }
        let Some(mut command) = self.command() else {
            log::warn!("no audio player configured");
            return;
        };
        match command.spawn() {
            Ok(child) => {
                log::info!("ambient audio started (pid {})", child.id());
                self.child = Some(child);
            }
            Err(err) => log::warn!("audio playback failed: {err}"),
        }
    }

    fn stop_ambient(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                log::debug!("audio player already gone: {err}");
            }
            if let Err(err) = child.wait() {
                log::debug!("could not reap audio player: {err}");
            }
            log::info!("ambient audio stopped");
        }
    }
}

impl Drop for TerminalEffects {
    fn drop(&mut self) {
        self.stop_ambient();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(player: &[&str]) -> AudioConfig {
        AudioConfig {
            path: PathBuf::from("music.mp3"),
            volume: 0.3,
            player: player.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_command_substitution() {
        let effects = TerminalEffects::new(
            &audio(&["player", "--vol", "{volume}", "{path}"]),
            PathBuf::from("/music/song.mp3"),
        );
        let command = effects.command().unwrap();
        assert_eq!(command.get_program(), "player");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["--vol", "30", "/music/song.mp3"]);
    }

    #[test]
    fn test_empty_player_has_no_command() {
        let effects = TerminalEffects::new(&audio(&[]), PathBuf::from("x.mp3"));
        assert!(effects.command().is_none());
    }

    #[test]
    fn test_cursor_tracks_last_write() {
        let mut effects = TerminalEffects::new(&audio(&[]), PathBuf::from("x.mp3"));
        effects.set_cursor(CursorKind::Pointer);
        effects.set_cursor(CursorKind::Default);
        effects.set_cursor(CursorKind::Pointer);
        assert_eq!(effects.cursor(), CursorKind::Pointer);
    }

    #[test]
    fn test_missing_soundtrack_is_not_fatal() {
        let mut effects = TerminalEffects::new(
            &audio(&["player", "{path}"]),
            PathBuf::from("/no/such/music.mp3"),
        );
        effects.play_ambient();
        assert!(!effects.is_playing());
        effects.stop_ambient();
    }

    #[test]
    fn test_unknown_player_is_not_fatal() {
        let soundtrack = std::env::temp_dir();
        let mut effects = TerminalEffects::new(
            &audio(&["galaxy-no-such-player-binary", "{path}"]),
            soundtrack,
        );
        effects.play_ambient();
        assert!(!effects.is_playing());
    }

    #[cfg(unix)]
    #[test]
    fn test_play_then_stop_kills_player() {
        let soundtrack = std::env::temp_dir();
        let mut effects = TerminalEffects::new(&audio(&["sleep", "30"]), soundtrack);
        effects.play_ambient();
        assert!(effects.is_playing());
        effects.play_ambient();
        effects.stop_ambient();
        assert!(!effects.is_playing());
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_reaps_player_that_already_exited() {
        let soundtrack = std::env::temp_dir();
        let mut effects = TerminalEffects::new(&audio(&["true"]), soundtrack);
        effects.play_ambient();
        std::thread::sleep(std::time::Duration::from_millis(100));
        effects.stop_ambient();
        assert!(!effects.is_playing());
        effects.stop_ambient();
    }
}

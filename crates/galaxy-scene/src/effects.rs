//! Side effects the scene requests from the presentation layer.

use galaxy_core::CursorKind;

/// Process-wide UI side effects, injected instead of touched as globals.
pub trait UiEffects {
    /// Change the pointer cursor. Last writer wins.
    fn set_cursor(&mut self, kind: CursorKind);

    /// Start the ambient soundtrack. Failures are logged, never returned.
    fn play_ambient(&mut self);

    /// Stop the ambient soundtrack.
    fn stop_ambient(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Effects sink that just remembers what was asked of it.
    #[derive(Debug, Default)]
    pub struct RecordedEffects {
        pub cursor: CursorKind,
        pub cursor_changes: usize,
        pub ambient_playing: bool,
    }

    impl UiEffects for RecordedEffects {
        fn set_cursor(&mut self, kind: CursorKind) {
            self.cursor = kind;
            self.cursor_changes += 1;
        }

        fn play_ambient(&mut self) {
            self.ambient_playing = true;
        }

        fn stop_ambient(&mut self) {
            self.ambient_playing = false;
        }
    }
}

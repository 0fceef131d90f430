//! Containment for failures while stepping or drawing a frame.
//!
//! A failed frame switches the app to a static error screen instead of
//! tearing down the terminal.

use std::any::Any;
use std::cell::Cell;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

thread_local! {
    static RECOVERING: Cell<bool> = const { Cell::new(false) };
}

/// Wrap the current panic hook so panics caught by [`run_with_recovery`]
/// are logged instead of printed over the screen.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if RECOVERING.with(Cell::get) {
            log::error!("frame panicked: {info}");
        } else {
            previous(info);
        }
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning both error returns and panics into a [`RenderError`].
pub fn run_with_recovery<T, E: Display>(
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, RenderError> {
    let was_recovering = RECOVERING.with(|r| r.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    RECOVERING.with(|r| r.set(was_recovering));

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            log::error!("frame failed: {err}");
            Err(RenderError::Failed(err.to_string()))
        }
        Err(payload) => Err(RenderError::Panicked(panic_message(payload.as_ref()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_through() {
        assert_eq!(run_with_recovery(|| Ok::<_, String>(7)), Ok(7));
    }

    #[test]
    fn test_error_is_captured() {
        let result = run_with_recovery(|| Err::<(), _>("no frame"));
        assert_eq!(result, Err(RenderError::Failed("no frame".into())));
    }

    #[test]
    fn test_panic_is_captured() {
        let result = run_with_recovery(|| -> Result<(), String> { panic!("boom {}", 1) });
        assert_eq!(result, Err(RenderError::Panicked("boom 1".into())));
        assert_eq!(result.unwrap_err().to_string(), "panicked: boom 1");
    }

    #[test]
    fn test_static_str_panic() {
        let result = run_with_recovery(|| -> Result<(), String> { panic!("static") });
        assert_eq!(result, Err(RenderError::Panicked("static".into())));
    }
}

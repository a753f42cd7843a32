//! Process-wide library lifecycle.

use log::{debug, warn};
use once_cell::sync::OnceCell;

use crate::context::Context;
use crate::errors::U2fError;

/// Library initialization mode.
///
/// Observability only: verification outcomes are identical in both modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// No diagnostic output.
    Production,
    /// Verbose diagnostics to the operational log.
    Debug,
}

static STARTED: OnceCell<Mode> = OnceCell::new();

/// Handle for the initialized library.
///
/// [`Server::start`] must complete before the first context is opened, and
/// [`Server::stop`] must run only after every context has been closed. The
/// ordering is a caller obligation enforced by documentation, not by runtime
/// checks.
#[derive(Debug)]
pub struct Server {
    mode: Mode,
}

impl Server {
    /// Initialize the library.
    ///
    /// In [`Mode::Debug`] a verbose `env_logger` backend is installed with a
    /// default filter of `debug`, overridable through `RUST_LOG`. In
    /// [`Mode::Production`] logging is left to the host application.
    /// Initialization happens once per process; a later call with a
    /// different mode is a logged no-op that still returns a usable handle.
    ///
    /// # Errors
    /// Reserved for backend initialization failures; the current
    /// implementation always succeeds.
    pub fn start(mode: Mode) -> Result<Self, U2fError> {
        let installed = *STARTED.get_or_init(|| {
            if mode == Mode::Debug {
                // The host application may already own the global logger;
                // losing that race is fine.
                let _ = env_logger::Builder::from_env(
                    env_logger::Env::default().default_filter_or("debug"),
                )
                .try_init();
            }
            mode
        });
        if installed == mode {
            debug!("u2f server started in {mode:?} mode");
        } else {
            warn!("u2f server already started in {installed:?} mode; {mode:?} ignored");
        }
        Ok(Self { mode: installed })
    }

    /// The mode the library was initialized with.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Open a fresh context for one registration or authentication.
    #[must_use]
    pub fn open(&self) -> Context {
        Context::new()
    }

    /// Release a context. Equivalent to dropping it; provided as an explicit
    /// release point for callers that pair every `open` with a `close`.
    pub fn close(&self, ctx: Context) {
        ctx.close();
    }

    /// Tear the library down. Must follow the last context close.
    pub fn stop(self) {
        debug!("u2f server stopped");
    }
}

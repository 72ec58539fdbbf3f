//! Installing and removing the panic hook

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

use super::attended::HookEnvironment;
use super::handler::{HandlerState, PanicHandler, PreviousHook};
use crate::classify::Classifier;
use crate::config::MistakeSettings;
use crate::debugger::{Launcher, select_backend};
use crate::logging::init_verbose_logging;
use crate::trace::Formatter;

/// Hook that was in place before `install`, kept for `uninstall`
static PREVIOUS: Lazy<Mutex<Option<PreviousHook>>> = Lazy::new(|| Mutex::new(None));

/// Result of [`install`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        /// Debugger chosen for post-mortem sessions
        backend: Option<String>,
    },
    /// `MISTAKE_DISABLE=1`
    Disabled,
    /// Not every standard stream is a terminal
    NotAttended,
    AlreadyInstalled,
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

/// Install the hook for the current process environment
pub fn install(settings: MistakeSettings) -> InstallOutcome {
    install_with(settings, HookEnvironment::detect())
}

/// Print configuration problems found while reading the environment.
///
/// Settings are usually resolved before any tracing subscriber exists, so
/// these go straight to the writer.
pub fn report_config_warnings(settings: &MistakeSettings, out: &mut dyn Write) {
    for warning in &settings.warnings {
        let _ = writeln!(out, "mistake: warning: {}", warning);
    }
}

/// Install the hook with explicit session facts
pub fn install_with(settings: MistakeSettings, env: HookEnvironment) -> InstallOutcome {
    report_config_warnings(&settings, &mut std::io::stderr());

    if settings.disabled {
        tracing::debug!("hook disabled by environment");
        return InstallOutcome::Disabled;
    }
    if !env.attended {
        tracing::debug!("session is not attended, leaving the panic hook alone");
        return InstallOutcome::NotAttended;
    }

    let mut previous_slot = PREVIOUS.lock();
    if previous_slot.is_some() {
        return InstallOutcome::AlreadyInstalled;
    }

    if settings.verbose {
        init_verbose_logging();
    }

    let backend = if settings.debug_uncaught {
        let backend = select_backend(settings.debugger);
        if backend.is_none() {
            tracing::warn!("no gdb or lldb on PATH; panics will only be printed");
        }
        backend
    } else {
        None
    };
    let backend_name = backend.as_ref().map(|b| b.name().to_string());

    let classifier = Classifier::from_settings(&settings);
    let state = HandlerState::new(
        settings,
        classifier,
        Formatter::default(),
        Launcher::new(backend),
    );

    let previous: PreviousHook = Arc::from(std::panic::take_hook());
    *previous_slot = Some(Arc::clone(&previous));

    let handler = Arc::new(
        PanicHandler::new(state)
            .with_previous(previous)
            .with_tracer_check(env.is_traced),
    );
    std::panic::set_hook(Box::new(move |info| handler.handle(info)));

    tracing::debug!("panic hook installed (debugger: {:?})", backend_name);
    InstallOutcome::Installed {
        backend: backend_name,
    }
}

/// Put back the hook that was in place before `install`.
///
/// Returns false when nothing was installed.
pub fn uninstall() -> bool {
    let Some(previous) = PREVIOUS.lock().take() else {
        return false;
    };
    std::panic::set_hook(Box::new(move |info| previous(info)));
    true
}

/// Whether the hook is currently installed
pub fn is_installed() -> bool {
    PREVIOUS.lock().is_some()
}

//! Logging for formcraft.
//!
//! Composers and bound fields emit [`tracing`] events while resolving a
//! render; [`setup_logging`] installs a subscriber for them from
//! [`Settings`](crate::settings::Settings), and [`render_span`] groups the
//! events of one field render.

use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Directive used when `log_level` does not parse.
const FALLBACK_DIRECTIVE: &str = "info";

/// Builds the filter for `settings.log_level`.
///
/// The level may be a bare level (`"debug"`) or a full directive list
/// (`"warn,formcraft_composer=trace"`).
pub fn log_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// Installs the global subscriber: pretty output in debug mode, JSON lines
/// otherwise.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case that one is left in place.
pub fn setup_logging(settings: &Settings) -> bool {
    use tracing_subscriber::fmt;

    let filter = log_filter(settings);
    let installed = if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .json()
            .try_init()
    };
    installed.is_ok()
}

/// Creates a tracing span covering the rendering of one form field.
///
/// # Examples
///
/// ```
/// use formcraft_core::logging::render_span;
///
/// let span = render_span("formcraft.composer.BaseComposer", "email");
/// let _guard = span.enter();
/// tracing::debug!("rendering");
/// ```
pub fn render_span(composer: &str, field: &str) -> tracing::Span {
    tracing::debug_span!("render_field", composer, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn settings(log_level: &str, debug: bool) -> Settings {
        Settings {
            log_level: log_level.to_string(),
            debug,
            ..Settings::default()
        }
    }

    #[test]
    fn test_log_filter_accepts_directives() {
        let filter = log_filter(&settings("warn,formcraft_composer=trace", false));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_log_filter_falls_back_on_garbage() {
        let filter = log_filter(&settings("formcraft=loud", true));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_setup_logging_installs_once() {
        assert!(setup_logging(&settings("debug", true)));
        assert!(!setup_logging(&settings("info", false)));
    }

    #[test]
    fn test_render_span_is_enterable() {
        let span = render_span("formcraft.composers.Bootstrap4", "email");
        let _guard = span.enter();
        tracing::debug!("inside");
    }
}

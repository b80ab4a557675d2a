//! User-visible connection error reporting

use tracing::error;

/// Surfaces blocking connection errors to the user
pub trait ConnectionNotifier: Send + Sync {
    fn connection_error(&self, title: &str, message: &str);
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ConnectionNotifier for LogNotifier {
    fn connection_error(&self, title: &str, message: &str) {
        error!(%title, "{}", message);
    }
}

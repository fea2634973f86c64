pub mod mock;
pub mod util;

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the test subscriber once per process, filtered by `LOG_LEVEL`
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_test_writer();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();

        tracing::debug!("Tracing initialized successfully");
    });
}

pub use mock::{envelope, page_envelope, MockForumApi};
pub use util::{make_comment, make_notification, make_post, make_user};

//! Boot — logging init, config load, session and doc index creation.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{ConfigError, ParserConfig};
use crate::docs::DocIndex;
use crate::state::{LogSession, SharedSession};

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout carries command output only.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autolog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config, let the caller adjust it, then build the session plus
/// documentation index.
///
/// A missing or unreadable documentation file is not fatal; every lookup
/// then resolves to the default URL.
pub fn boot(customize: impl FnOnce(&mut ParserConfig)) -> Result<(SharedSession, DocIndex), ConfigError> {
    info!("Starting autolog v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ParserConfig::load()?;
    customize(&mut config);
    boot_with(config)
}

/// Like [`boot`] with an already resolved configuration.
pub fn boot_with(config: ParserConfig) -> Result<(SharedSession, DocIndex), ConfigError> {
    config.validate()?;
    info!(
        "Loaded configuration: chunk_size={}B, page_size={}, poll_interval={}ms",
        config.chunk_size_bytes, config.page_size, config.poll_interval_ms
    );

    let docs = match DocIndex::load(&config.docs_file, config.default_doc_url.clone()) {
        Ok(docs) => {
            info!("Loaded {} documentation links", docs.len());
            docs
        }
        Err(e) => {
            warn!("Documentation links unavailable: {}", e);
            DocIndex::new(config.default_doc_url.clone())
        }
    };

    let session = Arc::new(LogSession::new(config));
    Ok((session, docs))
}

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use autolog::cli::{Cli, Format};
use autolog::output;
use autolog::runtime::boot;

#[tokio::main]
async fn main() -> Result<()> {
    boot::init_logging();
    let cli = Cli::parse();

    let (session, docs) = boot::boot(|config| cli.apply(config)).context("Failed to load configuration")?;

    let handle = session
        .open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    let mut last_percent = -1.0;
    let summary = handle
        .wait_with_heartbeat(|progress| {
            let percent = progress.percent.floor();
            if percent > last_percent {
                info!("Loading {}: {:.0}%", cli.file.display(), percent);
                last_percent = percent;
            }
        })
        .await
        .with_context(|| format!("Failed to ingest {}", cli.file.display()))?;
    debug!(metrics = ?summary.metrics, "ingestion complete");

    let mut stdout = io::stdout().lock();

    if let Some(id) = cli.detail {
        let rendered = match cli.format {
            Format::Json => session.detail_json(&id)?,
            Format::Table => session.detail_text(&id)?,
        };
        let doc_url = {
            let data = session.read()?;
            data.store
                .get(&id)
                .map(|stored| docs.lookup(&stored.record).to_string())
                .unwrap_or_else(|| docs.default_url().to_string())
        };
        output::write_detail(&mut stdout, cli.format, &rendered, &doc_url)?;
        return Ok(());
    }

    output::write_summary(&mut stdout, cli.format, &summary)?;
    output::write_system_config(&mut stdout, cli.format, &session.system_config()?)?;

    let spec = cli.filter_spec();
    let page = if cli.fill {
        session.filtered_page(cli.offset, &spec)?
    } else {
        session.page(cli.offset, &spec)?
    };
    output::write_page(&mut stdout, cli.format, &page, &docs)?;
    stdout.flush()?;

    Ok(())
}

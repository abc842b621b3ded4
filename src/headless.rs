use std::io::Write;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data::cache::DatasetCache;
use crate::data::loader::SourceLoader;
use crate::pipeline::render;
use crate::router::PageOutput;

/// Load the dataset once, evaluate the requested page and print it.
pub fn run(config: &Config) -> Result<()> {
    let loader = SourceLoader::new(config.dataset_source(), config.timeout())?;
    let mut cache = DatasetCache::new(loader, config.ttl());
    let dataset = cache.get()?;

    let output = render(&dataset, &config.render_request());
    log::info!(
        "{} page: {} of {} repositories visible",
        output.page.label(),
        output.visible,
        dataset.len()
    );

    let stdout = std::io::stdout();
    write_output(stdout.lock(), &output, config.pretty)
}

fn write_output<W: Write>(mut out: W, output: &PageOutput, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, output)
    } else {
        serde_json::to_writer(&mut out, output)
    }
    .context("serializing page output")?;
    writeln!(out).context("writing page output")?;
    Ok(())
}

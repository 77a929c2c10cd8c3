use std::{fs, thread, time::Duration};

use anyhow::Context;
use clap::Parser;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use url::Url;

use crate::{
    cli::{Cli, Command, CommonArgs, Source},
    extract::{ExtractOptions, extract},
    page::PageModel,
    payload::CitationPayload,
};

mod author;
mod cli;
mod export;
mod extract;
mod page;
mod payload;
mod sitehooks;
mod style;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();
    match args.command {
        Command::Cite {
            from,
            style,
            accessed,
            sentence_case,
            corporate_author,
            pdf_suffix,
            common,
        } => {
            let render_opts = style::RenderOptions {
                include_accessed: accessed,
                sentence_case,
                corporate_author,
                pdf_suffix,
            };
            process(&from, &common, |payload| {
                Ok(style::render(payload, style, &render_opts))
            });
        }
        Command::Export {
            from,
            format,
            common,
        } => {
            process(&from, &common, |payload| export::export(payload, format));
        }
    }
    Ok(())
}

/// Run every source through extraction and rendering; per-source failures go
/// to stderr and the run ends with a `✓ n ✗ m` summary there.
fn process<F>(sources: &[Source], common: &CommonArgs, render: F)
where
    F: Fn(&CitationPayload) -> anyhow::Result<String>,
{
    let overrides = common.overrides();
    let mut ok = 0usize;
    let mut failed = 0usize;
    for source in sources {
        let result = load(source, common).and_then(|payload| {
            let payload = if overrides.is_empty() {
                payload
            } else {
                payload.with_overrides(&overrides)
            };
            render(&payload)
        });
        match result {
            Ok(text) => {
                println!("{text}");
                ok += 1;
            }
            Err(err) => {
                eprintln!("{err:#}");
                failed += 1;
            }
        }
    }
    eprintln!("{} {ok} {} {failed}", "✓".green(), "✗".red());
}

fn load(source: &Source, common: &CommonArgs) -> anyhow::Result<CitationPayload> {
    let extract_opts = ExtractOptions::default();
    match source {
        Source::File(path) => {
            let html = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let page = PageModel::from_html(common.page_url.clone(), &html);
            Ok(extract(&page, &extract_opts))
        }
        Source::Url(url) => {
            let html = fetch(url)?;
            let page = PageModel::from_html(Some(url.clone()), &html);
            let payload = extract(&page, &extract_opts);
            if payload.has_signal() || common.recheck_ms == 0 {
                return Ok(payload);
            }
            // One bounded observation window, one deferred re-check. The
            // second pass is final either way.
            log::warn!(
                "no usable signal from {url}; re-checking once after {}ms",
                common.recheck_ms
            );
            thread::sleep(Duration::from_millis(common.recheck_ms));
            let html = fetch(url)?;
            let page = PageModel::from_html(Some(url.clone()), &html);
            Ok(extract(&page, &extract_opts))
        }
    }
}

fn fetch(url: &Url) -> anyhow::Result<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("fetching {url}"));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(5)))
        .timeout_global(Some(Duration::from_secs(15)))
        .build();
    let agent = ureq::Agent::new_with_config(config);
    let result = agent
        .get(url.as_str())
        .header(
            "User-Agent",
            "Mozilla/5.0 (compatible; cite/0.1; +https://example.org)",
        )
        .call()
        .with_context(|| format!("failed request for URL {url}"));
    spinner.finish_and_clear();
    result?
        .into_body()
        .read_to_string()
        .context("failed to read response body")
}

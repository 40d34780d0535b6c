use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{error, info, warn};

mod cli;

use cli::{Cli, Commands, LayoutSource};
use pkgform::{
    config::Config,
    errors::FormError,
    form::{FieldRenderer, PackageForm, PackageOptions, SubmitOutcome},
    layout::{self, LayoutSpec},
    tui,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "pkgform=info");
    }

    let config = Config::from_env()?;
    config.validate()?;

    // Log to a file only, so the terminal UI is left alone
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .context("PKGFORM_LOG_FILE must name a file")?;
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();
    let renderer = FieldRenderer::from_config(&config);

    match cli.command {
        Commands::Edit { source, output } => {
            let layout = resolve_layout(&source).await?;
            let mut form = PackageForm::new(&layout, renderer);

            match tui::run_tui(&mut form, config.tick_interval()).await {
                Ok(Some(options)) => write_options(&options, output.as_deref()).await?,
                Ok(None) => info!("No options submitted"),
                Err(e) => {
                    error!("TUI failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Render { source } => {
            let layout = resolve_layout(&source).await?;
            let form = PackageForm::new(&layout, renderer);
            println!("{}", render_listing(&form));
        }

        Commands::Check { source, values } => {
            let layout = resolve_layout(&source).await?;
            let mut form = PackageForm::new(&layout, renderer);

            let json = tokio::fs::read_to_string(&values)
                .await
                .with_context(|| format!("Cannot read values file {}", values.display()))?;
            let values: PackageOptions =
                serde_json::from_str(&json).map_err(FormError::ValuesParse)?;

            for name in form.apply_values(&values) {
                warn!("No field matches value '{}'", name);
                println!("warning: no field matches '{}'", name);
            }

            match form.submit() {
                SubmitOutcome::Accepted(options) => {
                    println!("{}", serde_json::to_string_pretty(&options)?);
                }
                SubmitOutcome::Rejected { invalid } => {
                    for node in &invalid {
                        if let Some(slot) = form.tree().field(*node) {
                            println!(
                                "{}: {}",
                                slot.descriptor().label,
                                slot.element.validation_message()
                            );
                        }
                    }
                    return Err(anyhow::anyhow!("{} invalid field(s)", invalid.len()));
                }
            }
        }
    }

    Ok(())
}

async fn resolve_layout(source: &LayoutSource) -> Result<LayoutSpec> {
    let layout = match &source.layout {
        Some(path) => layout::load_layout(path).await?,
        None => layout::builtin(&source.builtin)?,
    };
    Ok(layout)
}

async fn write_options(options: &PackageOptions, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(options)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Cannot write options to {}", path.display()))?;
            info!("Wrote package options to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Markup of every field, with section headings.
fn render_listing(form: &PackageForm) -> String {
    let tree = form.tree();
    let mut out = Vec::new();
    for id in tree.node_ids() {
        let pad = "  ".repeat(tree.depth(id));
        if let Some(section) = tree.disclosure(id) {
            let state = if section.expanded { "expanded" } else { "collapsed" };
            out.push(format!("{}# {} ({})", pad, section.title, state));
        } else if let Some(slot) = tree.field(id) {
            let markup = form.renderer().render(&slot.field);
            for line in markup.to_string().lines() {
                out.push(format!("{}{}", pad, line));
            }
        }
    }
    out.join("\n")
}

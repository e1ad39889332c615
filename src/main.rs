use anyhow::Result;
use catalog_sync::{config, sync, translator, workspace};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_sync=info".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;

    // Layout problems abort before any language is processed
    let plan = workspace::resolve(&config.folders)?;

    info!("translating from:  {}", plan.template.path.display());
    info!("source language:   {}", plan.source_language());
    info!("translating to:    {:?}", plan.target_languages());
    info!("translator:        {}", config.translator.name());
    if plan.updates.is_some() {
        info!("Also updating all strings that are different in `updates` folder from `source_of_truth`");
    }

    let client = reqwest::Client::new();
    let translator = translator::from_config(&config.translator, client, plan.source_language());

    let summary = sync::run(&plan, translator).await?;

    for report in &summary.reports {
        println!("{}", report);
    }
    info!("{}", summary.tally());

    if summary.has_failures() {
        anyhow::bail!("{} of {} languages failed", summary.failed(), summary.reports.len());
    }

    Ok(())
}

//! Preview binary - shows what each language would send for translation
//!
//! Nothing is translated and no catalog is written, so no API key is needed.
//!
//! Usage:
//!   cargo run --bin preview
//!
//! Optional environment variables:
//! - SOURCE_OF_TRUTH_DIR (defaults to ./source_of_truth/)
//! - OUTPUT_DIR (defaults to ./output/)
//! - UPDATES_DIR (defaults to ./updates/)

use anyhow::Result;
use catalog_sync::{config::Folders, sync, workspace};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_sync=info".parse()?),
        )
        .init();

    let plan = workspace::resolve(&Folders::from_env())?;
    info!(
        "Previewing {} -> {:?}",
        plan.source_language(),
        plan.target_languages()
    );

    for (language, request) in sync::preview(&plan).await? {
        println!(
            "\n========== {} ({} strings) ==========",
            language,
            request.entry_count()
        );
        println!("{}", request.to_pretty_json()?);
    }

    Ok(())
}

//! Run orchestration: load, reconcile and persist every target language.

use crate::catalog::Catalog;
use crate::reconcile::{plan_request, Outcome, Reconciler};
use crate::report::{LanguageReport, RunSummary, Status};
use crate::store::{load_catalog, save_catalog};
use crate::translator::Translator;
use crate::workspace::{CatalogFile, RunPlan};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

async fn load_sources(plan: &RunPlan) -> Result<(Catalog, Option<Catalog>)> {
    let template = load_catalog(&plan.template.path)
        .await
        .context("Failed to load source of truth")?;
    let updates = match &plan.updates {
        Some(updates) => Some(
            load_catalog(&updates.path)
                .await
                .context("Failed to load updates")?,
        ),
        None => None,
    };
    Ok((template, updates))
}

/// Reconcile every target language of `plan` concurrently.
///
/// A template or updates catalog that cannot be loaded aborts the run before
/// any language is touched. Anything that goes wrong for one language (load,
/// translation, save) only fails that language.
pub async fn run(plan: &RunPlan, translator: Arc<dyn Translator>) -> Result<RunSummary> {
    let (template, updates) = load_sources(plan).await?;
    let reconciler = Reconciler::new(template, updates, translator);

    let reports = join_all(
        plan.targets
            .iter()
            .map(|target| sync_language(&reconciler, target)),
    )
    .await;

    Ok(RunSummary { reports })
}

async fn sync_language(reconciler: &Reconciler, target: &CatalogFile) -> LanguageReport {
    let status = match load_catalog(&target.path).await {
        Err(e) => Status::Failed(format!("{:#}", e)),
        Ok(catalog) => match reconciler.reconcile(&target.language, catalog).await {
            Outcome::Unchanged => Status::Unchanged,
            Outcome::Updated(catalog) => match save_catalog(&target.path, &catalog).await {
                Ok(()) => Status::Updated,
                Err(e) => Status::Failed(format!("{:#}", e)),
            },
            Outcome::Failed(e) => Status::Failed(e.report()),
        },
    };

    match &status {
        Status::Failed(detail) => error!("{} failed: {}", target.language, detail),
        Status::Updated => info!("✓ {} updated ({})", target.language, target.path.display()),
        Status::Unchanged => info!("{} unchanged", target.language),
    }

    LanguageReport {
        language: target.language.clone(),
        status,
    }
}

/// The translation request each target language would send, without sending it.
pub async fn preview(plan: &RunPlan) -> Result<Vec<(String, Catalog)>> {
    let (template, updates) = load_sources(plan).await?;

    let mut requests = Vec::with_capacity(plan.targets.len());
    for target in &plan.targets {
        let catalog = load_catalog(&target.path).await?;
        requests.push((
            target.language.clone(),
            plan_request(&template, updates.as_ref(), &catalog),
        ));
    }
    Ok(requests)
}

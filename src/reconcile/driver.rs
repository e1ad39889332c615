use super::diff::{compose_request, diff, select_updates};
use super::merge::{merge, prune};
use crate::catalog::Catalog;
use crate::translator::{TranslateError, Translator};
use crate::validator;
use std::sync::Arc;
use tracing::{debug, warn};

/// How one language's reconciliation ended.
#[derive(Debug)]
pub enum Outcome {
    /// The reconciled catalog equals what the language already had.
    Unchanged,
    /// The reconciled catalog differs; it is the language's new content.
    Updated(Catalog),
    /// The translator failed; the language keeps its previous catalog.
    Failed(TranslateError),
}

/// Entries of `template` that `target` needs translated: missing or empty
/// ones, plus revised ones when an updates catalog is given.
pub fn plan_request(template: &Catalog, updates: Option<&Catalog>, target: &Catalog) -> Catalog {
    let missing = diff(template, target);
    match updates {
        Some(updates) => compose_request(missing, select_updates(template, updates)),
        None => missing,
    }
}

/// Reconciles target catalogs against one template (and optional updates).
///
/// Holds no per-language state, so any number of languages can be reconciled
/// concurrently through a shared reference.
pub struct Reconciler {
    template: Catalog,
    updates: Option<Catalog>,
    translator: Arc<dyn Translator>,
}

impl Reconciler {
    pub fn new(template: Catalog, updates: Option<Catalog>, translator: Arc<dyn Translator>) -> Self {
        Self {
            template,
            updates,
            translator,
        }
    }

    pub fn plan_request(&self, target: &Catalog) -> Catalog {
        plan_request(&self.template, self.updates.as_ref(), target)
    }

    /// Run the full pipeline for one language.
    ///
    /// diff -> request -> translate -> merge -> prune -> compare with the
    /// catalog as it was on entry. On translator failure nothing of the
    /// translation is applied and the caller keeps its stored catalog.
    pub async fn reconcile(&self, language: &str, target: Catalog) -> Outcome {
        let snapshot = target.clone();

        let request = self.plan_request(&target);
        if request.has_no_entries() {
            debug!("{}: nothing to translate", language);
        } else {
            debug!(
                "{}: requesting {} entries across {} categories",
                language,
                request.entry_count(),
                request.category_names().count()
            );
        }

        let translated = match self.translator.translate(request.clone(), language).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("{}: translation failed: {}", language, e);
                return Outcome::Failed(e);
            }
        };

        let report = validator::check_result(&request, &translated);
        if !report.is_clean() {
            for finding in report.errors.iter().chain(&report.warnings) {
                warn!("{}: {}", language, finding);
            }
        }

        let reconciled = prune(&self.template, merge(target, translated));

        if reconciled == snapshot {
            Outcome::Unchanged
        } else {
            Outcome::Updated(reconciled)
        }
    }
}

//! Stages that rewrite a target catalog: folding in translations, then pruning.

use crate::catalog::Catalog;

/// Fold `additions` into `base`, overwriting only the supplied keys.
///
/// Missing categories are created; nothing is ever removed from `base`.
pub fn merge(mut base: Catalog, additions: Catalog) -> Catalog {
    for (category, entries) in additions {
        base.category_mut(&category).extend(entries);
    }
    base
}

/// Drop every category and key of `target` that `template` does not define.
///
/// Run after [`merge`] so the final key set is what gets pruned.
pub fn prune(template: &Catalog, mut target: Catalog) -> Catalog {
    target.retain(
        |category| template.contains_category(category),
        |category, key| {
            template
                .category(category)
                .is_some_and(|entries| entries.contains_key(key))
        },
    );
    target
}

//! Read-only comparisons that decide what a target language needs translated.

use crate::catalog::{is_untranslated, Catalog};

/// Entries of `template` that `target` lacks or holds empty.
///
/// The result always lists every template category, possibly with no keys,
/// and carries the template's value for each selected key.
pub fn diff(template: &Catalog, target: &Catalog) -> Catalog {
    let mut missing = Catalog::new();

    for (category, entries) in template {
        let selected = missing.category_mut(category);
        for (key, value) in entries {
            if is_untranslated(target.slot(category, key)) {
                selected.insert(key.clone(), value.clone());
            }
        }
    }

    missing
}

/// Entries whose source text was revised in `updates` compared to `template`.
///
/// Only template keys are considered. A key counts as revised when `updates`
/// has its category and holds a different value for it; keys `updates` does
/// not mention are not revisions. Selected keys carry the `updates` value.
pub fn select_updates(template: &Catalog, updates: &Catalog) -> Catalog {
    let mut revised = Catalog::new();

    for (category, entries) in template {
        let selected = revised.category_mut(category);
        let Some(revisions) = updates.category(category) else {
            continue;
        };
        for (key, value) in entries {
            match revisions.get(key) {
                Some(revision) if revision != value => {
                    selected.insert(key.clone(), revision.clone());
                }
                _ => {}
            }
        }
    }

    revised
}

/// Union of the missing and revised entries, revised values winning per key.
pub fn compose_request(missing: Catalog, revised: Catalog) -> Catalog {
    let mut request = missing;
    for (category, entries) in revised {
        request.category_mut(&category).extend(entries);
    }
    request
}

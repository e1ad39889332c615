//! Catalog discovery and run validation.
//!
//! A run works on three folders: one holding the template catalog, one
//! holding a catalog per target language, and an optional one holding an
//! updates catalog. Every catalog is a `<language>.json` file.

use crate::config::Folders;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// A catalog file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    /// Lower-cased file stem, e.g. `fr` for `FR.json`
    pub language: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Layout problems detected before any language is processed.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Failed to read folder `{}`: {source}", .dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("You must have only one .json file in the `{}` folder (found {found})", .dir.display())]
    TemplateCount { dir: PathBuf, found: usize },

    #[error("You must have at least one .json file in the `{}` folder", .dir.display())]
    NoTargets { dir: PathBuf },

    #[error(
        "`{first}` and `{second}` in the `{}` folder are both language `{language}`",
        .dir.display()
    )]
    DuplicateLanguage {
        dir: PathBuf,
        language: String,
        first: String,
        second: String,
    },

    #[error("You must have at most one .json file in the `{}` folder (found {found})", .dir.display())]
    TooManyUpdates { dir: PathBuf, found: usize },

    #[error(
        "The updates file `{updates}` does not match the source of truth file `{template}` (filenames must match)"
    )]
    UpdatesMismatch { template: String, updates: String },
}

/// Everything one run needs to know about the files it works on.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub template: CatalogFile,
    pub updates: Option<CatalogFile>,
    pub targets: Vec<CatalogFile>,
}

impl RunPlan {
    /// Language of the template catalog, i.e. what translations start from
    pub fn source_language(&self) -> &str {
        &self.template.language
    }

    pub fn target_languages(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.language.as_str()).collect()
    }
}

/// List the `.json` files of a folder, sorted by file name.
pub fn list_catalogs(dir: &Path) -> io::Result<Vec<CatalogFile>> {
    let mut catalogs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let lower = file_name.to_lowercase();
        let Some(stem) = lower.strip_suffix(".json") else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }

        catalogs.push(CatalogFile {
            language: stem.to_string(),
            file_name,
            path,
        });
    }

    catalogs.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(catalogs)
}

fn list_required(dir: &Path) -> Result<Vec<CatalogFile>, LayoutError> {
    list_catalogs(dir).map_err(|source| LayoutError::ReadDir {
        dir: dir.to_path_buf(),
        source,
    })
}

/// Two files whose names differ only in case would be the same language.
fn reject_duplicate_languages(dir: &Path, catalogs: &[CatalogFile]) -> Result<(), LayoutError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for catalog in catalogs {
        if let Some(first) = seen.insert(&catalog.language, &catalog.file_name) {
            return Err(LayoutError::DuplicateLanguage {
                dir: dir.to_path_buf(),
                language: catalog.language.clone(),
                first: first.to_string(),
                second: catalog.file_name.clone(),
            });
        }
    }

    Ok(())
}

/// A missing updates folder simply means there are no updates.
fn list_optional(dir: &Path) -> Result<Vec<CatalogFile>, LayoutError> {
    match list_catalogs(dir) {
        Ok(catalogs) => Ok(catalogs),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(LayoutError::ReadDir {
            dir: dir.to_path_buf(),
            source,
        }),
    }
}

/// Discover the catalogs of a run and check the folder layout is usable.
pub fn resolve(folders: &Folders) -> Result<RunPlan, LayoutError> {
    let mut templates = list_required(&folders.source_of_truth)?;
    let targets = list_required(&folders.output)?;
    let mut updates = list_optional(&folders.updates)?;

    if templates.len() != 1 {
        return Err(LayoutError::TemplateCount {
            dir: folders.source_of_truth.clone(),
            found: templates.len(),
        });
    }
    if targets.is_empty() {
        return Err(LayoutError::NoTargets {
            dir: folders.output.clone(),
        });
    }
    reject_duplicate_languages(&folders.output, &targets)?;
    if updates.len() > 1 {
        return Err(LayoutError::TooManyUpdates {
            dir: folders.updates.clone(),
            found: updates.len(),
        });
    }

    let template = templates.remove(0);
    let updates = updates.pop();

    if let Some(updates) = &updates {
        if updates.file_name != template.file_name {
            return Err(LayoutError::UpdatesMismatch {
                template: template.file_name.clone(),
                updates: updates.file_name.clone(),
            });
        }
    }

    Ok(RunPlan {
        template,
        updates,
        targets,
    })
}

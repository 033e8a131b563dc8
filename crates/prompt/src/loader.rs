//! Stage template overrides loaded from disk.
//!
//! Deployments tune stage prompts by placing `<stage>.hbs` files in a
//! prompt directory (e.g. `prompts/draft.hbs`). Files whose stem does not
//! name a known stage are skipped with a warning.

use crate::builder::PromptSet;
use crate::types::StageTemplate;
use medrag_core::{AppError, AppResult};
use std::path::Path;
use walkdir::WalkDir;

/// Load `<stage>.hbs` overrides from a directory into a prompt set.
pub fn load_overrides(set: &mut PromptSet, dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt directory does not exist: {:?}",
            dir
        )));
    }

    let mut loaded = 0usize;

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("hbs") {
            continue;
        }

        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => continue,
        };

        let template = match StageTemplate::from_name(stem) {
            Some(template) => template,
            None => {
                tracing::warn!("Ignoring prompt file with unknown stage name: {:?}", path);
                continue;
            }
        };

        let source = std::fs::read_to_string(path).map_err(|e| {
            AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
        })?;

        set.register_override(template, &source)?;
        loaded += 1;

        tracing::debug!("Loaded prompt override '{}' from {:?}", stem, path);
    }

    tracing::info!("Loaded {} prompt overrides from {:?}", loaded, dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_overrides_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("draft.hbs"), "Tuned draft: {{question}}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a template").unwrap();
        std::fs::write(dir.path().join("bogus.hbs"), "unknown stage").unwrap();

        let set = PromptSet::with_overrides(dir.path()).unwrap();

        let rendered = set
            .render(StageTemplate::Draft, &vars(&[("question", "hi")]))
            .unwrap();
        assert_eq!(rendered, "Tuned draft: hi");

        // Other stages keep their built-ins
        let verify = set
            .render(
                StageTemplate::Verify,
                &vars(&[("sentinel", "Not enough information")]),
            )
            .unwrap();
        assert!(verify.contains("verification agent"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let mut set = PromptSet::builtin().unwrap();
        assert!(load_overrides(&mut set, &missing).is_err());
    }
}

//! Versioned publish: copy a file or a tree into `<destination>/vNNNN/`

use super::unresolved;
use crate::params::Params;
use crate::template;
use crate::version::{self, Version};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use procedure::{Phase, Process, ProcedureContext, ProcessError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// File written next to the published content
pub const PUBLISH_RECORD: &str = "publish.json";

/// Contents of `publish.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub source: PathBuf,
    pub version: String,
    /// blake3 over every published file, in path order
    pub hash: String,
    pub files: usize,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Publish {
    source: String,
    destination: String,
    key: String,
    params: Arc<Params>,
    created: Option<PathBuf>,
}

impl Publish {
    pub fn new(source: String, destination: String, key: String, params: Arc<Params>) -> Self {
        Self {
            source,
            destination,
            key,
            params,
            created: None,
        }
    }

    fn render(
        &self,
        ctx: &ProcedureContext,
        phase: Phase,
    ) -> Result<(PathBuf, PathBuf), ProcessError> {
        let source =
            template::render_path(&self.source, ctx, &self.params).map_err(unresolved(phase))?;
        let destination = template::render_path(&self.destination, ctx, &self.params)
            .map_err(unresolved(phase))?;
        Ok((source, destination))
    }
}

impl Process for Publish {
    fn name(&self) -> String {
        "publish".to_string()
    }

    fn check(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let (source, destination) = self.render(ctx, Phase::Check)?;

        let mut violations = Vec::new();
        if !source.exists() {
            violations.push(format!("publish source '{}' does not exist", source.display()));
        }
        if destination.exists() && !destination.is_dir() {
            violations.push(format!(
                "publish destination '{}' is not a directory",
                destination.display()
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::check_failed(violations))
        }
    }

    fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let (source, destination) = self.render(ctx, Phase::Execute)?;

        fs::create_dir_all(&destination)
            .with_context(|| format!("Failed to create directory: {}", destination.display()))?;

        let version = version::next_in(&destination)?;
        let target = destination.join(version.to_string());
        fs::create_dir(&target)
            .with_context(|| format!("Failed to create version directory: {}", target.display()))?;
        self.created = Some(target.clone());

        let record = publish_into(&source, &target, version)?;
        log::info!(
            "Published {} as {} ({} files, {})",
            source.display(),
            target.display(),
            record.files,
            &record.hash[..12]
        );

        let published = target.to_string_lossy().to_string();
        ctx.set_path(self.key.as_str(), published.as_str());
        ctx.set_path("version", version.to_string());
        ctx.set_return_value(published);
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        if let Some(target) = self.created.take() {
            if target.exists() {
                fs::remove_dir_all(&target)
                    .with_context(|| format!("Failed to remove {}", target.display()))?;
                log::info!("Removed publish {}", target.display());
            }
        }
        Ok(())
    }
}

/// Copy `source` into `target` and write the publish record
fn publish_into(source: &Path, target: &Path, version: Version) -> Result<PublishRecord> {
    let copied = if source.is_dir() {
        copy_tree(source, target)?
    } else {
        let Some(file_name) = source.file_name() else {
            bail!("Publish source has no file name: {}", source.display());
        };
        let dest = target.join(file_name);
        fs::copy(source, &dest)
            .with_context(|| format!("Failed to copy {} to {}", source.display(), dest.display()))?;
        vec![PathBuf::from(file_name)]
    };

    let record = PublishRecord {
        source: source.to_path_buf(),
        version: version.to_string(),
        hash: hash_files(target, &copied)?,
        files: copied.len(),
        published_at: Utc::now(),
    };

    let record_path = target.join(PUBLISH_RECORD);
    let content = serde_json::to_string_pretty(&record)?;
    fs::write(&record_path, content)
        .with_context(|| format!("Failed to write {}", record_path.display()))?;

    Ok(record)
}

/// Copy every file under `source` into `target`; returns relative paths, sorted
fn copy_tree(source: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry.path().strip_prefix(source)?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create directory: {}", dest.display()))?;
        } else {
            fs::copy(entry.path(), &dest).with_context(|| {
                format!("Failed to copy {} to {}", entry.path().display(), dest.display())
            })?;
            copied.push(relative.to_path_buf());
        }
    }

    Ok(copied)
}

fn hash_files(root: &Path, files: &[PathBuf]) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    for relative in files {
        let path = root.join(relative);
        let content =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(&content);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use procedure::ValueMap;
    use serde_json::json;
    use tempfile::TempDir;

    fn context(source: &Path, destination: &Path) -> ProcedureContext {
        let mut inputs = ValueMap::new();
        inputs.insert("source".into(), json!(source.to_string_lossy()));
        inputs.insert("destination".into(), json!(destination.to_string_lossy()));
        ProcedureContext::new("assets~prop/chair", "publish chair", inputs)
    }

    fn process() -> Publish {
        Publish::new(
            "{source}".into(),
            "{destination}".into(),
            "published".into(),
            Arc::new(Params::default()),
        )
    }

    fn read_record(dir: &Path) -> PublishRecord {
        let content = fs::read_to_string(dir.join(PUBLISH_RECORD)).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn test_publish_file_increments_version() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("chair.usd");
        fs::write(&source, "#usda 1.0").unwrap();
        let destination = tmp.path().join("publish");
        fs::create_dir_all(destination.join("v0002")).unwrap();
        let mut ctx = context(&source, &destination);

        let mut publish = process();
        publish.check(&mut ctx).unwrap();
        publish.execute(&mut ctx).unwrap();

        let target = destination.join("v0003");
        assert_eq!(fs::read_to_string(target.join("chair.usd")).unwrap(), "#usda 1.0");
        assert_eq!(ctx.path_str("version"), Some("v0003"));
        assert_eq!(ctx.path_str("published"), Some(&*target.to_string_lossy()));
        assert_eq!(ctx.return_value(), Some(&json!(target.to_string_lossy())));

        let record = read_record(&target);
        assert_eq!(record.version, "v0003");
        assert_eq!(record.files, 1);
        assert_eq!(record.hash.len(), 64);
    }

    #[test]
    fn test_publish_tree() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("textures");
        fs::create_dir_all(source.join("diffuse")).unwrap();
        fs::write(source.join("diffuse/wood.png"), "png").unwrap();
        fs::write(source.join("rough.png"), "png2").unwrap();
        let destination = tmp.path().join("publish");
        let mut ctx = context(&source, &destination);

        process().execute(&mut ctx).unwrap();

        let target = destination.join("v0001");
        assert!(target.join("diffuse/wood.png").is_file());
        assert!(target.join("rough.png").is_file());
        assert_eq!(read_record(&target).files, 2);
    }

    #[test]
    fn test_same_content_same_hash() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("chair.usd");
        fs::write(&source, "#usda 1.0").unwrap();
        let destination = tmp.path().join("publish");
        let mut ctx = context(&source, &destination);

        process().execute(&mut ctx).unwrap();
        process().execute(&mut ctx).unwrap();

        assert_eq!(
            read_record(&destination.join("v0001")).hash,
            read_record(&destination.join("v0002")).hash
        );
    }

    #[test]
    fn test_revert_removes_version_directory() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("chair.usd");
        fs::write(&source, "#usda 1.0").unwrap();
        let destination = tmp.path().join("publish");
        fs::create_dir_all(destination.join("v0001")).unwrap();
        let mut ctx = context(&source, &destination);

        let mut publish = process();
        publish.execute(&mut ctx).unwrap();
        publish.revert(&mut ctx).unwrap();
        publish.revert(&mut ctx).unwrap();

        assert!(destination.join("v0001").is_dir());
        assert!(!destination.join("v0002").exists());
    }

    #[test]
    fn test_missing_source_is_a_violation() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context(&tmp.path().join("missing.usd"), tmp.path());

        let err = process().check(&mut ctx).unwrap_err();
        assert!(err.violations().unwrap()[0].contains("does not exist"));
    }

    #[test]
    fn test_unresolved_destination_fails_execute_without_violations() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("chair.usd");
        fs::write(&source, "#usda 1.0").unwrap();
        let mut ctx = context(&source, tmp.path());
        let mut publish = Publish::new(
            "{source}".into(),
            "{publish_root}".into(),
            "published".into(),
            Arc::new(Params::default()),
        );

        let err = publish.execute(&mut ctx).unwrap_err();

        assert!(err.violations().is_none());
        assert!(err.to_string().contains("unresolved placeholder"));
        assert!(publish.created.is_none());
    }
}

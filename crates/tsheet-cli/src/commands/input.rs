//! Reading a timesheet and the settings that apply to it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tsheet_core::Settings;

use crate::config::load_settings;
use crate::frontmatter;

/// A timesheet ready for processing.
#[derive(Debug)]
pub struct Input {
    pub settings: Settings,
    /// Front-matter lines, written back verbatim ahead of the output.
    pub header: Vec<String>,
    pub body: Vec<String>,
    /// Where the input was copied before being overwritten, if it was.
    pub backup: Option<PathBuf>,
}

/// Reads `file`, splitting off front-matter and loading settings.
///
/// When `out` names the same file, the input is copied to `<file>.backup`
/// first and read from the copy.
pub fn load(file: &Path, out: Option<&Path>, config_path: Option<&Path>) -> Result<Input> {
    let mut source = file.to_path_buf();
    let mut backup = None;

    if let Some(out) = out {
        if same_file(file, out) {
            let backup_path = backup_path(file);
            fs::copy(file, &backup_path).with_context(|| {
                format!("failed to back up {} to {}", file.display(), backup_path.display())
            })?;
            source.clone_from(&backup_path);
            backup = Some(backup_path);
        }
    }

    let text = fs::read_to_string(&source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    let doc = frontmatter::split(&text);

    let settings = load_settings(config_path, doc.front_matter.as_deref())
        .context("failed to load settings")?;

    Ok(Input {
        settings,
        header: doc.header.into_iter().map(String::from).collect(),
        body: doc.body.into_iter().map(String::from).collect(),
        backup,
    })
}

fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

/// Whether two paths name the same file, falling back to comparing
/// absolute paths when either does not exist yet.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => std::path::absolute(a).ok() == std::path::absolute(b).ok(),
    }
}

use crate::error::{Result, SitemapError};
use crate::filter::PartNamePattern;
use crate::results::{CleanupReport, Part};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Delete numbered part files in `output_dir` that the current run did not produce.
///
/// Only names of the exact form `<prefix>-<n>.xml` are candidates, so files like
/// `<prefix>-style.xml` survive. Failures are collected per file and do not stop
/// the remaining deletions.
pub fn reclaim_stale_parts(
    output_dir: &Path,
    prefix: &str,
    current: &[Part],
) -> Result<CleanupReport> {
    reclaim_with(output_dir, prefix, current, |path| fs::remove_file(path))
}

pub(crate) fn reclaim_with<F>(
    output_dir: &Path,
    prefix: &str,
    current: &[Part],
    mut remove: F,
) -> Result<CleanupReport>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let pattern = PartNamePattern::new(prefix)?;
    let keep: HashSet<&str> = current.iter().map(|part| part.filename.as_str()).collect();
    let mut report = CleanupReport::default();

    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(source) => {
            ::log::warn!("Cannot list {} for cleanup: {}", output_dir.display(), source);
            report.failures.push(SitemapError::Cleanup {
                path: output_dir.to_path_buf(),
                source,
            });
            return Ok(report);
        }
    };

    let mut stale = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                report.failures.push(SitemapError::Cleanup {
                    path: output_dir.to_path_buf(),
                    source,
                });
                continue;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !pattern.matches(name) || keep.contains(name) {
            continue;
        }
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            stale.push(entry.path());
        }
    }
    stale.sort();

    for path in stale {
        match remove(&path) {
            Ok(()) => {
                ::log::info!("Deleted old part file: {}", path.display());
                report.removed.push(path);
            }
            Err(source) => {
                ::log::warn!("Error deleting {}: {}", path.display(), source);
                report.failures.push(SitemapError::Cleanup { path, source });
            }
        }
    }

    if report.removed.is_empty() {
        ::log::debug!("No old part files found in {}", output_dir.display());
    }
    Ok(report)
}

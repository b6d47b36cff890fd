//! Push orchestration.
//!
//! One pass, no retries:
//! 1. Fetch the remote file state (always fresh)
//! 2. Build the local snapshot
//! 3. Compute the delta
//! 4. Dry run: list it and stop. Otherwise upload it and report health.
//!
//! Endpoint resolution happens before this, in the command layer.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::api::RemoteAgent;
use crate::error::Result;
use crate::output::OutputSink;

use super::cache::FingerprintCache;
use super::diff::compute_delta;
use super::scanner::build_local_snapshot;
use super::types::{ChangeKind, SkippedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushStage {
    RemoteFetched,
    LocalBuilt,
    DiffComputed,
    DryRunStop,
    Uploaded,
    StatusReported,
}

impl fmt::Display for PushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PushStage::RemoteFetched => "remote-fetched",
            PushStage::LocalBuilt => "local-built",
            PushStage::DiffComputed => "diff-computed",
            PushStage::DryRunStop => "dry-run-stop",
            PushStage::Uploaded => "uploaded",
            PushStage::StatusReported => "status-reported",
        };
        f.write_str(name)
    }
}

fn enter(stage: PushStage) {
    debug!(stage = %stage, "push stage");
}

#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub dry_run: bool,
    /// Fingerprint cache file; `None` disables the cache.
    pub fingerprint_cache: Option<PathBuf>,
}

/// Outcome of one push.
#[derive(Debug, Clone, Default)]
pub struct PushReport {
    pub new: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub skipped: Vec<SkippedFile>,
    /// Whether a `PUT /files` was issued.
    pub uploaded: bool,
    /// Health from `GET /status`; `None` on a dry run.
    pub health: Option<String>,
}

fn load_cache(path: &Path) -> FingerprintCache {
    match FingerprintCache::load(path) {
        Ok(cache) => cache,
        Err(e) => {
            warn!("Ignoring fingerprint cache: {:#}", e);
            FingerprintCache::default()
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}

fn report_skipped(skipped: &[SkippedFile], out: &dyn OutputSink) {
    if skipped.is_empty() {
        return;
    }
    out.warn(&format!(
        "{} file(s) could not be read and were not pushed:",
        skipped.len()
    ));
    for file in skipped {
        out.warn(&format!("  {} ({})", file.path, file.reason));
    }
}

/// Push the project at `root` to `agent`.
pub async fn push(
    agent: &dyn RemoteAgent,
    root: &Path,
    options: &PushOptions,
    out: &dyn OutputSink,
) -> Result<PushReport> {
    if options.dry_run {
        out.warn("No changes will be applied, this is a dry run!");
    }

    let remote = agent.fetch_files().await?;
    enter(PushStage::RemoteFetched);
    debug!("Remote reports {} files", remote.len());

    let local = match &options.fingerprint_cache {
        Some(cache_path) => {
            let mut cache = load_cache(cache_path);
            let local = build_local_snapshot(root, Some(&mut cache))?;
            if let Err(e) = cache.save(cache_path) {
                warn!("Failed to save fingerprint cache: {:#}", e);
            } else {
                debug!("Saved {} fingerprints to cache", cache.len());
            }
            local
        }
        None => build_local_snapshot(root, None)?,
    };
    enter(PushStage::LocalBuilt);

    let outcome = compute_delta(&local, &remote);
    enter(PushStage::DiffComputed);

    let mut skipped = local.skipped;
    skipped.extend(outcome.skipped.iter().cloned());

    let mut report = PushReport {
        new: outcome.count(ChangeKind::New),
        modified: outcome.count(ChangeKind::Modified),
        unchanged: outcome.unchanged,
        skipped,
        uploaded: false,
        health: None,
    };

    info!(
        "📊 Diff: {} new, {} modified, {} unchanged",
        report.new, report.modified, report.unchanged
    );

    if options.dry_run {
        for change in &outcome.changes {
            out.say(&format!("[{}] {}", change.kind, change.path));
        }
        out.say(&format!(
            "{} file(s) would be pushed ({} new, {} modified), {} unchanged",
            outcome.changes.len(),
            report.new,
            report.modified,
            report.unchanged
        ));
        enter(PushStage::DryRunStop);
        report_skipped(&report.skipped, out);
        return Ok(report);
    }

    if outcome.delta.is_empty() {
        out.say("Everything is up to date, nothing to push.");
    } else {
        let bytes: u64 = outcome.delta.values().filter_map(|e| e.size).sum();
        out.say(&format!(
            "Pushing {} file(s), {}, to {} ({} new, {} modified)...",
            outcome.delta.len(),
            format_size(bytes),
            agent.endpoint(),
            report.new,
            report.modified
        ));
        let ack = agent.push_delta(&outcome.delta).await?;
        report.uploaded = true;
        enter(PushStage::Uploaded);

        let status = agent.fetch_status().await?;
        if ack.health != status.health {
            out.say(&format!("Upload acknowledged with health: {}", ack.health));
        }
        report.health = Some(status.health);
    }

    if report.health.is_none() {
        report.health = Some(agent.fetch_status().await?.health);
    }
    enter(PushStage::StatusReported);

    if let Some(health) = &report.health {
        out.say(&format!("App health: {}", health));
    }

    report_skipped(&report.skipped, out);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockAgent;
    use crate::output::{Level, RecordingSink};
    use crate::workspace::fingerprint::fingerprint;
    use crate::workspace::types::{FileEntry, Snapshot};
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn remote(entries: &[(&str, &str)]) -> Snapshot {
        entries
            .iter()
            .map(|(p, c)| (p.to_string(), FileEntry::metadata(*p, fingerprint(c.as_bytes()))))
            .collect()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[tokio::test]
    async fn test_dry_run_never_uploads() {
        let dir = project(&[("a.txt", "hello"), ("b.txt", "changed")]);
        let agent = MockAgent::with_files(remote(&[("b.txt", "original")]));
        let out = RecordingSink::new();
        let options = PushOptions {
            dry_run: true,
            ..PushOptions::default()
        };

        let report = push(&agent, dir.path(), &options, &out).await.unwrap();

        assert_eq!(agent.gets(), 1);
        assert_eq!(agent.puts(), 0);
        assert_eq!(agent.status_calls(), 0);
        assert!(!report.uploaded);
        assert_eq!(report.health, None);
        assert_eq!(report.new, 1);
        assert_eq!(report.modified, 1);
        assert!(out.contains("[NEW] a.txt"));
        assert!(out.contains("[MOD] b.txt"));
        assert!(out.messages(Level::Warn)[0].contains("dry run"));
    }

    #[tokio::test]
    async fn test_push_uploads_delta_and_reports_health() {
        let dir = project(&[("a.txt", "hello"), ("same.txt", "same")]);
        let agent = MockAgent::with_files(remote(&[("same.txt", "same")]));
        let out = RecordingSink::new();

        let report = push(&agent, dir.path(), &PushOptions::default(), &out)
            .await
            .unwrap();

        assert_eq!(agent.puts(), 1);
        assert_eq!(agent.status_calls(), 1);
        assert!(report.uploaded);
        assert_eq!(report.new, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.health.as_deref(), Some("healthy"));
        assert_eq!(agent.files()["a.txt"].checksum, fingerprint(b"hello"));
        assert!(out.contains("App health: healthy"));
        assert!(out.contains("Upload acknowledged with health: applying"));
    }

    #[tokio::test]
    async fn test_second_push_is_empty() {
        let dir = project(&[("a.txt", "hello"), ("src/lib.rs", "pub fn f() {}")]);
        let agent = MockAgent::new();

        let first = push(&agent, dir.path(), &PushOptions::default(), &RecordingSink::new())
            .await
            .unwrap();
        assert_eq!(first.new, 2);

        let out = RecordingSink::new();
        let second = push(&agent, dir.path(), &PushOptions::default(), &out)
            .await
            .unwrap();

        assert_eq!(second.new + second.modified, 0);
        assert!(!second.uploaded);
        assert_eq!(agent.puts(), 1);
        assert_eq!(agent.status_calls(), 2);
        assert!(out.contains("up to date"));
    }

    #[tokio::test]
    async fn test_remote_only_files_are_untouched() {
        let dir = project(&[("a.txt", "hello")]);
        let agent = MockAgent::with_files(remote(&[("b.txt", "remote only")]));

        push(&agent, dir.path(), &PushOptions::default(), &RecordingSink::new())
            .await
            .unwrap();

        let files = agent.files();
        assert!(files.contains_key("a.txt"));
        assert_eq!(files["b.txt"].checksum, fingerprint(b"remote only"));
    }

    #[tokio::test]
    async fn test_fingerprint_cache_is_written() {
        let dir = project(&[("a.txt", "hello")]);
        let cache_dir = TempDir::new().unwrap();
        let cache_path = cache_dir.path().join("fp.json");
        let agent = MockAgent::new();
        let options = PushOptions {
            dry_run: true,
            fingerprint_cache: Some(cache_path.clone()),
        };

        push(&agent, dir.path(), &options, &RecordingSink::new())
            .await
            .unwrap();

        let cache = FingerprintCache::load(&cache_path).unwrap();
        assert_eq!(cache.entries["a.txt"].checksum, fingerprint(b"hello"));
    }

    /// Drop a file whose name is not valid UTF-8; the scan cannot key it and skips it.
    #[cfg(target_os = "linux")]
    fn add_undecodable_file(dir: &TempDir) {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"bad\xffname.txt");
        fs::write(dir.path().join(name), "x").unwrap();
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_skipped_file_is_reported_and_push_continues() {
        let dir = project(&[("a.txt", "hello")]);
        add_undecodable_file(&dir);
        let agent = MockAgent::new();
        let out = RecordingSink::new();

        let report = push(&agent, dir.path(), &PushOptions::default(), &out)
            .await
            .unwrap();

        assert_eq!(agent.puts(), 1);
        assert!(agent.files().contains_key("a.txt"));
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("name.txt"));

        let warnings = out.messages(Level::Warn);
        assert!(warnings[0].contains("1 file(s) could not be read"));
        assert!(warnings.iter().any(|w| w.contains("name.txt")));
        // The skipped-file warning comes after the health line.
        let lines = out.lines();
        let health_at = lines.iter().position(|(_, m)| m.starts_with("App health")).unwrap();
        let skipped_at = lines.iter().position(|(_, m)| m.contains("could not be read")).unwrap();
        assert!(health_at < skipped_at);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dry_run_reports_skipped_files() {
        let dir = project(&[("a.txt", "hello")]);
        add_undecodable_file(&dir);
        let agent = MockAgent::new();
        let out = RecordingSink::new();
        let options = PushOptions {
            dry_run: true,
            ..PushOptions::default()
        };

        let report = push(&agent, dir.path(), &options, &out).await.unwrap();

        assert_eq!(agent.puts(), 0);
        assert_eq!(report.new, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(out.contains("[NEW] a.txt"));
        assert!(out
            .messages(Level::Warn)
            .iter()
            .any(|w| w.contains("name.txt")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = project(&[("a.txt", "hello"), ("secret.txt", "locked")]);
        let locked = dir.path().join("secret.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&locked).is_ok() {
            // Permissions are not enforced for this user (e.g. root).
            return;
        }
        let agent = MockAgent::new();
        let out = RecordingSink::new();

        let report = push(&agent, dir.path(), &PushOptions::default(), &out)
            .await
            .unwrap();

        assert_eq!(agent.puts(), 1);
        assert!(agent.files().contains_key("a.txt"));
        assert!(!agent.files().contains_key("secret.txt"));
        assert_eq!(report.skipped[0].path, "secret.txt");
        assert!(out
            .messages(Level::Warn)
            .iter()
            .any(|w| w.contains("secret.txt")));
    }

    #[tokio::test]
    async fn test_missing_root_fails_before_upload() {
        let dir = TempDir::new().unwrap();
        let agent = MockAgent::new();

        let result = push(
            &agent,
            &dir.path().join("missing"),
            &PushOptions::default(),
            &RecordingSink::new(),
        )
        .await;

        assert!(matches!(
            result,
            Err(crate::error::FastPushError::LocalIo { .. })
        ));
        assert_eq!(agent.puts(), 0);
    }
}

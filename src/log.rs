use crate::errors::{Result, StorageError, StorageErrorType};
use crate::locations::get_log_dir;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, Registry};

const LOG_RETENTION_DAYS: i64 = 30;

pub fn init_logging(debug: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_file = get_log_location()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let formatter = BunyanFormattingLayer::new("breezy".into(), non_blocking);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatter);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| StorageError::new(StorageErrorType::InternalError, e.to_string()))?;
    forward_log_records();

    Ok(guard)
}

// warp and hyper still emit `log` records. Returns false if a logger was
// already installed.
fn forward_log_records() -> bool {
    match tracing_log::LogTracer::init() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Could not forward log records to tracing: {}", e);
            false
        }
    }
}

fn get_log_location() -> Result<PathBuf> {
    let log_dir = get_log_dir()?;
    let timestamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let log_file = log_dir.join(format!("breezy-{}.log", timestamp));
    clean_logfiles(&log_dir)?;
    Ok(log_file)
}

fn clean_logfiles(log_dir: &Path) -> Result<()> {
    // Logfiles from more than 30 days ago are deleted
    for file in std::fs::read_dir(log_dir)? {
        let file = file?;
        let modified: chrono::DateTime<Utc> = file.metadata()?.modified()?.into();
        let age = Utc::now().signed_duration_since(modified);
        if age.num_days() > LOG_RETENTION_DAYS {
            std::fs::remove_file(file.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_logfiles_are_kept() {
        let dir = std::env::temp_dir().join(format!("breezy-logs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("breezy-test.log");
        std::fs::write(&file, "{}").unwrap();
        clean_logfiles(&dir).unwrap();
        assert!(file.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn second_log_bridge_is_reported_not_fatal() {
        forward_log_records();
        assert!(!forward_log_records());
    }
}

use super::Inner;
use crate::errors::Result;
use crate::records::FileHandle;

/// Percentage reached after `step` of `total_steps`, rounded down.
pub(super) fn percent(step: u32, total_steps: u32) -> u8 {
    ((step as u64 * 100) / total_steps.max(1) as u64).min(100) as u8
}

/// Walk one file through its progress steps. Each step waits on the store's
/// clock, hands the chunk to the endpoint and only then publishes the new
/// percentage, so a file's entry never goes backwards. Only this file's entry
/// is written.
pub(super) async fn simulate(inner: &Inner, id: &str, handle: &FileHandle) -> Result<()> {
    let total_steps = inner.config.progress_steps;
    for step in 1..=total_steps {
        inner.clock.sleep(inner.config.step_delay()).await;
        inner.endpoint.upload_chunk(handle, step, total_steps)?;
        let value = percent(step, total_steps);
        tracing::debug!(file = %handle.name, id = %id, progress = value);
        inner
            .state
            .lock()
            .unwrap()
            .progress
            .insert(id.to_string(), value);
    }
    Ok(())
}

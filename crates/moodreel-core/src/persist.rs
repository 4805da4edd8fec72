use moodreel_storage::KeyValueStore;

use crate::error::CoreError;
use crate::events::{EventSink, TrackerEvent};

/// Write `value` under `key`, mapping store errors into `PersistenceFailure`
pub(crate) fn write(store: &dyn KeyValueStore, key: &str, value: &str) -> Result<(), CoreError> {
    store
        .set(key, value)
        .map_err(|e| CoreError::PersistenceFailure {
            key: key.to_string(),
            reason: format!("{e:#}"),
        })
}

/// Best-effort write: a failure is reported to `events` and otherwise ignored
pub(crate) fn write_best_effort(
    store: &dyn KeyValueStore,
    events: &dyn EventSink,
    key: &str,
    value: &str,
) {
    if let Err(err) = write(store, key, value) {
        events.emit(&TrackerEvent::PersistenceFailed {
            key: key.to_string(),
            reason: err.to_string(),
        });
    }
}

// Core data model: normalized events, merged calendars, sync state.

pub mod calendar;
pub mod event;
pub mod sync;

pub use calendar::Calendar;
pub use event::{EventDraft, EventRecord, ResponseStatus};
pub use sync::SyncState;

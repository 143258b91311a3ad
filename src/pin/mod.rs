//! Team PIN autofill.
//!
//! The PIN lives in an injected [`KeyValueStore`] under a fixed key.
//! [`PinAutofill`] fills recognised inputs from it and learns new PINs as
//! they are typed; [`RescanDebouncer`] re-runs the fill after content changes.

mod autofill;
mod manager;
mod rescan;
mod store;

pub use autofill::{AUTO_FILLED_CLASS, PIN_FIELD_CLASS, PinAutofill, PinField, PinFieldSelector};
pub use manager::{DEFAULT_PIN_STORAGE_KEY, PIN_LENGTH, PinManager};
pub use rescan::{DEFAULT_RESCAN_DELAY, RescanDebouncer};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

//! WASM bindings for aria-playback
//!
//! Browser hosts drive the controller from JavaScript: output requests arrive
//! through a callback, audio element events go back in through the `on*`
//! methods, and the snapshot lives in `localStorage`.

mod controller;
mod output;
mod store;

pub use controller::WasmPlaybackController;
pub use output::CallbackOutput;
pub use store::LocalStorageStore;

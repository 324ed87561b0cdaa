//! Domain services used by the client facade.
//!
//! ARCHITECTURE
//! ============
//! Service modules own resolution, sync, and exchange logic over the shared
//! `ChatState` so the facade can stay a thin public surface. Remote and
//! cache degradations are absorbed here; only an upstream model failure
//! crosses a service boundary as an error.

pub mod chat;
pub mod conversation;
pub mod settings;

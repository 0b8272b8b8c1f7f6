//! Segmented, lazily-loaded session state with one-request flash values.
//!
//! This crate provides the [`Segment`] abstraction: a named partition of
//! session data carrying persistent values plus two flash buffers, one
//! visible for the current request and one staged for the next. Handlers use
//! segments to namespace session data by feature and to pass transient
//! messages (form validation errors, notices) across exactly one subsequent
//! request.
//!
//! Segments are lazy. Nothing touches the underlying store until first use:
//! reads resume an existing session if one is available and otherwise fall
//! back to defaults, writes resume or start a session on demand, and clears
//! degrade to no-ops. "No session available" is never an error.
//!
//! The session lifecycle itself (cookies, IDs, expiry, storage backends) is
//! not this crate's concern: it is reached through the three-operation
//! [`SessionLifecycle`] trait, and [`Session`] pairs one such collaborator
//! with the owned [`SessionState`]. Flash rotation across requests belongs
//! to the surrounding per-request initialization: call
//! [`Session::rotate_flash`] once per request before handlers run.
//!
//! ```
//! use session_segment::{InMemoryLifecycle, Session};
//!
//! let session = Session::new(InMemoryLifecycle::new());
//! let messages = session.segment("messages");
//!
//! // Stage a notice for the next request.
//! messages.set_flash("notice", "profile saved");
//! assert_eq!(messages.get_flash::<String>("notice"), None);
//!
//! // ... next request: the manager rotates, then the notice is visible.
//! session.rotate_flash();
//! assert_eq!(
//!     messages.get_flash_or("notice", String::new()),
//!     "profile saved"
//! );
//! ```

pub mod format;
mod lifecycle;
mod segment;
mod session;
mod state;

pub use serde_json::Value;

pub use crate::lifecycle::{InMemoryLifecycle, SessionLifecycle};
pub use crate::segment::Segment;
pub use crate::session::Session;
pub use crate::state::SessionState;

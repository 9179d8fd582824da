//! Client for the counseling intake API.
//!
//! `ApiClient` talks HTTP to the server. `AdminWorkspace` and `FormCapture`
//! hold the screen state of the admin dashboard and the public forms and run
//! against any [`RecordBackend`] / [`FormBackend`].

pub mod backend;
pub mod client;
pub mod forms;
pub mod session;
pub mod workspace;

pub use backend::{FormBackend, RecordBackend};
pub use client::ApiClient;
pub use forms::{FormCapture, FormOutcome, Screen};
pub use session::{AuthGate, GateView, SessionState};
pub use workspace::{
    AdminWorkspace, Banner, BulkDeleteOutcome, DeleteStep, ExportedFile, SortOrder,
};

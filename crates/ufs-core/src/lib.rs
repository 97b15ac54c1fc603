//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Session runtime and lifecycle management."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
pub mod bootstrap;
pub mod session;

pub use bootstrap::launch;
pub use session::{
    SessionCommand, SessionConfig, SessionError, SessionHandle, SessionRuntime, SessionSummary,
};

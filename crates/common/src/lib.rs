//! Pieces shared by the server, the client and the process entry point:
//! logging bootstrap and the small JSON bodies both sides agree on.

pub mod types;
pub mod utils;

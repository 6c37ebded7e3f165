/// Re-export `Config` from `billgate-core` for use within this crate.
///
/// Environment parsing lives in `billgate-core` so integration tests can build
/// a `Config` without the server.
pub use billgate_core::config::Config;

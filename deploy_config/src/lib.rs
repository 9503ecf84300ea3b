//! Deployment network configuration: named network profiles, verification
//! keys, compiler settings and binding output, assembled once from static
//! declarations and an external secret source.

pub mod accounts;
pub mod artifacts;
pub mod bindings;
pub mod chain;
pub mod compiler;
pub mod config;
pub mod declarations;
pub mod error;
pub mod network;
pub mod secrets;
pub mod sizer;
pub mod verification;

pub use config::Config;
pub use error::ConfigError;
pub use network::NetworkProfile;

//! Data models for `vlessconn`

mod profile;

pub use profile::{Profile, RealityParams, TransportKind};

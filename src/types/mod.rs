//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep invalid ports and malformed host entries out of the
//! scan engine: by the time a scan starts, every port is in range and every
//! host list entry is a non-empty identifier.

mod host_list;
mod port;
mod target;

pub use host_list::{HostList, HostListError};
pub use port::{Port, PortError, PortSpec};
pub use target::{TargetError, TargetSpec};

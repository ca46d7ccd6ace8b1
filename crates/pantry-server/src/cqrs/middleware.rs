//! Marker traits separating write requests from read requests

/// A request that mutates state
pub trait Command {}

/// A read-only request
pub trait Query {}

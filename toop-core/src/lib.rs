//! TOOP Core - Gateway Types
//!
//! Pure data structures shared by every gateway crate: identifiers, reference
//! data records, registry records, lookup outcomes, configuration and the
//! error taxonomy. This crate performs no I/O.

use chrono::{DateTime, Utc};

mod config;
mod error;
mod identity;
mod lookup;
mod organization;
mod reference;

pub use config::*;
pub use error::*;
pub use identity::*;
pub use lookup::*;
pub use organization::*;
pub use reference::*;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// A record that can be indexed by a natural key in a reference snapshot.
pub trait Keyed {
    fn cache_key(&self) -> String;
}

/// Current wall-clock time.
pub fn now() -> Timestamp {
    Utc::now()
}

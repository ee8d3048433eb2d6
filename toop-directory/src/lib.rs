//! TOOP Directory - Upstream Clients and Domain Caches
//!
//! HTTP clients for the two upstream services the gateway depends on, and the
//! caches that front them:
//!
//! - [`DirectoryClient`] searches the reference directory for participants
//!   serving each supported document type; [`CountryDirectory`] keeps the
//!   result as a refresh-coalescing snapshot.
//! - [`RegistryClient`] fetches single organization records from the
//!   business registry; [`OrganizationCache`] memoizes them under a fixed
//!   capacity.

mod countries;
mod directory;
mod http;
mod organizations;
mod registry;

pub use countries::CountryDirectory;
pub use directory::{DirectoryClient, SearchEntity, SearchMatch, SearchName, SearchResult};
pub use http::build_http_client;
pub use organizations::OrganizationCache;
pub use registry::RegistryClient;

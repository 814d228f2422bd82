//! Clients for the external systems the order core writes to.

pub mod blob;
pub mod identity;

pub use blob::{BlobError, BlobStore, LocalBlobStore};
pub use identity::{AccountProfile, IdentityError, IdentityProvider, InMemoryIdentityProvider};

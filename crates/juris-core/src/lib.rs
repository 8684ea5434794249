//! # juris-core — Foundational Types for the Juris Stack
//!
//! Leaf crate of the workspace. It holds the small set of primitives the
//! workflow engine and its tooling share:
//!
//! 1. **Identifier newtypes.** `InstanceId` (one per activated workflow) and
//!    `TemplateId` (stable catalog key). You cannot pass one where the other
//!    is expected.
//!
//! 2. **`CanonicalBytes`.** RFC 8785 canonical JSON, the only input accepted
//!    by `sha256_digest()`. Audit entries are digested through it.
//!
//! 3. **UTC-only timestamps** plus a lenient date parser used when conditions
//!    compare deadline and hearing dates.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `juris-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, JurisError};
pub use identity::{InstanceId, TemplateId};
pub use temporal::{parse_date_like, Timestamp};

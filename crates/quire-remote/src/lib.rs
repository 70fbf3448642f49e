//! Remote access for Quire.
//!
//! - [`fetch`]: fetch missing documents from a remote repository, API first
//!   and raw URL second, and cache them locally
//! - [`commit`]: optionally propose cached documents back as a pull request
//! - [`links`]: `HEAD`-check tooling links

pub mod commit;
pub mod fetch;
pub mod links;

pub use commit::{cache_branch_name, ChangeProposer, GitHubProposer, ProposalOutcome};
pub use fetch::{CachedDoc, Channel, GitHubSource, RemoteFetcher, RemoteSource};
pub use links::{LinkChecker, LinkFailure};

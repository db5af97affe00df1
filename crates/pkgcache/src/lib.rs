//! Fetch + memoize npm registry documents, resolved versions, manifests, and
//! mounted tarballs for a build session.

mod cache;
mod error;
mod exports;
mod fetcher;
mod manifest;
mod tarball;
mod version;

pub use cache::{PackageMetadataCache, DEFAULT_REGISTRY_ORIGIN};
pub use error::PackageError;
pub use exports::{resolve_entry, Conditions, Platform, ResolvedEntry, SideEffectsDecl};
pub use fetcher::{FetchError, HttpFetcher, MockFetcher, ReqwestFetcher};
pub use manifest::{DistInfo, PackageManifest, RegistryDocument, SideEffects};
pub use tarball::{MountedPackage, TarballMountService};
pub use version::resolve_version_from_doc;

//! Parses the shorthand CDN names from `BuildConfig.cdn` (or an explicit
//! `https://` URL) into a `CdnSpec` that can build and parse package URLs.
//! This model only *constructs* URLs — it never fetches; a fetch adapter is
//! injected separately by `npmbundle-pkgcache`, mirroring how the teacher's
//! `cli/jsr.rs` keeps `jsr_url()` (pure URL composition) apart from the
//! `FileFetcher` that actually performs the request.

mod package_ref;

pub use package_ref::{PackageName, PackageRef};

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum CdnError {
  #[error("unrecognized CDN shorthand or invalid URL: {0}")]
  InvalidSpec(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverLayout {
  Unpkg,
  JsdelivrNpm,
  EsmSh,
  Skypack,
  Jspm,
  EsmRun,
}

impl ResolverLayout {
  fn from_host(host: &str) -> Option<Self> {
    match host {
      "unpkg.com" => Some(Self::Unpkg),
      "cdn.jsdelivr.net" => Some(Self::JsdelivrNpm),
      "esm.sh" => Some(Self::EsmSh),
      "cdn.skypack.dev" => Some(Self::Skypack),
      "ga.jspm.io" | "jspm.dev" => Some(Self::Jspm),
      "esm.run" => Some(Self::EsmRun),
      _ => None,
    }
  }

  fn default_origin(self) -> &'static str {
    match self {
      Self::Unpkg => "https://unpkg.com",
      Self::JsdelivrNpm => "https://cdn.jsdelivr.net",
      Self::EsmSh => "https://esm.sh",
      Self::Skypack => "https://cdn.skypack.dev",
      Self::Jspm => "https://ga.jspm.io",
      Self::EsmRun => "https://esm.run",
    }
  }
}

/// `{ origin, buildURL(PackageRef) -> URL, parseURL(URL) -> PackageRef? }`.
#[derive(Debug, Clone)]
pub struct CdnSpec {
  pub origin: Url,
  pub layout: ResolverLayout,
}

impl Default for CdnSpec {
  fn default() -> Self {
    Self::parse("unpkg").expect("default CDN spec must parse")
  }
}

impl CdnSpec {
  /// Accepts one of the documented shorthands (`unpkg`, `esm.sh`,
  /// `jsdelivr.b`, `skypack`, `jspm`, `esm.run`) or an explicit `https://`
  /// URL. `jsdelivr.b` is the npm-package layout shorthand, distinct from
  /// jsdelivr's GitHub layout which this crate does not model.
  pub fn parse(input: &str) -> Result<Self, CdnError> {
    let layout = match input {
      "unpkg" => Some(ResolverLayout::Unpkg),
      "jsdelivr.b" | "jsdelivr" => Some(ResolverLayout::JsdelivrNpm),
      "esm.sh" => Some(ResolverLayout::EsmSh),
      "skypack" => Some(ResolverLayout::Skypack),
      "jspm" => Some(ResolverLayout::Jspm),
      "esm.run" => Some(ResolverLayout::EsmRun),
      _ => None,
    };
    if let Some(layout) = layout {
      let origin = Url::parse(layout.default_origin())
        .map_err(|_| CdnError::InvalidSpec(input.to_string()))?;
      return Ok(Self { origin, layout });
    }

    let url = Url::parse(input).map_err(|_| CdnError::InvalidSpec(input.to_string()))?;
    let host = url.host_str().ok_or_else(|| CdnError::InvalidSpec(input.to_string()))?;
    let layout = ResolverLayout::from_host(host).unwrap_or(ResolverLayout::Unpkg);
    let origin = Url::parse(&format!("{}://{}", url.scheme(), host))
      .map_err(|_| CdnError::InvalidSpec(input.to_string()))?;
    Ok(Self { origin, layout })
  }

  /// `{origin}/{pkg}@{version}{/subpath}`, with the `/npm/` infix for
  /// jsdelivr. Bit-exact with `spec.md` §6's CDN URL shapes table.
  pub fn build_url(&self, pkg: &PackageRef, exact_version: &str) -> Url {
    let mut path = match self.layout {
      ResolverLayout::JsdelivrNpm => format!("/npm/{}@{}", pkg.name, exact_version),
      _ => format!("/{}@{}", pkg.name, exact_version),
    };
    if !pkg.subpath.is_empty() {
      path.push('/');
      path.push_str(&pkg.subpath);
    }
    let mut url = self.origin.clone();
    url.set_path(&path);
    url
  }

  /// Attempts to recover a `PackageRef` from a URL previously built by
  /// `build_url` against this same spec. Returns `None` if the URL's shape
  /// does not match the expected layout.
  pub fn parse_url(&self, url: &Url) -> Option<PackageRef> {
    if url.host_str() != self.origin.host_str() {
      return None;
    }
    let mut path = url.path().trim_start_matches('/');
    if self.layout == ResolverLayout::JsdelivrNpm {
      path = path.strip_prefix("npm/")?;
    }
    let (name_version, subpath) = match path.find('/') {
      Some(idx) => (&path[..idx], path[idx + 1..].to_string()),
      None => (path, String::new()),
    };
    let at_idx = if name_version.starts_with('@') {
      name_version[1..].find('@').map(|i| i + 1)
    } else {
      name_version.find('@')
    }?;
    let name = PackageName::parse(&name_version[..at_idx]).ok()?;
    let version = name_version[at_idx + 1..].to_string();
    Some(PackageRef { name, range_or_version: version, subpath })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pkg(name: &str, subpath: &str) -> PackageRef {
    PackageRef {
      name: PackageName::parse(name).unwrap(),
      range_or_version: "^1.0.0".to_string(),
      subpath: subpath.to_string(),
    }
  }

  #[test]
  fn unpkg_url_shape_is_bit_exact() {
    let cdn = CdnSpec::parse("unpkg").unwrap();
    let url = cdn.build_url(&pkg("camelcase", ""), "6.3.0");
    assert_eq!(url.as_str(), "https://unpkg.com/camelcase@6.3.0");
  }

  #[test]
  fn jsdelivr_url_shape_is_bit_exact() {
    let cdn = CdnSpec::parse("jsdelivr.b").unwrap();
    let url = cdn.build_url(&pkg("lodash", "map.js"), "4.17.21");
    assert_eq!(url.as_str(), "https://cdn.jsdelivr.net/npm/lodash@4.17.21/map.js");
  }

  #[test]
  fn esm_sh_url_shape_is_bit_exact() {
    let cdn = CdnSpec::parse("esm.sh").unwrap();
    let url = cdn.build_url(&pkg("preact", ""), "10.19.3");
    assert_eq!(url.as_str(), "https://esm.sh/preact@10.19.3");
  }

  #[test]
  fn scoped_package_url_round_trips() {
    let cdn = CdnSpec::parse("unpkg").unwrap();
    let url = cdn.build_url(&pkg("@babel/core", "package.json"), "7.23.0");
    assert_eq!(url.as_str(), "https://unpkg.com/@babel/core@7.23.0/package.json");
    let parsed = cdn.parse_url(&url).unwrap();
    assert_eq!(parsed.name.to_string(), "@babel/core");
    assert_eq!(parsed.range_or_version, "7.23.0");
    assert_eq!(parsed.subpath, "package.json");
  }

  #[test]
  fn default_is_unpkg() {
    let cdn = CdnSpec::default();
    assert_eq!(cdn.layout, ResolverLayout::Unpkg);
    assert_eq!(cdn.origin.as_str(), "https://unpkg.com/");
  }

  #[test]
  fn explicit_host_falls_back_to_unpkg_layout() {
    let cdn = CdnSpec::parse("https://my-private-registry.example.com").unwrap();
    assert_eq!(cdn.layout, ResolverLayout::Unpkg);
  }
}

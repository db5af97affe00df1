use crate::context::{ResolverContext, Target};
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use npmbundle_cdn::CdnSpec;
use npmbundle_pkgcache::{HttpFetcher, MockFetcher, PackageMetadataCache, TarballMountService};
use npmbundle_vfs::InMemoryFileSystem;
use std::io::Write;
use std::sync::Arc;

pub fn empty_context() -> ResolverContext {
  empty_context_with_fetcher().0
}

pub fn empty_context_with_fetcher() -> (ResolverContext, Arc<MockFetcher>) {
  let mock = Arc::new(MockFetcher::new());
  let fetcher: Arc<dyn HttpFetcher> = mock.clone();
  let ctx = ResolverContext::new(
    InMemoryFileSystem::new(),
    Target::Runtime(npmbundle_builtins::Runtime::Node),
    false,
    Arc::new(PackageMetadataCache::new()),
    Arc::new(TarballMountService::new()),
    CdnSpec::default(),
    fetcher,
  );
  (ctx, mock)
}

pub fn make_tarball(files: &[(&str, &str)]) -> Bytes {
  let mut tar_bytes = Vec::new();
  {
    let mut builder = tar::Builder::new(&mut tar_bytes);
    for (path, contents) in files {
      let mut header = tar::Header::new_gnu();
      header.set_path(format!("package/{path}")).unwrap();
      header.set_size(contents.len() as u64);
      header.set_mode(0o644);
      header.set_cksum();
      builder.append(&header, contents.as_bytes()).unwrap();
    }
    builder.finish().unwrap();
  }
  let mut gz = GzEncoder::new(Vec::new(), Compression::default());
  gz.write_all(&tar_bytes).unwrap();
  Bytes::from(gz.finish().unwrap())
}

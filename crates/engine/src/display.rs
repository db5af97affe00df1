//! Human-readable byte formatting for `BuildResult.packageSizeArr` (§4.G:
//! "pairing `(name, humanBytes(dist.unpackedSize))`"). A direct port of the
//! teacher's own `cli/display.rs::human_size` — same unit table, same
//! exponent/rounding behavior — rather than a re-derived formatter, since
//! the teacher already carries one for exactly this purpose (package/module
//! size reporting).

pub fn human_bytes(size: u64) -> String {
  let size = size as f64;
  let units = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
  if size < 1_f64 {
    return format!("{size}B");
  }
  let delimiter = 1024_f64;
  let exponent = std::cmp::min((size.ln() / delimiter.ln()).floor() as i32, (units.len() - 1) as i32);
  let pretty_bytes = format!("{:.2}", size / delimiter.powi(exponent))
    .parse::<f64>()
    .unwrap_or(size)
    * 1_f64;
  let unit = units[exponent as usize];
  format!("{pretty_bytes}{unit}")
}

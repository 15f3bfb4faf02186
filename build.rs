// from cbindgen docs and
// https://michael-f-bryan.github.io/rust-ffi-guide/cbindgen.html

extern crate cbindgen;

use std::env;
use std::path::{Path,PathBuf};

fn main() {
    if env::var_os("CARGO_FEATURE_CFFI").is_none() { return; }
    let crate_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR"));
    let package_name = env::var("CARGO_PKG_NAME").expect("cargo sets CARGO_PKG_NAME");

    let output_file = target_dir(&crate_dir).join(format!("{}.h", package_name));

    cbindgen::Builder::new()
      .with_language(cbindgen::Language::C)
      .with_include_version(true)
      .with_include_guard("DUMP_INDEX_H")
      .with_crate(&crate_dir)
      .generate()
      .expect("Unable to generate bindings")
      .write_to_file(&output_file);
}

fn target_dir(crate_dir:&Path) -> PathBuf {
    match env::var_os("CARGO_TARGET_DIR") {
        Some(target) => PathBuf::from(target),
        None => crate_dir.join("target"),
    }
}

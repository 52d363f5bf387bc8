use std::env;
use std::path::{Path, PathBuf};

/// Headers every FFmpeg install used for decoding must ship.
const REQUIRED_HEADERS: [&str; 3] = [
    "libavformat/avformat.h",
    "libavcodec/avcodec.h",
    "libswscale/swscale.h",
];

fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");
    println!("cargo:rerun-if-env-changed=VCPKGRS_TRIPLET");

    if let Some(ffmpeg_dir) = env::var_os("FFMPEG_DIR").map(PathBuf::from) {
        check_install(&ffmpeg_dir, "FFMPEG_DIR");
        return;
    }

    // Elsewhere pkg-config finds the libraries without help.
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=Neither FFMPEG_DIR nor VCPKG_ROOT is set; install FFmpeg with vcpkg and point FFMPEG_DIR at it."
        );
        return;
    };
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = Path::new(&vcpkg_root).join("installed").join(triplet);
    if check_install(&candidate, "VCPKG_ROOT") {
        println!(
            "cargo:warning=Using vcpkg FFmpeg at {}; set FFMPEG_DIR to it to silence this message.",
            candidate.display()
        );
    }
}

/// Warn about headers missing under `root`. Returns `true` if none are.
fn check_install(root: &Path, origin: &str) -> bool {
    let include = root.join("include");
    let missing: Vec<&str> = REQUIRED_HEADERS
        .into_iter()
        .filter(|header| !include.join(header).exists())
        .collect();

    for header in &missing {
        println!(
            "cargo:warning={origin} points at {} but {header} was not found there.",
            root.display()
        );
    }
    missing.is_empty()
}

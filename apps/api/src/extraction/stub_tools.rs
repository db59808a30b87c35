//! Shell stand-ins for `pdftoppm` and `tesseract`, so the OCR and preview
//! paths can run in tests without poppler or tesseract installed.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable `sh` script named `name` into `dir`.
pub fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A rasterizer that logs its arguments to `<dir>/pdftoppm.args` and writes
/// one PNG per entry of `pages` as `<prefix>-<suffix>.png` with the given bytes.
/// The files are created in the order given.
pub fn fake_pdftoppm(dir: &Path, pages: &[(&str, &str)]) -> PathBuf {
    let log = dir.join("pdftoppm.args");
    let writes: String = pages
        .iter()
        .map(|(suffix, content)| format!("printf '%s' '{content}' > \"$prefix-{suffix}.png\"\n"))
        .collect();
    install_script(
        dir,
        "pdftoppm",
        &format!(
            "printf '%s\\n' \"$*\" > '{}'\nfor prefix; do :; done\n{writes}",
            log.display()
        ),
    )
}

/// A rasterizer that always exits with an error.
pub fn broken_pdftoppm(dir: &Path) -> PathBuf {
    install_script(dir, "pdftoppm", "echo 'Syntax Error: broken' >&2\nexit 1")
}

/// An OCR engine that "recognizes" `TEXT:<image file name>`.
pub fn fake_tesseract(dir: &Path) -> PathBuf {
    install_script(dir, "tesseract", "printf 'TEXT:%s' \"$(basename \"$1\")\"")
}

pub fn logged_args(dir: &Path) -> String {
    fs::read_to_string(dir.join("pdftoppm.args"))
        .unwrap()
        .trim()
        .to_string()
}

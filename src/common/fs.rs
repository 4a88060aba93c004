use std::{fs::{self, File}, io::Read, path::{Path, PathBuf}};

use anyhow::{anyhow, bail, Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() { bail!("Path exists but is not a directory: {}", path.display()) }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Error unless the file already exists.
pub(crate) fn require_file_exists(path: &Path) -> Result<()> {
    if !path.exists() { bail!("File does not exist: {}", path.display()) }
    if !path.is_file() { bail!("Path exists but is not a file: {}", path.display()) }
    Ok(())
}

/// Computes the hex SHA-256 digest of the file at `path`.
pub(crate) fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("open for hash {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 1 << 16];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 { break }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Extracts the given `.zip` file to the target directory.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(zip_path)
        .map_err(|e| anyhow!("failed to open {:?}: {}", zip_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| anyhow!("failed to read zip archive {:?}: {}", zip_path, e))?;

    archive.extract(dest_dir)
        .map_err(|e| anyhow!("failed to extract {:?} to {:?}: {}", zip_path, dest_dir, e))?;

    Ok(())
}

/// Find the single `.shp` file under `dir` (recursively).
pub(crate) fn find_shapefile(dir: &Path) -> Result<PathBuf> {
    let mut found = WalkDir::new(dir).sort_by_file_name().into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("shp")))
        .collect::<Vec<_>>();

    match found.len() {
        0 => bail!("No .shp file found under {}", dir.display()),
        1 => Ok(found.remove(0)),
        n => bail!("Found {n} .shp files under {}; expected exactly one", dir.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");

        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn file_checks_reject_directories_and_missing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(require_file_exists(tmp.path()).is_err());
        assert!(require_file_exists(&tmp.path().join("missing.shp")).is_err());

        let file = tmp.path().join("x.txt");
        fs::write(&file, b"abc").unwrap();
        require_file_exists(&file).unwrap();
        assert!(ensure_dir_exists(&file).is_err());
    }

    #[test]
    fn sha256_of_known_content() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("x.txt");
        fs::write(&file, b"abc").unwrap();

        assert_eq!(
            sha256_file(&file).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        );
    }

    #[test]
    fn find_shapefile_requires_exactly_one() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_shapefile(tmp.path()).is_err());

        fs::create_dir_all(tmp.path().join("inner")).unwrap();
        fs::write(tmp.path().join("inner/AREA_IMOVEL.shp"), b"").unwrap();
        fs::write(tmp.path().join("inner/AREA_IMOVEL.dbf"), b"").unwrap();
        assert_eq!(find_shapefile(tmp.path()).unwrap(), tmp.path().join("inner/AREA_IMOVEL.shp"));

        fs::write(tmp.path().join("other.SHP"), b"").unwrap();
        assert!(find_shapefile(tmp.path()).is_err());
    }
}

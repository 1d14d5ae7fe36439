//! Archive cleaning
//!
//! Repository uploads carry exactly two members per archive: the dataset
//! metadata and the orthophoto. Cleaning rewrites an archive down to those
//! two under canonical names, dropping auxiliary files the processing chain
//! left inside. The rewrite goes through a temp zip and an atomic rename so
//! a failed clean never corrupts the original.

use crate::domain::{CanopyError, Result};
use std::fs::File;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

struct MemberInfo {
    index: usize,
    base_name: String,
    size: u64,
}

/// Rewrite an archive to exactly `metadata.json` and `<stem>_ortho.tif`
///
/// # Errors
///
/// Returns an archive error when the zip is corrupt, when it does not carry
/// exactly one metadata member, or when no imagery member can be identified.
pub fn clean_archive(path: &Path) -> Result<()> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            CanopyError::Archive(format!("archive has no usable name: {}", path.display()))
        })?;
    let imagery_name = format!("{stem}_ortho.tif");

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| CanopyError::Archive(format!("cannot open {}: {e}", path.display())))?;

    let mut members = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| {
            CanopyError::Archive(format!("cannot read member {index} of {}: {e}", path.display()))
        })?;
        if entry.is_dir() {
            continue;
        }
        let base_name = entry
            .name()
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
            .to_string();
        members.push(MemberInfo {
            index,
            base_name,
            size: entry.size(),
        });
    }

    let metadata_indices: Vec<usize> = members
        .iter()
        .filter(|m| m.base_name.eq_ignore_ascii_case("metadata.json"))
        .map(|m| m.index)
        .collect();
    let metadata_index = match metadata_indices.as_slice() {
        [single] => *single,
        [] => {
            return Err(CanopyError::Archive(format!(
                "{}: no metadata.json member",
                path.display()
            )))
        }
        _ => {
            return Err(CanopyError::Archive(format!(
                "{}: {} metadata.json members, expected exactly one",
                path.display(),
                metadata_indices.len()
            )))
        }
    };

    let imagery_index = select_imagery(&members, &imagery_name).ok_or_else(|| {
        CanopyError::Archive(format!("{}: no .tif imagery member", path.display()))
    })?;

    let temp = path.with_extension("zip.tmp");
    match rewrite(&mut archive, metadata_index, imagery_index, &imagery_name, &temp) {
        Ok(()) => {
            std::fs::rename(&temp, path)?;
            tracing::debug!(archive = %path.display(), imagery = %imagery_name, "Archive cleaned");
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(&temp);
            Err(e)
        }
    }
}

/// Pick the imagery member: exact name, then the only tif, then the largest
fn select_imagery(members: &[MemberInfo], expected_name: &str) -> Option<usize> {
    if let Some(m) = members.iter().find(|m| m.base_name == expected_name) {
        return Some(m.index);
    }

    let tifs: Vec<&MemberInfo> = members
        .iter()
        .filter(|m| m.base_name.to_ascii_lowercase().ends_with(".tif"))
        .collect();

    match tifs.as_slice() {
        [] => None,
        [single] => Some(single.index),
        _ => tifs.iter().max_by_key(|m| m.size).map(|m| m.index),
    }
}

fn rewrite(
    archive: &mut ZipArchive<File>,
    metadata_index: usize,
    imagery_index: usize,
    imagery_name: &str,
    temp: &Path,
) -> Result<()> {
    let out = File::create(temp)?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    copy_member(archive, metadata_index, "metadata.json", &mut writer, options)?;
    copy_member(archive, imagery_index, imagery_name, &mut writer, options)?;

    writer
        .finish()
        .map_err(|e| CanopyError::Archive(format!("failed to finalize cleaned archive: {e}")))?;

    Ok(())
}

fn copy_member(
    archive: &mut ZipArchive<File>,
    index: usize,
    name: &str,
    writer: &mut ZipWriter<File>,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut entry = archive
        .by_index(index)
        .map_err(|e| CanopyError::Archive(format!("cannot read member {index}: {e}")))?;

    writer
        .start_file(name, options)
        .map_err(|e| CanopyError::Archive(format!("cannot write member {name}: {e}")))?;
    std::io::copy(&mut entry, writer)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_zip(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, content) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    fn member_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    fn member_content(path: &Path, name: &str) -> Vec<u8> {
        use std::io::Read;
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_clean_keeps_exactly_two_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("101.zip");
        build_zip(
            &path,
            &[
                ("nested/metadata.json", b"{\"dataset\": 101}".as_slice()),
                ("101_ortho.tif", b"TIFDATA".as_slice()),
                ("labels.gpkg", b"aux".as_slice()),
                ("thumbnail.png", b"png".as_slice()),
            ],
        );

        clean_archive(&path).unwrap();

        assert_eq!(member_names(&path), vec!["metadata.json", "101_ortho.tif"]);
        assert_eq!(member_content(&path, "metadata.json"), b"{\"dataset\": 101}");
        assert_eq!(member_content(&path, "101_ortho.tif"), b"TIFDATA");
        assert!(!dir.path().join("101.zip.tmp").exists());
    }

    #[test]
    fn test_single_tif_is_renamed_to_expected_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.zip");
        build_zip(
            &path,
            &[
                ("metadata.json", b"{}".as_slice()),
                ("scene_export.tif", b"IMAGERY".as_slice()),
            ],
        );

        clean_archive(&path).unwrap();

        assert_eq!(member_names(&path), vec!["metadata.json", "7_ortho.tif"]);
        assert_eq!(member_content(&path, "7_ortho.tif"), b"IMAGERY");
    }

    #[test]
    fn test_largest_tif_wins_without_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.zip");
        build_zip(
            &path,
            &[
                ("metadata.json", b"{}".as_slice()),
                ("small.tif", b"ab".as_slice()),
                ("big.tif", b"abcdefghij".as_slice()),
            ],
        );

        clean_archive(&path).unwrap();

        assert_eq!(member_content(&path, "7_ortho.tif"), b"abcdefghij");
    }

    #[test]
    fn test_missing_metadata_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.zip");
        build_zip(&path, &[("7_ortho.tif", b"TIF".as_slice())]);

        let result = clean_archive(&path);

        match result {
            Err(CanopyError::Archive(msg)) => assert!(msg.contains("no metadata.json")),
            other => panic!("Expected Archive error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_metadata_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.zip");
        build_zip(
            &path,
            &[
                ("metadata.json", b"{}".as_slice()),
                ("backup/METADATA.JSON", b"{}".as_slice()),
                ("7_ortho.tif", b"TIF".as_slice()),
            ],
        );

        let result = clean_archive(&path);

        match result {
            Err(CanopyError::Archive(msg)) => assert!(msg.contains("expected exactly one")),
            other => panic!("Expected Archive error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_imagery_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.zip");
        build_zip(&path, &[("metadata.json", b"{}".as_slice())]);

        let result = clean_archive(&path);

        match result {
            Err(CanopyError::Archive(msg)) => assert!(msg.contains("no .tif imagery")),
            other => panic!("Expected Archive error, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_zip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7.zip");
        std::fs::write(&path, b"this is not a zip file").unwrap();

        let result = clean_archive(&path);

        assert!(matches!(result, Err(CanopyError::Archive(_))));
        // Original stays untouched on failure
        assert_eq!(std::fs::read(&path).unwrap(), b"this is not a zip file");
    }
}

//! Property-based tests for naming and round-trip behavior.
//!
//! These tests use proptest to generate arbitrary names and entry sets and
//! verify that the written archives read back unchanged.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use arcwrite::ArchiveWriter;
use arcwrite::TarArchiveWriter;
use arcwrite::ZipArchiveWriter;
use arcwrite::naming::tar_destination;
use arcwrite::naming::zip_destination;
use flate2::read::GzDecoder;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::io::Read;

/// Distinct file names, each with arbitrary contents.
fn entry_set() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map(
        "[a-z]{1,8}(/[a-z]{1,8}){0,2}\\.txt",
        prop::collection::vec(any::<u8>(), 0..2048),
        0..8,
    )
}

proptest! {
    /// Normalizing an already normalized ZIP name is a no-op.
    #[test]
    fn prop_zip_naming_idempotent(name in "[a-z._/-]{0,20}") {
        let once = zip_destination(&name);
        prop_assert!(once.ends_with(".zip"));
        prop_assert_eq!(zip_destination(&once), once);
    }

    /// Normalizing an already normalized TAR name is a no-op.
    #[test]
    fn prop_tar_naming_idempotent(name in "[a-z._/-]{0,20}") {
        let once = tar_destination(&name);
        prop_assert!(once.name.ends_with(".tar") || once.name.ends_with(".tar.gz"));
        prop_assert_eq!(once.compressed, once.name.ends_with(".tar.gz"));
        prop_assert_eq!(tar_destination(&once.name), once);
    }

    /// Every file and directory written to a ZIP reads back unchanged.
    #[test]
    fn prop_zip_roundtrip(entries in entry_set(), dirs in prop::collection::btree_set("[a-z]{1,8}", 0..4)) {
        let mut archive = ZipArchiveWriter::create_writer("mem", Cursor::new(Vec::new()));
        for dir in &dirs {
            archive.add_directory(&format!("d_{dir}")).unwrap();
        }
        for (name, data) in &entries {
            archive.add_bytes(name, data).unwrap();
        }
        let bytes = archive.close().unwrap().into_inner();

        let mut reader = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        prop_assert_eq!(reader.len(), entries.len() + dirs.len());
        for dir in &dirs {
            let entry = reader.by_name(&format!("d_{dir}/")).unwrap();
            prop_assert!(entry.is_dir());
        }
        for (name, data) in &entries {
            let mut out = Vec::new();
            reader.by_name(name).unwrap().read_to_end(&mut out).unwrap();
            prop_assert_eq!(&out, data);
        }
    }

    /// Every file and directory written to a compressed TAR reads back
    /// unchanged and in order.
    #[test]
    fn prop_tar_gz_roundtrip(entries in entry_set(), dirs in prop::collection::btree_set("[a-z]{1,8}", 0..4)) {
        let mut archive = TarArchiveWriter::create_writer("mem.tar.gz", Vec::new());
        for dir in &dirs {
            archive.add_directory(&format!("d_{dir}")).unwrap();
        }
        for (name, data) in &entries {
            archive.add_bytes(name, data).unwrap();
        }
        let bytes = archive.close().unwrap();

        let mut reader = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        let mut read_back = Vec::new();
        for entry in reader.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            read_back.push((name, data));
        }

        let expected: Vec<(String, Vec<u8>)> = dirs
            .iter()
            .map(|d| (format!("d_{d}/"), Vec::new()))
            .chain(entries.iter().map(|(n, d)| (n.clone(), d.clone())))
            .collect();
        prop_assert_eq!(read_back, expected);
    }
}

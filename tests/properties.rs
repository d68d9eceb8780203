//! Property tests for hashing and directory decoding.

mod common;

use std::io::Read;

use common::BsaBuilder;
use proptest::prelude::*;
use runbsa::bsa::COMPRESSION_TOGGLE_BIT;
use runbsa::hash::{MAX_PATH_LEN, normalize};
use runbsa::hash_path;

fn path_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_ ./\\\\]{1,80}"
}

fn entry_strategy() -> impl Strategy<Value = (String, Vec<u8>, bool)> {
    (
        "[a-z]{1,3}",
        prop::collection::vec(any::<u8>(), 0..512),
        any::<bool>(),
    )
        .prop_map(|(stem, data, toggle)| (format!("{stem}.bin"), data, toggle))
}

proptest! {
    #[test]
    fn hash_is_deterministic(path in path_strategy(), is_folder in any::<bool>()) {
        prop_assert_eq!(hash_path(&path, is_folder).unwrap(), hash_path(&path, is_folder).unwrap());
    }

    #[test]
    fn hash_ignores_case_and_separator_style(path in path_strategy(), is_folder in any::<bool>()) {
        let upper = path.to_ascii_uppercase().replace('\\', "/");
        prop_assert_eq!(
            hash_path(&upper, is_folder).unwrap(),
            hash_path(normalize(&path), is_folder).unwrap()
        );
    }

    #[test]
    fn hash_low_word_packs_length_and_first_char(path in "[a-z]{1,40}") {
        let hash = hash_path(&path, true).unwrap();
        let bytes = path.as_bytes();
        prop_assert_eq!((hash >> 16) & 0xFF, bytes.len() as u64);
        prop_assert_eq!((hash >> 24) & 0xFF, u64::from(bytes[0]));
        prop_assert_eq!(hash & 0xFF, u64::from(bytes[bytes.len() - 1]));
    }

    #[test]
    fn hash_rejects_only_oversized_paths(len in 1usize..400) {
        let result = hash_path("x".repeat(len), true);
        prop_assert_eq!(result.is_ok(), len <= MAX_PATH_LEN);
    }

    #[test]
    fn directory_round_trips_through_the_reader(
        default_compressed in any::<bool>(),
        entries in prop::collection::vec(entry_strategy(), 1..12),
    ) {
        let mut builder = BsaBuilder::new().compressed_by_default(default_compressed);
        for (i, (name, data, toggle)) in entries.iter().enumerate() {
            let folder = format!("dir{}", i % 3);
            // Unique names so the index has one position per entry
            let name = format!("{i}_{name}");
            builder = if *toggle {
                builder.toggled_file(&folder, &name, data)
            } else {
                builder.file(&folder, &name, data)
            };
        }
        let archive = builder.load();

        prop_assert_eq!(archive.len(), entries.len());
        prop_assert_eq!(archive.header().unwrap().file_count as usize, entries.len());

        for (i, record) in archive.files().iter().enumerate() {
            prop_assert!(!record.name.is_empty());
            prop_assert_eq!(archive.index_of(&record.name), Some(i));
            prop_assert_eq!(record.real_size(), record.size & !COMPRESSION_TOGGLE_BIT);
            prop_assert_eq!(
                record.compressed,
                default_compressed ^ record.toggles_compression()
            );

            let index: usize = record.file_name().split('_').next().unwrap().parse().unwrap();
            let (_, data, toggle) = &entries[index];
            prop_assert_eq!(record.toggles_compression(), *toggle);

            let mut out = Vec::new();
            archive.open_record(record).unwrap().read_to_end(&mut out).unwrap();
            prop_assert_eq!(&out, data);
        }
    }
}

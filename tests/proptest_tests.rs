//! Property-based tests using proptest.
//!
//! These tests check the ordering and filtering invariants of the page
//! catalog with randomly generated file names.

use std::cmp::Ordering;

use cbarchive::catalog::compare_filenames;
use cbarchive::{ArchiveFormat, ArchiveHandle, ImageSupport, PageCatalog};
use proptest::prelude::*;

mod common;

/// Strategy for page-like file names: letters, digit runs and separators.
fn filename_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_. -]{0,12}"
}

/// Strategy for archive member names with an extension drawn from a mix of
/// supported, unsupported and non-image types.
fn member_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,3}[0-9]{0,3}",
        prop::sample::select(vec!["png", "JPG", "gif", "svg", "txt", "xml"]),
    )
        .prop_map(|(stem, ext)| format!("{}.{}", stem, ext))
}

proptest! {
    /// Comparing a name with itself is always equal.
    #[test]
    fn compare_is_reflexive(a in filename_strategy()) {
        prop_assert_eq!(compare_filenames(&a, &a), Ordering::Equal);
    }

    /// Swapping the arguments reverses the ordering.
    #[test]
    fn compare_is_antisymmetric(a in filename_strategy(), b in filename_strategy()) {
        prop_assert_eq!(compare_filenames(&a, &b), compare_filenames(&b, &a).reverse());
    }

    /// Distinct names never compare equal.
    #[test]
    fn compare_is_total(a in filename_strategy(), b in filename_strategy()) {
        prop_assume!(a != b);
        prop_assert_ne!(compare_filenames(&a, &b), Ordering::Equal);
    }

    /// Sorting agrees with pairwise comparison for every triple.
    #[test]
    fn compare_is_transitive(
        a in filename_strategy(),
        b in filename_strategy(),
        c in filename_strategy()
    ) {
        let mut names = [a, b, c];
        names.sort_by(|x, y| compare_filenames(x, y));
        prop_assert_ne!(compare_filenames(&names[0], &names[1]), Ordering::Greater);
        prop_assert_ne!(compare_filenames(&names[1], &names[2]), Ordering::Greater);
        prop_assert_ne!(compare_filenames(&names[0], &names[2]), Ordering::Greater);
    }

    /// Numbered pages with the same prefix sort by numeric value.
    #[test]
    fn numbers_sort_by_value(prefix in "[a-z]{0,4}", x in 0u32..100_000, y in 0u32..100_000) {
        prop_assume!(x != y);
        let a = format!("{}{}.png", prefix, x);
        let b = format!("{}{}.png", prefix, y);
        prop_assert_eq!(compare_filenames(&a, &b), x.cmp(&y));
    }

    /// Letter case does not affect the order of otherwise different names.
    #[test]
    fn case_is_ignored(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
        prop_assume!(a != b);
        prop_assert_eq!(
            compare_filenames(&a.to_uppercase(), &b),
            compare_filenames(&a, &b)
        );
    }
}

proptest! {
    // Each case writes an archive to disk.
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The catalog keeps exactly the supported images, sorted, each with the
    /// position of its first physical occurrence.
    #[test]
    fn catalog_keeps_supported_images(
        members in proptest::collection::vec(member_strategy(), 1..12)
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let mut unique = members.clone();
        unique.sort();
        unique.dedup();
        // ZIP forbids duplicate names; keep physical order of first occurrences.
        let mut physical = Vec::new();
        for name in &members {
            if !physical.contains(name) {
                physical.push(name.clone());
            }
        }
        prop_assert_eq!(physical.len(), unique.len());

        let items: Vec<common::Item<'_>> = physical
            .iter()
            .map(|name| common::Item::File(name, b"data"))
            .collect();
        let path = common::create_zip(dir.path(), "book.cbz", &items);

        let support = ImageSupport::from_lists(["png", "jpg", "gif"], ["svg"]);
        let mut handle = ArchiveHandle::new();
        handle.set_format(ArchiveFormat::Zip).unwrap();
        let result = PageCatalog::build(&mut handle, &path, &support);

        let expected_pages: Vec<&String> = physical
            .iter()
            .filter(|n| {
                let ext = n.rsplit('.').next().unwrap().to_lowercase();
                ext == "png" || ext == "jpg" || ext == "gif"
            })
            .collect();

        match result {
            Ok(catalog) => {
                prop_assert_eq!(catalog.len(), expected_pages.len());
                for (position, name) in expected_pages.iter().enumerate() {
                    prop_assert_eq!(
                        catalog.position_of(name.as_bytes()).map(|p| p.get()),
                        Some(position + 1)
                    );
                }
                for pair in catalog.pages().windows(2) {
                    prop_assert_ne!(
                        compare_filenames(&pair[0].to_string(), &pair[1].to_string()),
                        Ordering::Greater
                    );
                }
            }
            Err(e) => {
                prop_assert!(expected_pages.is_empty());
                let has_svg = physical.iter().any(|n| n.ends_with(".svg"));
                if has_svg {
                    prop_assert!(matches!(e, cbarchive::Error::NoSupportedImages));
                } else {
                    prop_assert!(matches!(e, cbarchive::Error::NoFiles));
                }
            }
        }
    }
}

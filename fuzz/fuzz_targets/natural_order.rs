//! Fuzz target for natural file name ordering.
//!
//! Checks that the comparison is antisymmetric and only reports equality
//! for identical names, for arbitrary UTF-8 input.
//!
//! Run with: cargo +nightly fuzz run natural_order

#![no_main]

use std::cmp::Ordering;

use cbarchive::catalog::compare_filenames;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (a, b) = data;
    let forward = compare_filenames(a, b);
    assert_eq!(forward, compare_filenames(b, a).reverse());
    assert_eq!(forward == Ordering::Equal, a == b);
});

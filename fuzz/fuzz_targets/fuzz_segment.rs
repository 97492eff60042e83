#![no_main]

use jfif_core::{BlockSegmenter, MarkerScanner};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the marker length so short custom markers get
    // exercised alongside the JFIF one.
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let marker_len = (selector % 5) as usize;
    let scanner = if marker_len == 0 || rest.len() < marker_len {
        MarkerScanner::jfif()
    } else {
        match MarkerScanner::new(&rest[..marker_len]) {
            Ok(scanner) => scanner,
            Err(_) => return,
        }
    };

    let segmenter = BlockSegmenter::new(scanner);
    let mut expected_start = segmenter.scanner().find(rest, 0);
    for block in segmenter.segment(rest) {
        assert_eq!(Some(block.offset), expected_start);
        assert!(block.length >= segmenter.scanner().marker_len());
        assert!(block.end() <= rest.len());
        expected_start = Some(block.end());
    }
    if let Some(end) = expected_start {
        assert_eq!(end, rest.len());
    }
});

use jfif_core::{Block, BlockSegmenter, JFIF_MARKER, MarkerScanner};
use proptest::prelude::*;

fn naive_offsets(buffer: &[u8], marker: &[u8]) -> Vec<usize> {
    buffer
        .windows(marker.len())
        .enumerate()
        .filter(|(_, w)| *w == marker)
        .map(|(i, _)| i)
        .collect()
}

fn create_garbage(size: usize, seed: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed as u32;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Bytes drawn mostly from the marker alphabet so that near misses and
/// adjacent markers are common.
fn marker_heavy_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            4 => Just(0xFFu8),
            2 => Just(0xD8u8),
            2 => Just(0xE1u8),
            1 => any::<u8>(),
        ],
        0..256,
    )
}

#[test]
fn card_dump_with_three_images() {
    let mut card: Vec<u8> = create_garbage(512, 7).into_iter().map(|b| b & 0x7F).collect();
    let mut starts = Vec::new();
    for (seed, size) in [(11u8, 300usize), (23, 1000), (42, 77)] {
        starts.push(card.len());
        card.extend_from_slice(&JFIF_MARKER);
        card.extend(create_garbage(size, seed).into_iter().map(|b| b & 0x7F));
    }

    let blocks: Vec<Block> = BlockSegmenter::default().segment(&card).collect();

    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks.iter().map(|b| b.offset).collect::<Vec<_>>(), starts);
    assert_eq!(blocks[0].length, 304);
    assert_eq!(blocks[1].length, 1004);
    assert_eq!(blocks[2].length, 81);
    assert_eq!(blocks[2].end(), card.len());
}

#[test]
fn large_buffer_of_adjacent_markers() {
    let buffer = JFIF_MARKER.repeat(10_000);
    let segmenter = BlockSegmenter::default();

    let mut count = 0u32;
    for block in segmenter.segment(&buffer) {
        assert_eq!(block.offset, count as usize * 4);
        assert_eq!(block.length, 4);
        assert_eq!(block.index, count);
        count += 1;
    }
    assert_eq!(count, 10_000);
}

proptest! {
    #[test]
    fn find_agrees_with_naive_scan(buffer in marker_heavy_bytes(), from in 0usize..300) {
        let scanner = MarkerScanner::jfif();
        let expected = naive_offsets(&buffer, &JFIF_MARKER)
            .into_iter()
            .find(|&p| p >= from);
        prop_assert_eq!(scanner.find(&buffer, from), expected);
    }

    #[test]
    fn blocks_start_at_every_marker(buffer in marker_heavy_bytes()) {
        let offsets: Vec<usize> = BlockSegmenter::default()
            .segment(&buffer)
            .map(|b| b.offset)
            .collect();
        prop_assert_eq!(offsets, naive_offsets(&buffer, &JFIF_MARKER));
    }

    #[test]
    fn blocks_partition_tail_of_buffer(buffer in marker_heavy_bytes()) {
        let segmenter = BlockSegmenter::default();
        let blocks: Vec<Block> = segmenter.segment(&buffer).collect();

        match segmenter.scanner().find(&buffer, 0) {
            None => prop_assert!(blocks.is_empty()),
            Some(first) => {
                let mut expected_start = first;
                for (i, block) in blocks.iter().enumerate() {
                    prop_assert_eq!(block.index as usize, i);
                    prop_assert_eq!(block.offset, expected_start);
                    prop_assert!(block.length >= JFIF_MARKER.len());
                    prop_assert_eq!(&buffer[block.offset..block.offset + 4], &JFIF_MARKER[..]);
                    expected_start = block.end();
                }
                prop_assert_eq!(expected_start, buffer.len());
            }
        }
    }

    #[test]
    fn segmentation_is_idempotent(buffer in marker_heavy_bytes()) {
        let segmenter = BlockSegmenter::default();
        let first: Vec<Block> = segmenter.segment(&buffer).collect();
        let second: Vec<Block> = segmenter.segment(&buffer).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn custom_marker_partition(
        buffer in prop::collection::vec(0u8..4, 0..200),
        marker in prop::collection::vec(0u8..4, 1..4),
    ) {
        let segmenter = BlockSegmenter::new(MarkerScanner::new(&marker).unwrap());
        let offsets: Vec<usize> = segmenter.segment(&buffer).map(|b| b.offset).collect();

        // Blocks never overlap, so a marker starting inside the previous
        // marker's bytes is not a block boundary.
        let mut expected = Vec::new();
        for p in naive_offsets(&buffer, &marker) {
            if expected.last().is_none_or(|&last: &usize| p >= last + marker.len()) {
                expected.push(p);
            }
        }
        prop_assert_eq!(offsets, expected);
    }
}

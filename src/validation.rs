//! Cross-module validation tests.
//!
//! These tests verify:
//! 1. **Round-trip correctness** for block and container paths over a
//!    matrix of input shapes
//! 2. **Format properties** - plain fallback bound, determinism, forced
//!    literal tail
//! 3. **Randomized round-trips** via proptest
#[cfg(test)]
mod tests {
    use crate::block::{self, encoded_len_max};
    use crate::container;
    use proptest::prelude::*;

    // ---------------------------------------------------------------
    // Helper: generate diverse test vectors
    // ---------------------------------------------------------------

    /// Highly compressible: single byte repeated.
    fn data_all_zeros(n: usize) -> Vec<u8> {
        vec![0u8; n]
    }

    /// Incompressible-ish: full byte alphabet cycling.
    fn data_sawtooth(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 256) as u8).collect()
    }

    /// Repetitive text with structure.
    fn data_repeating_text() -> Vec<u8> {
        b"the quick brown fox jumps over the lazy dog. ".repeat(100)
    }

    /// Short-period repetition that produces overlapping factors.
    fn data_short_period(n: usize) -> Vec<u8> {
        b"abcd".iter().cycle().take(n).copied().collect()
    }

    /// Skewed distribution: 90% one byte, 10% another.
    fn data_skewed(n: usize) -> Vec<u8> {
        (0..n).map(|i| if i % 10 == 0 { 1 } else { 0 }).collect()
    }

    /// Deterministic pseudo-random bytes over a small alphabet.
    fn data_pseudo_random(n: usize, alpha: u8) -> Vec<u8> {
        let mut state = 0x9e37_79b9_7f4a_7c15u64;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 33) % alpha as u64) as u8
            })
            .collect()
    }

    fn block_round_trip(input: &[u8]) {
        let mut encoded = vec![0u8; encoded_len_max(input.len())];
        let encoded_len = block::encode_block(input, &mut encoded).unwrap();
        assert!(encoded_len <= input.len() + 4, "fallback bound violated");

        let mut decoded = vec![0u8; input.len()];
        let decoded_len = block::decode_block(&encoded[..encoded_len], &mut decoded).unwrap();
        assert_eq!(decoded_len, input.len());
        assert_eq!(&decoded[..decoded_len], input, "block round-trip failed");
    }

    fn container_round_trip(input: &[u8], block_size: usize) {
        let compressed = container::compress(input, block_size).unwrap();
        let decompressed = container::decompress(&compressed).unwrap();
        assert_eq!(decompressed, input, "container round-trip failed");
    }

    // ---------------------------------------------------------------
    // Round-trip matrix
    // ---------------------------------------------------------------

    macro_rules! round_trip_test {
        ($name:ident, $data:expr) => {
            mod $name {
                use super::*;

                #[test]
                fn block() {
                    let input = $data;
                    block_round_trip(&input);
                }

                #[test]
                fn container_single_block() {
                    let input = $data;
                    container_round_trip(&input, 1 << 16);
                }

                #[test]
                fn container_multi_block() {
                    let input = $data;
                    container_round_trip(&input, 512);
                }

                #[test]
                fn deterministic() {
                    let input = $data;
                    let a = container::compress(&input, 1 << 12).unwrap();
                    let b = container::compress(&input, 1 << 12).unwrap();
                    assert_eq!(a, b, "output must be byte-identical across runs");
                }
            }
        };
    }

    round_trip_test!(all_zeros_small, data_all_zeros(64));
    round_trip_test!(all_zeros_large, data_all_zeros(100_000));
    round_trip_test!(sawtooth, data_sawtooth(8192));
    round_trip_test!(repeating_text, data_repeating_text());
    round_trip_test!(short_period, data_short_period(5000));
    round_trip_test!(skewed, data_skewed(4096));
    round_trip_test!(pseudo_random_binary, data_pseudo_random(4096, 2));
    round_trip_test!(pseudo_random_wide, data_pseudo_random(4096, 250));
    round_trip_test!(minimum_block, data_sawtooth(9));

    // ---------------------------------------------------------------
    // Format properties
    // ---------------------------------------------------------------

    /// An input the block coder cannot compress still fits the
    /// worst-case bound and survives the round trip.
    #[test]
    fn test_plain_fallback_bound() {
        // One of every byte value: nothing repeats 3+ bytes.
        let input: Vec<u8> = (0..=255u8).collect();
        let mut encoded = vec![0u8; encoded_len_max(input.len())];
        let len = block::encode_block(&input, &mut encoded).unwrap();
        assert_eq!(len, input.len() + 4, "expected plain fallback");
        assert_eq!(encoded[0], 0, "expected PLAIN type byte");
    }

    /// Every compressed block decodes with a scratch buffer of exactly
    /// the original length - no slack needed.
    #[test]
    fn test_exact_output_sizing() {
        let input = data_repeating_text();
        let mut encoded = vec![0u8; encoded_len_max(input.len())];
        let encoded_len = block::encode_block(&input, &mut encoded).unwrap();

        let mut exact = vec![0u8; input.len()];
        let n = block::decode_block(&encoded[..encoded_len], &mut exact).unwrap();
        assert_eq!(n, input.len());

        // One byte short must fail rather than truncate.
        let mut short = vec![0u8; input.len() - 1];
        assert!(block::decode_block(&encoded[..encoded_len], &mut short).is_err());
    }

    // ---------------------------------------------------------------
    // Randomized round-trips
    // ---------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_block_round_trip(input in proptest::collection::vec(any::<u8>(), 9..2048)) {
            block_round_trip(&input);
        }

        #[test]
        fn prop_block_round_trip_low_entropy(
            input in proptest::collection::vec(0u8..4, 9..2048)
        ) {
            block_round_trip(&input);
        }

        #[test]
        fn prop_container_round_trip(
            input in proptest::collection::vec(any::<u8>(), 0..4096),
            log2_block in 6u32..12,
        ) {
            container_round_trip(&input, 1 << log2_block);
        }

        #[test]
        fn prop_decode_never_panics(garbage in proptest::collection::vec(any::<u8>(), 0..256)) {
            // Arbitrary bytes must decode cleanly or fail cleanly.
            let mut dst = vec![0u8; 4096];
            let _ = block::decode_block(&garbage, &mut dst);
            let _ = container::decompress(&garbage);
        }
    }
}

/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Small helpers shared by more than one instruction family's encoder.

/// Number of 32-bit words needed to hold `byte_len` bytes.
pub fn ceil_div4(byte_len: u32) -> u32 {
    (byte_len + 3) / 4
}

/// Packs a byte string into little-endian words, zero-padding the final
/// word if `bytes.len()` is not a multiple of four.
pub fn pack_bytes_le(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(buf)
        })
        .collect()
}

/// Zeroes every bit at or past `valid_bits` across `words`, treating the
/// slice as one little-endian bit stream (bit 0 is the LSB of `words[0]`).
/// Used to mask a `Bit` column's literal down to its declared width before
/// the executor's word-wise compare.
pub fn mask_bits_beyond(words: &mut [u32], valid_bits: u32) {
    let total_bits = words.len() as u32 * 32;
    if valid_bits >= total_bits {
        return;
    }
    let word_index = (valid_bits / 32) as usize;
    let bit_in_word = valid_bits % 32;
    words[word_index] &= (1u32 << bit_in_word) - 1;
    for word in words.iter_mut().skip(word_index + 1) {
        *word = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_div4_rounds_up() {
        assert_eq!(ceil_div4(0), 0);
        assert_eq!(ceil_div4(1), 1);
        assert_eq!(ceil_div4(4), 1);
        assert_eq!(ceil_div4(5), 2);
    }

    #[test]
    fn pack_bytes_le_zero_extends_the_final_word() {
        let words = pack_bytes_le(&[1, 2, 3]);
        assert_eq!(words, vec![u32::from_le_bytes([1, 2, 3, 0])]);
    }

    #[test]
    fn mask_bits_beyond_clears_the_boundary_word_and_everything_after() {
        let mut words = [0xFFFF_FFFFu32, 0xFFFF_FFFF];
        mask_bits_beyond(&mut words, 40);
        assert_eq!(words[0], 0xFFFF_FFFF);
        assert_eq!(words[1], 0xFF);
    }

    #[test]
    fn mask_bits_beyond_is_a_no_op_when_every_bit_is_valid() {
        let mut words = [0xFFFF_FFFFu32];
        mask_bits_beyond(&mut words, 32);
        assert_eq!(words[0], 0xFFFF_FFFF);
    }
}

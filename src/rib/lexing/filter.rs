//! Vocabulary pre-filters
//!
//!     A [`VocabularyFilter`] answers "might this word be a request name?" before the
//!     exact lookup runs. It must never answer no for a real vocabulary word; it
//!     may answer yes for words that are not, which the exact lookup then rejects.
//!
//! Bloom Filter
//!
//!     `k` bit positions per word over an `m`-bit array, derived by double hashing
//!     from one 64-bit FNV-1a hash: `h1 + i * h2 (mod m)` with `h1`/`h2` the low and
//!     high halves of the hash. Inserting sets all `k` bits, so every inserted word
//!     tests positive.

use crate::rib::lexing::vocabulary::REQUESTS;
use once_cell::sync::Lazy;
use std::collections::HashSet;

pub const DEFAULT_BLOOM_BITS: usize = 2048;
pub const DEFAULT_BLOOM_HASHES: u32 = 3;

/// Sound set-membership pre-screen
pub trait VocabularyFilter {
    /// `false` means definitely not in the vocabulary
    fn may_contain(&self, word: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct BloomFilter {
    words: Vec<u64>,
    bits: usize,
    hashes: u32,
}

impl BloomFilter {
    /// Empty filter; `bits` is rounded up to a multiple of 64, both arguments are at least 1
    pub fn new(bits: usize, hashes: u32) -> Self {
        let words = bits.max(1).div_ceil(64);
        BloomFilter {
            words: vec![0; words],
            bits: words * 64,
            hashes: hashes.max(1),
        }
    }

    /// Filter over the full request vocabulary
    pub fn from_vocabulary(bits: usize, hashes: u32) -> Self {
        let mut filter = BloomFilter::new(bits, hashes);
        for word in REQUESTS {
            filter.insert(word);
        }
        filter
    }

    pub fn insert(&mut self, word: &str) {
        for bit in self.positions(word) {
            self.words[bit / 64] |= 1u64 << (bit % 64);
        }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn hashes(&self) -> u32 {
        self.hashes
    }

    fn positions(&self, word: &str) -> impl Iterator<Item = usize> {
        let hash = fnv1a(word.as_bytes());
        let h1 = hash & 0xffff_ffff;
        // Odd step so successive probes never collapse onto one bit
        let h2 = (hash >> 32) | 1;
        let bits = self.bits as u64;
        (0..u64::from(self.hashes)).map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % bits) as usize)
    }
}

impl VocabularyFilter for BloomFilter {
    fn may_contain(&self, word: &str) -> bool {
        self.positions(word)
            .all(|bit| self.words[bit / 64] & (1u64 << (bit % 64)) != 0)
    }
}

/// Exact-membership filter: no false positives either
#[derive(Debug, Clone, Default)]
pub struct ExactFilter {
    words: HashSet<String>,
}

impl ExactFilter {
    pub fn from_vocabulary() -> Self {
        ExactFilter {
            words: REQUESTS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl VocabularyFilter for ExactFilter {
    fn may_contain(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

static RI_BLOOM_FILTER: Lazy<BloomFilter> =
    Lazy::new(|| BloomFilter::from_vocabulary(DEFAULT_BLOOM_BITS, DEFAULT_BLOOM_HASHES));

/// Shared default filter over the request vocabulary
pub fn ri_bloom_filter() -> &'static BloomFilter {
    &RI_BLOOM_FILTER
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

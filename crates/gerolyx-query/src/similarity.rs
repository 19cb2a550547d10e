//! String similarity used for fuzzy synonym resolution.
//!
//! `similarity(a, b)`:
//! - 1.0 when the strings are equal
//! - 0.95 when one is a substring of the other
//! - otherwise the sequence-matcher ratio `2·M / (|a| + |b|)` scaled by
//!   `min(|a|, |b|) / max(|a|, |b|)`
//!
//! `M` is the total size of the matching blocks found by recursively taking the
//! longest common run (leftmost in `a`, then leftmost in `b`) and recursing on both
//! sides. When `b` has 200 or more characters, characters occurring in more than
//! `1 + |b|/100` positions are "popular" and cannot seed a match, though a match may
//! still be extended across them. Lengths are counted in Unicode scalar values.
//! Scores are reproducible bit-for-bit across platforms.

use ahash::AHashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.contains(b) || b.contains(a) {
        return 0.95;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let ratio = SequenceMatcher::new(&a, &b).ratio();
    let (short, long) = if a.len() <= b.len() { (a.len(), b.len()) } else { (b.len(), a.len()) };
    let length_penalty = short as f64 / long as f64;
    ratio * length_penalty
}

/// The unscaled matching-block ratio of `a` against `b`.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each non-popular character of `b`, ascending.
    b2j: AHashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: AHashMap<char, Vec<usize>> = AHashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.matching_characters() as f64 / total as f64
    }

    fn matching_characters(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        matched
    }

    /// Longest run `a[i..i+k] == b[j..j+k]` inside the given windows.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the longest run ending at a[i-1], b[j]
        let mut j2len: AHashMap<usize, usize> = AHashMap::new();
        for i in alo..ahi {
            let mut next: AHashMap<usize, usize> = AHashMap::new();
            if let Some(positions) = self.b2j.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|prev| j2len.get(&prev)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow across popular characters, which never seed a run.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi && best_j + best_size < bhi && a[best_i + best_size] == b[best_j + best_size] {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}

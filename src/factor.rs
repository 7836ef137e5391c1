//! Match candidate selection from the suffix array.
//!
//! For every text position the best previous occurrence on each
//! lexicographic side is found exactly: [`psv_nsv`] derives, from the
//! sorted suffix order, the nearest smaller text position whose suffix
//! sorts just below (PSV) and just above (NSV) the position's own
//! suffix, and [`factorize`] extends both into `(offset, length)` match
//! candidates with an amortized LCP scan. The parse optimizer then picks
//! between them and a literal per position.

/// Minimum factor length worth encoding; shorter candidates are treated
/// as absent and the position is covered by literals.
pub(crate) const MIN_FACTOR_LEN: u32 = 3;

/// Nearest lexicographically-adjacent smaller text positions, per text
/// position. `-1` marks a missing side. The sentinel representation
/// never leaves the crate.
pub(crate) struct NeighborTable {
    pub psv: Vec<i32>,
    pub nsv: Vec<i32>,
}

/// One match candidate. `length == 0` marks a missing or empty side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub offset: u32,
    pub length: u32,
}

/// PSV and NSV candidates for every position of the active region.
pub(crate) struct CandidateTable {
    pub psv: Vec<Candidate>,
    pub nsv: Vec<Candidate>,
}

/// Derive PSV/NSV text positions from the sentinel-extended suffix
/// array (`sa[0] == sa[n+1] == -1`, suffix order in between).
///
/// One monotone-stack pass: the stack holds strictly increasing SA
/// values, and the moment a value is popped both its neighbors are
/// known: the entry below it on the stack (PSV) and the value that
/// forced the pop (NSV). Every position is pushed and popped exactly
/// once, so the scan is linear.
pub(crate) fn psv_nsv(sa: &[i32]) -> NeighborTable {
    let n = sa.len() - 2;
    let mut psv = vec![-1i32; n];
    let mut nsv = vec![-1i32; n];

    let mut stack: Vec<i32> = Vec::with_capacity(n + 1);
    stack.push(sa[0]);
    for &cur in &sa[1..] {
        // The left sentinel (-1) is never popped, so the stack stays
        // non-empty throughout.
        while stack[stack.len() - 1] > cur {
            let popped = stack.pop().unwrap();
            psv[popped as usize] = stack[stack.len() - 1];
            nsv[popped as usize] = cur;
        }
        stack.push(cur);
    }

    NeighborTable { psv, nsv }
}

/// Longest common prefix of `text[a..]` and `text[b..]`, capped at
/// `max_len`, with `a < b`.
///
/// Compares eight bytes at a time and isolates the mismatch byte with a
/// trailing-zero count. Callers must guarantee `b + max_len + 8 <=
/// text.len()`; the block coder's reserved 8-byte literal tail provides
/// exactly that headroom.
fn lcp(text: &[u8], a: usize, b: usize, max_len: usize) -> usize {
    debug_assert!(a < b);
    let mut len = 0;
    while len < max_len {
        let x = u64::from_le_bytes(text[a + len..a + len + 8].try_into().unwrap());
        let y = u64::from_le_bytes(text[b + len..b + len + 8].try_into().unwrap());
        let diff = x ^ y;
        if diff != 0 {
            len += diff.trailing_zeros() as usize / 8;
            break;
        }
        len += 8;
    }
    len.min(max_len)
}

/// Compute PSV and NSV match candidates for positions `1..n`.
///
/// `text` is the whole block; `n` is the active length (`text.len() -
/// 8`), and matches never extend past `n`. Consecutive positions have
/// strongly correlated match lengths, so each side carries its previous
/// length minus one as a safe skip into the next LCP scan, amortizing
/// the total work to linear.
///
/// Position 0 has no prior context and keeps empty candidates.
pub(crate) fn factorize(text: &[u8], n: usize, neighbors: &NeighborTable) -> CandidateTable {
    debug_assert!(text.len() >= n + 8);
    let mut table = CandidateTable {
        psv: vec![Candidate::default(); n],
        nsv: vec![Candidate::default(); n],
    };

    let mut psv_len = 0usize;
    let mut nsv_len = 0usize;
    for i in 1..n {
        let limit = n - i;

        psv_len = match neighbors.psv[i] {
            p if p >= 0 => {
                let p = p as usize;
                let skip = psv_len.saturating_sub(1).min(limit);
                let len = skip + lcp(text, p + skip, i + skip, limit - skip);
                table.psv[i] = Candidate {
                    offset: (i - p) as u32,
                    length: len as u32,
                };
                len
            }
            _ => 0,
        };

        nsv_len = match neighbors.nsv[i] {
            p if p >= 0 => {
                let p = p as usize;
                let skip = nsv_len.saturating_sub(1).min(limit);
                let len = skip + lcp(text, p + skip, i + skip, limit - skip);
                table.nsv[i] = Candidate {
                    offset: (i - p) as u32,
                    length: len as u32,
                };
                len
            }
            _ => 0,
        };
    }

    table
}

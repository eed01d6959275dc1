//! Mixed-radix index arithmetic.
//!
//! Pure functions, no state. `linearize`/`decode` form an exact pair and
//! `increment` walks the lattice in strictly increasing combinatorial-index
//! order. Digit ranges are validated eagerly: a wrong index corrupts every
//! downstream histogram, so out-of-range digits fail instead of clamping.

use es_core::{Error, Result};

/// Encode a lattice point as a combinatorial index.
///
/// `vec` is codec-relative (each digit in `[0, n[i])`); the result is
/// `vec[0] + n[0]*(vec[1] + n[1]*(vec[2] + ...))`, so dimension 0 varies
/// fastest.
pub fn linearize(vec: &[usize], n: &[usize]) -> Result<usize> {
    if vec.len() != n.len() {
        return Err(Error::Domain(format!(
            "lattice point has {} digits, sizes cover {} dimensions",
            vec.len(),
            n.len()
        )));
    }
    let mut index = 0usize;
    for k in (0..n.len()).rev() {
        if vec[k] >= n[k] {
            return Err(Error::Domain(format!(
                "digit {} of dimension {k} outside [0, {})",
                vec[k], n[k]
            )));
        }
        index = index
            .checked_mul(n[k])
            .and_then(|x| x.checked_add(vec[k]))
            .ok_or_else(|| Error::Domain(format!("combinatorial index overflows for lattice {n:?}")))?;
    }
    Ok(index)
}

/// Decode a combinatorial index back into a lattice point.
///
/// Inverse of [`linearize`]: repeated division by each `n[k]`, dimension 0
/// recovered first. Fails if `index >= prod(n)`.
pub fn decode(index: usize, n: &[usize]) -> Result<Vec<usize>> {
    let total = n_cells(n)?;
    if index >= total {
        return Err(Error::Domain(format!(
            "combinatorial index {index} outside [0, {total}) for lattice {n:?}"
        )));
    }
    let mut rest = index;
    let mut vec = Vec::with_capacity(n.len());
    for &size in n {
        vec.push(rest % size);
        rest /= size;
    }
    Ok(vec)
}

/// Advance the first `count` digits of `vec` to the next lattice point.
///
/// Odometer increment: bump digit 0; on reaching `n[0]` reset it and carry
/// into digit 1, propagating up to digit `count - 1`. When the last digit
/// overflows the vector wraps back to all zeros, signalling one full
/// enumeration cycle. Callers enumerating `prod(n[..count])` cells must loop
/// exactly that many times; wraparound alone does not terminate anything.
#[inline]
pub fn increment(vec: &mut [usize], n: &[usize], count: usize) {
    assert!(
        count <= vec.len() && count <= n.len(),
        "increment over {count} digits, but point has {} and sizes {}",
        vec.len(),
        n.len()
    );
    for k in 0..count {
        vec[k] += 1;
        if vec[k] < n[k] {
            return;
        }
        vec[k] = 0;
    }
}

/// Total number of lattice cells `prod(n)`, with overflow checked.
pub fn n_cells(n: &[usize]) -> Result<usize> {
    n.iter().try_fold(1usize, |acc, &size| acc.checked_mul(size)).ok_or_else(|| {
        Error::Domain(format!("lattice {n:?} has more cells than usize can hold"))
    })
}

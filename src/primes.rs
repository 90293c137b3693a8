//! Prime sizing helpers.
//!
//! Table capacities are kept prime so that the quadratic probe sequence
//! `h + j²` spreads keys with a common hash remainder across the array instead
//! of cycling through a handful of slots.

/// Smallest capacity a table is ever sized to.
pub const MIN_CAPACITY: usize = 11;

/// Returns `true` if `n` is prime.
///
/// `0` and `1` are not prime.
///
/// # Examples
///
/// ```rust
/// use prime_probe::primes::is_prime;
///
/// assert!(is_prime(2));
/// assert!(is_prime(23));
/// assert!(!is_prime(1));
/// assert!(!is_prime(21));
/// ```
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // 6k ± 1 wheel; `d <= n / d` avoids overflowing `d * d`.
    let mut d = 5;
    while d <= n / d {
        if n % d == 0 || n % (d + 2) == 0 {
            return false;
        }
        d += 6;
    }
    true
}

/// Returns the smallest prime strictly greater than `n`, or `None` if it does
/// not fit in a `usize`.
///
/// # Examples
///
/// ```rust
/// use prime_probe::primes::next_prime;
///
/// assert_eq!(next_prime(20), Some(23));
/// assert_eq!(next_prime(23), Some(29));
/// assert_eq!(next_prime(usize::MAX), None);
/// ```
pub fn next_prime(n: usize) -> Option<usize> {
    let mut candidate = n.checked_add(1)?;
    while !is_prime(candidate) {
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

/// Capacity a table is given when `requested` slots are asked for.
///
/// Requests below [`MIN_CAPACITY`] get [`MIN_CAPACITY`]; prime requests are
/// honored as-is; anything else rounds up to the next prime.
///
/// # Examples
///
/// ```rust
/// use prime_probe::primes::table_capacity;
///
/// assert_eq!(table_capacity(0), Some(11));
/// assert_eq!(table_capacity(13), Some(13));
/// assert_eq!(table_capacity(20), Some(23));
/// ```
pub fn table_capacity(requested: usize) -> Option<usize> {
    if requested < MIN_CAPACITY {
        Some(MIN_CAPACITY)
    } else if is_prime(requested) {
        Some(requested)
    } else {
        next_prime(requested)
    }
}

/// Capacity a table grows to from `current`: the next prime above
/// `1.5 × current`.
pub fn grown_capacity(current: usize) -> Option<usize> {
    let target = current.checked_add(current / 2)?;
    next_prime(target)
}

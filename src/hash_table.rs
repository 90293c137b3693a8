//! The raw open-addressing table.
//!
//! [`HashTable`] stores values in a single prime-sized slot array and resolves
//! collisions with quadratic probing. Callers supply the 64-bit hash and an
//! equality predicate for every operation; [`HashMap`](crate::HashMap) builds
//! the keyed map surface on top of it.

use alloc::alloc::handle_alloc_error;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;

use crate::error::TryReserveError;
use crate::primes::MIN_CAPACITY;
use crate::primes::grown_capacity;
use crate::primes::table_capacity;

/// Load factor used when none is given, or when the given one is not below
/// `1.0`.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

#[derive(Clone)]
enum Slot<V> {
    /// Unused since the array was allocated or cleared. Probing stops here.
    Open,
    Occupied {
        hash: u64,
        value: V,
    },
    /// Held an entry that was removed. Lookups probe past it, insertions may
    /// reuse it.
    Tombstone,
}

#[inline(always)]
fn hash_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// Quadratic probe sequence `home + j² (mod capacity)` for `j = 0, 1, 2, ...`.
///
/// For a prime capacity `p` the squares `j²` and `(p - j)²` land on the same
/// slot, so only the first `p / 2 + 1` positions are distinct. The sequence
/// stops there.
#[derive(Clone)]
struct Probe {
    pos: usize,
    step: usize,
    limit: usize,
    capacity: usize,
}

impl Probe {
    #[inline]
    fn start(hash: u64, capacity: usize) -> Self {
        Probe {
            pos: hash_index(hash, capacity),
            step: 0,
            limit: capacity / 2 + 1,
            capacity,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.step >= self.limit {
            return None;
        }

        let pos = self.pos;
        // (j + 1)² - j² = 2j + 1
        let stride = (2 * self.step + 1) % self.capacity;
        self.pos = (self.pos + stride) % self.capacity;
        self.step += 1;
        Some(pos)
    }
}

enum Probed {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

fn try_filled<T>(len: usize, fill: impl FnMut() -> T) -> Result<Vec<T>, TryReserveError> {
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|_| TryReserveError::AllocError { slots: len })?;
    items.resize_with(len, fill);
    Ok(items)
}

fn slots_for(entries: usize, load_factor: f32) -> Option<usize> {
    let at_least = entries.checked_add(1)?;
    if load_factor <= 0.0 {
        return Some(at_least);
    }

    let slots = (entries as f64 / f64::from(load_factor)).ceil();
    if slots >= usize::MAX as f64 {
        return None;
    }
    Some((slots as usize).max(at_least))
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of slots in the array.
    pub capacity: usize,
    /// Number of slots holding a tombstone.
    pub tombstones: usize,
    /// Number of slots never used since the last resize or clear.
    pub open_slots: usize,
    /// Current occupancy (populated / capacity).
    pub load: f64,
    /// Occupancy above which the next insertion grows the table.
    pub max_load: f64,
    /// Longest probe sequence needed to reach a live entry.
    pub max_probe_length: usize,
    /// Mean probe sequence length over all live entries.
    pub mean_probe_length: f64,
    /// Bytes used by the slot array.
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load, grows above {:.2}%)",
            self.populated,
            self.capacity,
            self.load * 100.0,
            self.max_load * 100.0
        );
        println!(
            "Slots: {} occupied, {} tombstones, {} open",
            self.populated, self.tombstones, self.open_slots
        );
        println!(
            "Probe length: max {}, mean {:.2}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Histogram of probe lengths: `bins[j]` counts entries found `j` steps into
/// their probe sequence.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Entry counts per probe length.
    pub bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.total());
        for (length, &count) in self.bins.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", length, "█".repeat(width), count);
        }
    }
}

/// An open-addressing hash table with quadratic probing and prime capacity.
///
/// `HashTable<V>` stores values of type `V` directly in its slot array.
/// It does not know how to hash its values: every operation takes the
/// value's hash and an equality predicate.
///
/// - Capacity is always prime and at least 11.
/// - Before an insertion, if `len / capacity` exceeds the load factor, the
///   table grows to the next prime above `1.5 × capacity`.
/// - Removal leaves a tombstone; lookups probe past tombstones and stop at the
///   first never-used slot.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use prime_probe::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_capacity(100);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     prime_probe::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     prime_probe::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.capacity(), 101);
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Slot<V>>,
    populated: usize,
    tombstones: usize,
    load_factor: f32,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.capacity())
            .field("load_factor", &self.load_factor)
            .field(
                "slots",
                &self
                    .slots
                    .chunks(16)
                    .map(|row| {
                        let mut line = String::new();
                        for (i, slot) in row.iter().enumerate() {
                            if i > 0 {
                                line.push(' ');
                            }
                            match slot {
                                Slot::Open => line.push_str(".."),
                                Slot::Tombstone => line.push_str("xx"),
                                Slot::Occupied { hash, .. } => {
                                    line.push_str(&format!("{:02x}", *hash as u8))
                                }
                            }
                        }
                        line
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with 11 slots and a load factor of 0.75.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.capacity(), 11);
    /// assert_eq!(table.load_factor(), 0.75);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates an empty table sized for `capacity` slots.
    ///
    /// Requests below 11 get 11 slots; prime requests are honored; anything
    /// else rounds up to the next prime.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows, and aborts through
    /// [`handle_alloc_error`] if the slot array cannot be allocated. See
    /// [`try_with_capacity`](Self::try_with_capacity) for a fallible version.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(20);
    /// assert_eq!(table.capacity(), 23);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty table sized for `capacity` slots that grows once its
    /// occupancy exceeds `load_factor`.
    ///
    /// A `load_factor` that is not below `1.0` (including NaN) is replaced by
    /// the default of 0.75. Smaller values, zero and negative ones included,
    /// are kept as given; a negative factor makes every insertion grow the
    /// table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_capacity_and_load_factor(50, 0.5);
    /// assert_eq!(table.capacity(), 53);
    /// assert_eq!(table.load_factor(), 0.5);
    ///
    /// let table: HashTable<u64> = HashTable::with_capacity_and_load_factor(50, 1.0);
    /// assert_eq!(table.load_factor(), 0.75);
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        Self::unwrap_sizing(Self::try_with_capacity_and_load_factor(
            capacity,
            load_factor,
        ))
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::TryReserveError;
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let table = HashTable::<u64>::try_with_capacity(100).unwrap();
    /// assert_eq!(table.capacity(), 101);
    ///
    /// assert_eq!(
    ///     HashTable::<u64>::try_with_capacity(usize::MAX).unwrap_err(),
    ///     TryReserveError::CapacityOverflow
    /// );
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Fallible version of
    /// [`with_capacity_and_load_factor`](Self::with_capacity_and_load_factor).
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f32,
    ) -> Result<Self, TryReserveError> {
        let capacity = table_capacity(capacity).ok_or(TryReserveError::CapacityOverflow)?;
        let load_factor = if load_factor < 1.0 {
            load_factor
        } else {
            DEFAULT_LOAD_FACTOR
        };

        Ok(Self {
            slots: try_filled(capacity, || Slot::Open)?,
            populated: 0,
            tombstones: 0,
            load_factor,
        })
    }

    #[cold]
    fn unwrap_sizing<T>(result: Result<T, TryReserveError>) -> T {
        match result {
            Ok(value) => value,
            Err(TryReserveError::CapacityOverflow) => panic!("capacity overflow"),
            Err(TryReserveError::AllocError { slots }) => match Layout::array::<Slot<V>>(slots) {
                Ok(layout) => handle_alloc_error(layout),
                Err(_) => panic!("capacity overflow"),
            },
        }
    }

    /// Returns the number of slots in the table. Always prime and at least 11.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the occupancy ratio above which the next insertion grows the
    /// table.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the number of elements in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// assert_eq!(table.len(), 0);
    ///
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of tombstones left behind by removals since the
    /// last resize or clear.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the home slot of `hash`: `hash mod capacity`.
    ///
    /// Hashes are unsigned, so the index is always within the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.hash_index(25), 3);
    /// assert!(table.hash_index(u64::MAX) < table.capacity());
    /// ```
    pub fn hash_index(&self, hash: u64) -> usize {
        hash_index(hash, self.capacity())
    }

    /// Removes all elements from the table, keeping its capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(20);
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2).or_insert(2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 23);
    /// ```
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Open;
        }
        self.populated = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are yielded in slot order, which is unrelated to insertion
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in [3u64, 1, 2] {
    ///     table.entry(n, |&v| v == n).or_insert(n);
    /// }
    ///
    /// let values: Vec<u64> = table.iter().copied().collect();
    /// assert_eq!(values, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to all values in the
    /// table.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// After the iterator is dropped the table is empty, every slot is open,
    /// and the capacity is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |&n: &u64| n == 7).or_insert(7);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, [7]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Reserves room for at least `additional` more elements without growing.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow. See [`try_reserve`](Self::try_reserve).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(100);
    /// assert!(table.capacity() as f32 * table.load_factor() >= 100.0);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        Self::unwrap_sizing(self.try_reserve(additional));
    }

    /// Fallible version of [`reserve`](Self::reserve). The table is unchanged
    /// when an error is returned.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        let slots =
            slots_for(required, self.load_factor).ok_or(TryReserveError::CapacityOverflow)?;
        if slots <= self.capacity() {
            return Ok(());
        }

        let capacity = table_capacity(slots).ok_or(TryReserveError::CapacityOverflow)?;
        self.rehash_into(capacity)
    }

    /// Returns a reference to the value matching `hash` and `eq`.
    ///
    /// The probe skips tombstones and stops at the first open slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&(k, _): &(u64, &str)| k == 42).or_insert((42, "answer"));
    ///
    /// assert_eq!(table.find(42, |&(k, _)| k == 42), Some(&(42, "answer")));
    /// assert_eq!(table.find(7, |&(k, _)| k == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        match &self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value matching `hash` and `eq`.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Removes and returns the value matching `hash` and `eq`, leaving a
    /// tombstone in its slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.tombstones(), 1);
    ///
    /// assert_eq!(table.remove(99, |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        Some(self.take(index))
    }

    /// Gets the entry for the given hash and equality predicate.
    ///
    /// If the table's occupancy is above its load factor, it grows before the
    /// probe, whether or not the value turns out to be present. A vacant
    /// entry points at the first tombstone on the probe sequence if there is
    /// one, otherwise at the open slot that ended the probe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prime_probe::hash_table::Entry;
    /// # use prime_probe::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(5, |&(k, _): &(u64, u32)| k == 5) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((5, 1));
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         entry.get_mut().1 += 1;
    ///     }
    /// }
    ///
    /// table.entry(5, |&(k, _)| k == 5).and_modify(|(_, n)| *n += 1);
    /// assert_eq!(table.find(5, |&(k, _)| k == 5), Some(&(5, 2)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        self.maybe_resize_rehash();
        loop {
            match self.probe_for_insert(hash, &eq) {
                Probed::Found(index) => {
                    return Entry::Occupied(OccupiedEntry { table: self, index });
                }
                Probed::Vacant(index) => {
                    return Entry::Vacant(VacantEntry {
                        table: self,
                        index,
                        hash,
                    });
                }
                // Every slot the sequence can reach holds another value.
                Probed::Exhausted => self.resize_rehash(),
            }
        }
    }

    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        for index in Probe::start(hash, self.capacity()) {
            match &self.slots[index] {
                Slot::Open => return None,
                Slot::Tombstone => {}
                Slot::Occupied { hash: stored, value } => {
                    if *stored == hash && eq(value) {
                        return Some(index);
                    }
                }
            }
        }

        None
    }

    fn probe_for_insert(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probed {
        let mut first_tombstone = None;
        for index in Probe::start(hash, self.capacity()) {
            match &self.slots[index] {
                Slot::Open => return Probed::Vacant(first_tombstone.unwrap_or(index)),
                Slot::Tombstone => {
                    first_tombstone.get_or_insert(index);
                }
                Slot::Occupied { hash: stored, value } => {
                    if *stored == hash && eq(value) {
                        return Probed::Found(index);
                    }
                }
            }
        }

        match first_tombstone {
            Some(index) => Probed::Vacant(index),
            None => Probed::Exhausted,
        }
    }

    fn take(&mut self, index: usize) -> V {
        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied { value, .. } => {
                self.populated -= 1;
                self.tombstones += 1;
                value
            }
            _ => unreachable!("take called on a slot without a value"),
        }
    }

    #[inline]
    fn maybe_resize_rehash(&mut self) {
        let load = self.populated as f64 / self.capacity() as f64;
        if load > f64::from(self.load_factor) {
            self.resize_rehash();
        }
    }

    #[cold]
    fn resize_rehash(&mut self) {
        let capacity = Self::unwrap_sizing(
            grown_capacity(self.capacity()).ok_or(TryReserveError::CapacityOverflow),
        );
        Self::unwrap_sizing(self.rehash_into(capacity));
    }

    /// Rebuilds the table with at least `capacity` slots, dropping tombstones.
    ///
    /// Placement is planned from the cached hashes before anything moves, so
    /// on error the table is untouched. If some entry finds no reachable slot
    /// in the new array, the plan restarts at the next grown capacity.
    fn rehash_into(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        let (capacity, targets) = self.plan_rehash(capacity)?;
        let mut slots = try_filled(capacity, || Slot::Open)?;

        let old = mem::take(&mut self.slots);
        let live = old.into_iter().filter_map(|slot| match slot {
            Slot::Occupied { hash, value } => Some((hash, value)),
            _ => None,
        });
        for ((hash, value), index) in live.zip(targets) {
            slots[index] = Slot::Occupied { hash, value };
        }

        self.slots = slots;
        self.tombstones = 0;
        Ok(())
    }

    fn plan_rehash(&self, mut capacity: usize) -> Result<(usize, Vec<usize>), TryReserveError> {
        'grow: loop {
            let mut claimed = try_filled(capacity, || false)?;
            let mut targets = Vec::new();
            targets
                .try_reserve_exact(self.populated)
                .map_err(|_| TryReserveError::AllocError { slots: capacity })?;

            for slot in &self.slots {
                let Slot::Occupied { hash, .. } = slot else {
                    continue;
                };
                match Probe::start(*hash, capacity).find(|&index| !claimed[index]) {
                    Some(index) => {
                        claimed[index] = true;
                        targets.push(index);
                    }
                    None => {
                        capacity =
                            grown_capacity(capacity).ok_or(TryReserveError::CapacityOverflow)?;
                        continue 'grow;
                    }
                }
            }

            return Ok((capacity, targets));
        }
    }

    #[cfg(any(test, feature = "stats"))]
    fn probe_length(&self, hash: u64, index: usize) -> usize {
        Probe::start(hash, self.capacity())
            .position(|probed| probed == index)
            .unwrap_or(0)
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = alloc::vec![0usize; 1];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { hash, .. } = slot {
                let length = self.probe_length(*hash, index);
                if bins.len() <= length {
                    bins.resize(length + 1, 0);
                }
                bins[length] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns occupancy and probe-length statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let total_probe: usize = histogram
            .bins
            .iter()
            .enumerate()
            .map(|(length, count)| length * count)
            .sum();
        let open_slots = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Open))
            .count();

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            tombstones: self.tombstones,
            open_slots,
            load: self.populated as f64 / self.capacity() as f64,
            max_load: f64::from(self.load_factor),
            max_probe_length: histogram.bins.len() - 1,
            mean_probe_length: if self.populated == 0 {
                0.0
            } else {
                total_probe as f64 / self.populated as f64
            },
            total_bytes: self.capacity() * mem::size_of::<Slot<V>>(),
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - the value is not present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - the value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Modifies an occupied entry in place. Returns `None` for a vacant entry.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant slot of a [`HashTable`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Returns the slot index the value will be written to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Inserts the value into the table and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        if matches!(table.slots[self.index], Slot::Tombstone) {
            table.tombstones -= 1;
        }
        table.populated += 1;

        let slot = &mut table.slots[self.index];
        *slot = Slot::Occupied {
            hash: self.hash,
            value,
        };
        match slot {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("slot was just filled"),
        }
    }
}

/// A view into an occupied slot of a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Returns the slot index holding the value.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Converts the entry into a mutable reference to the value, bound to
    /// the table's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        match &mut table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Removes the value from the table, leaving a tombstone, and returns it.
    pub fn remove(self) -> V {
        self.table.take(self.index)
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self {
        Iter {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for HashTable<V> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            slots: self.slots.into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type Item = &'a mut V;
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. It yields
/// owned values and resets every slot it passes to open.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<'a, V> Iterator for Drain<'a, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.slots.len() {
            let slot = mem::replace(&mut self.table.slots[self.index], Slot::Open);
            self.index += 1;
            match slot {
                Slot::Occupied { value, .. } => {
                    self.table.populated -= 1;
                    return Some(value);
                }
                Slot::Tombstone => self.table.tombstones -= 1,
                Slot::Open => {}
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
impl<V> FusedIterator for Drain<'_, V> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::primes::is_prime;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    fn insert_item(table: &mut HashTable<Item>, hash: u64, key: u64, value: i32) -> usize {
        match table.entry(hash, |v| v.key == key) {
            Entry::Vacant(entry) => {
                let index = entry.index();
                entry.insert(Item { key, value });
                index
            }
            Entry::Occupied(_) => panic!("unexpected occupied for {}: {:#?}", key, table),
        }
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            insert_item(&mut table, hash, k, (k as i32) * 2);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: (k as i32) * 2
                }),
                "{:#?}",
                table
            );
        }
        assert_eq!(table.len(), 32);
        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k).map(|v| v.value),
                Some((k as i32) * 2),
                "{:#?}",
                table
            );
        }

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        let k = 42u64;
        let hash = hash_key(&state, k);

        insert_item(&mut table, hash, k, 7);

        match table.entry(hash, |v| v.key == k) {
            Entry::Occupied(mut occ) => {
                let prev_value = occ.get().value;
                occ.get_mut().value = 11;
                assert_eq!(prev_value, 7, "{:#?}", table);
            }
            Entry::Vacant(_) => panic!("should be occupied: {} in {:#?}", k, table),
        }
        assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 11);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..5u64 {
            insert_item(&mut table, hash_key(&state, k), k, 1);
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            table.find_mut(hash, |v| v.key == k).unwrap().value += k as i32;
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 1 + k as i32);
        }
        assert!(table.find_mut(hash_key(&state, 99), |v| v.key == 99).is_none());
    }

    #[test]
    fn probe_sequence_visits_distinct_slots() {
        for capacity in [11usize, 13, 17, 23, 101] {
            for home in 0..capacity as u64 {
                let positions: Vec<usize> = Probe::start(home, capacity).collect();
                assert_eq!(positions.len(), capacity / 2 + 1);
                assert_eq!(positions[0], home as usize);

                let mut seen = vec![false; capacity];
                for &pos in &positions {
                    assert!(pos < capacity);
                    assert!(!seen[pos], "{} revisited from home {}", pos, home);
                    seen[pos] = true;
                }
            }
        }
    }

    #[test]
    fn probe_sequence_is_home_plus_squares() {
        let positions: Vec<usize> = Probe::start(0, 11).collect();
        assert_eq!(positions, [0, 1, 4, 9, 5, 3]);

        // Starting at the last index wraps with a true modulo.
        let positions: Vec<usize> = Probe::start(10, 11).collect();
        assert_eq!(positions, [10, 0, 3, 8, 4, 2]);
    }

    #[test]
    fn lookup_probes_past_tombstones() {
        let mut table: HashTable<Item> = HashTable::new();
        // Same home slot: 0, then 0 + 1², then 0 + 2².
        assert_eq!(insert_item(&mut table, 0, 1, 10), 0);
        assert_eq!(insert_item(&mut table, 11, 2, 20), 1);
        assert_eq!(insert_item(&mut table, 22, 3, 30), 4);

        assert_eq!(table.remove(0, |v| v.key == 1).map(|v| v.value), Some(10));
        assert_eq!(table.remove(11, |v| v.key == 2).map(|v| v.value), Some(20));
        assert_eq!(table.tombstones(), 2);

        assert_eq!(table.find(22, |v| v.key == 3).map(|v| v.value), Some(30));
        assert!(table.find(0, |v| v.key == 1).is_none());
    }

    #[test]
    fn insert_reuses_first_tombstone() {
        let mut table: HashTable<Item> = HashTable::new();
        insert_item(&mut table, 0, 1, 10);
        insert_item(&mut table, 11, 2, 20);
        table.remove(0, |v| v.key == 1);

        assert_eq!(insert_item(&mut table, 33, 4, 40), 0);
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.find(11, |v| v.key == 2).map(|v| v.value), Some(20));
        assert_eq!(table.find(33, |v| v.key == 4).map(|v| v.value), Some(40));
    }

    #[test]
    fn insert_finds_existing_value_behind_tombstone() {
        let mut table: HashTable<Item> = HashTable::new();
        insert_item(&mut table, 0, 1, 10);
        insert_item(&mut table, 11, 2, 20);
        table.remove(0, |v| v.key == 1);

        match table.entry(11, |v| v.key == 2) {
            Entry::Occupied(entry) => assert_eq!(entry.index(), 1),
            Entry::Vacant(_) => panic!("value behind tombstone was missed: {:#?}", table),
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn wrap_around_at_last_index() {
        let mut table: HashTable<Item> = HashTable::new();
        assert_eq!(insert_item(&mut table, 10, 1, 10), 10);
        assert_eq!(insert_item(&mut table, 21, 2, 20), 0);
        assert_eq!(insert_item(&mut table, 32, 3, 30), 3);

        assert_eq!(table.remove(10, |v| v.key == 1).map(|v| v.value), Some(10));
        assert_eq!(table.find(21, |v| v.key == 2).map(|v| v.value), Some(20));
        assert_eq!(table.remove(32, |v| v.key == 3).map(|v| v.value), Some(30));
        assert_eq!(table.remove(21, |v| v.key == 2).map(|v| v.value), Some(20));
        assert!(table.is_empty());
    }

    #[test]
    fn large_hashes_stay_in_range() {
        let mut table: HashTable<Item> = HashTable::new();
        let hashes = [u64::MAX, u64::MAX - 1, 1 << 63, (1 << 63) - 1, 1 << 31];
        for (key, &hash) in hashes.iter().enumerate() {
            assert!(table.hash_index(hash) < table.capacity());
            insert_item(&mut table, hash, key as u64, key as i32);
        }
        for (key, &hash) in hashes.iter().enumerate() {
            assert_eq!(
                table.find(hash, |v| v.key == key as u64).map(|v| v.value),
                Some(key as i32)
            );
        }
    }

    #[test]
    fn capacity_rules() {
        assert_eq!(HashTable::<u64>::new().capacity(), 11);
        assert_eq!(HashTable::<u64>::with_capacity(0).capacity(), 11);
        assert_eq!(HashTable::<u64>::with_capacity(5).capacity(), 11);
        assert_eq!(HashTable::<u64>::with_capacity(13).capacity(), 13);
        assert_eq!(HashTable::<u64>::with_capacity(20).capacity(), 23);
        assert_eq!(HashTable::<u64>::with_capacity(1000).capacity(), 1009);
    }

    #[test]
    fn load_factor_policy() {
        let lf = |f: f32| HashTable::<u64>::with_capacity_and_load_factor(11, f).load_factor();
        assert_eq!(lf(0.5), 0.5);
        assert_eq!(lf(0.99), 0.99);
        assert_eq!(lf(0.0), 0.0);
        assert_eq!(lf(-0.25), -0.25);
        assert_eq!(lf(1.0), DEFAULT_LOAD_FACTOR);
        assert_eq!(lf(1.5), DEFAULT_LOAD_FACTOR);
        assert_eq!(lf(f32::NAN), DEFAULT_LOAD_FACTOR);
    }

    #[test]
    fn resize_at_load_factor_boundary() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..9u64 {
            insert_item(&mut table, k, k, k as i32);
        }
        // 8 / 11 was not above 0.75 when the ninth key went in.
        assert_eq!(table.capacity(), 11);

        // 9 / 11 is.
        insert_item(&mut table, 9, 9, 9);
        assert_eq!(table.capacity(), 17);
        assert_eq!(table.len(), 10);
        for k in 0..10u64 {
            assert_eq!(table.find(k, |v| v.key == k).map(|v| v.value), Some(k as i32));
        }
    }

    #[test]
    fn resize_drops_tombstones() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..9u64 {
            insert_item(&mut table, k, k, 0);
        }
        for k in 0..4u64 {
            table.remove(k, |v| v.key == k);
        }
        assert_eq!(table.tombstones(), 4);

        table.reserve(40);
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.len(), 5);
        for k in 4..9u64 {
            assert!(table.find(k, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn negative_load_factor_grows_on_every_insert() {
        let mut table: HashTable<Item> = HashTable::with_capacity_and_load_factor(11, -1.0);
        let mut capacities = Vec::new();
        for k in 0..3u64 {
            insert_item(&mut table, k, k, 0);
            capacities.push(table.capacity());
        }
        assert_eq!(capacities, [17, 29, 47]);
    }

    #[test]
    fn zero_load_factor_grows_once_non_empty() {
        let mut table: HashTable<Item> = HashTable::with_capacity_and_load_factor(11, 0.0);
        insert_item(&mut table, 0, 0, 0);
        assert_eq!(table.capacity(), 11);
        insert_item(&mut table, 1, 1, 0);
        assert_eq!(table.capacity(), 17);
    }

    #[test]
    fn colliding_hashes_grow_when_probe_is_exhausted() {
        let mut table: HashTable<Item> = HashTable::with_capacity_and_load_factor(11, 0.99);
        // Every key has the same hash; only 6 slots are reachable from it.
        for k in 0..6u64 {
            insert_item(&mut table, 7, k, 0);
        }
        assert_eq!(table.capacity(), 11);

        insert_item(&mut table, 7, 6, 0);
        assert!(table.capacity() > 11);
        assert_eq!(table.len(), 7);
        for k in 0..7u64 {
            assert!(table.find(7, |v| v.key == k).is_some(), "{:#?}", table);
        }
    }

    #[test]
    fn capacity_stays_prime_through_growth() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        let mut last = table.capacity();
        for k in 0..2_000u64 {
            insert_item(&mut table, hash_key(&state, k), k, 0);
            if table.capacity() != last {
                assert!(table.capacity() > last);
                assert!(is_prime(table.capacity()), "{}", table.capacity());
                last = table.capacity();
            }
        }
        assert!(table.capacity() >= 11);
        assert_eq!(table.len(), 2_000);
    }

    #[test]
    fn remove_and_reinsert_cycles() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for round in 0..20 {
            for k in 0..8u64 {
                insert_item(&mut table, hash_key(&state, k), k, round);
            }
            for k in 0..8u64 {
                let removed = table.remove(hash_key(&state, k), |v| v.key == k);
                assert_eq!(removed.map(|v| v.value), Some(round));
            }
            assert!(table.is_empty());
        }
    }

    #[test]
    fn remove_on_empty_table() {
        let mut table: HashTable<Item> = HashTable::new();
        assert!(table.remove(3, |v| v.key == 3).is_none());
        assert_eq!(table.tombstones(), 0);
    }

    #[test]
    fn occupied_entry_remove() {
        let mut table: HashTable<Item> = HashTable::new();
        insert_item(&mut table, 4, 4, 40);
        match table.entry(4, |v| v.key == 4) {
            Entry::Occupied(entry) => assert_eq!(entry.remove().value, 40),
            Entry::Vacant(_) => panic!("expected occupied"),
        }
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 1);
    }

    #[test]
    fn entry_helpers() {
        let mut table: HashTable<(u64, i32)> = HashTable::new();
        *table.entry(1, |&(k, _)| k == 1).or_insert((1, 0)) = (1, 5);
        table.entry(2, |&(k, _)| k == 2).or_insert_with(|| (2, 7));
        assert!(table.entry(3, |&(k, _)| k == 3).and_modify(|_| {}).is_none());
        table.entry(1, |&(k, _)| k == 1).and_modify(|(_, v)| *v += 1);

        assert_eq!(table.find(1, |&(k, _)| k == 1), Some(&(1, 6)));
        assert_eq!(table.find(2, |&(k, _)| k == 2), Some(&(2, 7)));
        assert_eq!(table.len(), 2);

        let mut counts: HashTable<u32> = HashTable::new();
        *counts.entry(9, |_| true).or_default() += 3;
        assert_eq!(counts.find(9, |_| true), Some(&3));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table: HashTable<Item> = HashTable::with_capacity(30);
        for k in 0..10u64 {
            insert_item(&mut table, k, k, 0);
        }
        table.remove(0, |v| v.key == 0);
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.capacity(), 31);
        assert!(table.find(1, |v| v.key == 1).is_none());
    }

    #[test]
    fn iterators() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..6u64 {
            insert_item(&mut table, k, k, k as i32);
        }
        table.remove(2, |v| v.key == 2);

        let iter = table.iter();
        assert_eq!(iter.len(), 5);
        let mut keys: Vec<u64> = iter.map(|v| v.key).collect();
        keys.sort_unstable();
        assert_eq!(keys, [0, 1, 3, 4, 5]);

        for item in table.iter_mut() {
            item.value *= 10;
        }
        let total: i32 = (&table).into_iter().map(|v| v.value).sum();
        assert_eq!(total, 130);

        let mut owned: Vec<u64> = table.into_iter().map(|v| v.key).collect();
        owned.sort_unstable();
        assert_eq!(owned, [0, 1, 3, 4, 5]);
    }

    #[test]
    fn drain_empties_table() {
        let mut table: HashTable<String> = HashTable::new();
        for k in 0..5u64 {
            let s = k.to_string();
            table.entry(k, |v| *v == s).or_insert(s.clone());
        }
        table.remove(1, |v| v == "1");

        let mut drained: Vec<String> = table.drain().collect();
        drained.sort();
        assert_eq!(drained, ["0", "2", "3", "4"]);
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.capacity(), 11);
    }

    #[test]
    fn dropped_drain_still_empties() {
        let mut table: HashTable<u64> = HashTable::new();
        for k in 0..5u64 {
            table.entry(k, |&v| v == k).or_insert(k);
        }
        let mut drain = table.drain();
        assert!(drain.next().is_some());
        drop(drain);
        assert!(table.is_empty());
    }

    #[test]
    fn test_clone() {
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..20u64 {
            insert_item(&mut table, k * 3, k, k as i32);
        }
        table.remove(0, |v| v.key == 0);

        let cloned = table.clone();
        assert_eq!(cloned.len(), table.len());
        assert_eq!(cloned.capacity(), table.capacity());
        assert_eq!(cloned.tombstones(), table.tombstones());
        for k in 1..20u64 {
            assert_eq!(cloned.find(k * 3, |v| v.key == k), table.find(k * 3, |v| v.key == k));
        }
    }

    #[test]
    fn reserve_and_try_reserve() {
        let mut table: HashTable<Item> = HashTable::new();
        table.reserve(5);
        assert_eq!(table.capacity(), 11);

        table.reserve(100);
        assert!(is_prime(table.capacity()));
        let capacity = table.capacity();
        for k in 0..100u64 {
            insert_item(&mut table, k, k, 0);
        }
        assert_eq!(table.capacity(), capacity);

        assert_eq!(
            table.try_reserve(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn try_with_capacity_overflow() {
        assert_eq!(
            HashTable::<u64>::try_with_capacity(usize::MAX).unwrap_err(),
            TryReserveError::CapacityOverflow
        );
    }

    #[test]
    fn debug_output() {
        let mut table: HashTable<u64> = HashTable::new();
        table.entry(0x2a, |&v| v == 1).or_insert(1);
        table.entry(3, |&v| v == 2).or_insert(2);
        table.remove(3, |&v| v == 2);

        let debug = alloc::format!("{:?}", table);
        assert!(debug.contains("populated: 1"), "{}", debug);
        assert!(debug.contains("tombstones: 1"), "{}", debug);
        assert!(debug.contains("2a"), "{}", debug);
        assert!(debug.contains("xx"), "{}", debug);
    }

    #[test]
    fn stats_and_histogram() {
        let mut table: HashTable<Item> = HashTable::new();
        let empty = table.debug_stats();
        assert_eq!(empty.populated, 0);
        assert_eq!(empty.max_probe_length, 0);
        assert_eq!(empty.mean_probe_length, 0.0);

        insert_item(&mut table, 0, 1, 0);
        insert_item(&mut table, 11, 2, 0);
        insert_item(&mut table, 22, 3, 0);
        insert_item(&mut table, 5, 4, 0);

        let histogram = table.probe_histogram();
        // Key 4 homes at 5, which is free; keys 1..=3 sit 0, 1 and 2 steps in.
        assert_eq!(histogram.bins, [2, 1, 1]);
        assert_eq!(histogram.total(), 4);

        table.remove(5, |v| v.key == 4);
        let stats = table.debug_stats();
        assert_eq!(stats.populated, 3);
        assert_eq!(stats.capacity, 11);
        assert_eq!(stats.tombstones, 1);
        assert_eq!(stats.open_slots, 7);
        assert_eq!(stats.max_probe_length, 2);
        assert!((stats.mean_probe_length - 1.0).abs() < f64::EPSILON);
        assert!((stats.max_load - 0.75).abs() < f64::EPSILON);

        #[cfg(feature = "std")]
        {
            stats.print();
            histogram.print();
        }
    }
}

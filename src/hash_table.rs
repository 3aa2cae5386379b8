use allocator_api2::alloc::Allocator;
use allocator_api2::alloc::Global;
use allocator_api2::vec::Vec;
use core::fmt::Debug;

/// Number of hash bits kept next to the probe distance in every bucket.
const FINGERPRINT_BITS: u32 = 8;

const FINGERPRINT_MASK: u32 = (1 << FINGERPRINT_BITS) - 1;

/// Value representing a probe distance of one in `distance_and_fingerprint`.
/// Zero is reserved for empty buckets, so distances are 1-based.
const DISTANCE_INCREMENT: u32 = 1 << FINGERPRINT_BITS;

/// Bucket count allocated on first insert.
const MIN_BUCKETS: usize = 16;

/// Entry indices are stored as `u32`, and the load factor keeps the entry
/// count strictly below the bucket count.
///
/// Distances only have 24 bits, so a single displacement run is bounded by
/// 2^24 - 1 buckets well below this limit. `Bucket::step` asserts that bound.
const MAX_BUCKETS: usize = 1 << 31;

/// The dense store may hold 13/16 (0.8125) of the bucket count.
#[inline(always)]
fn max_entries(bucket_count: usize) -> usize {
    bucket_count / 16 * 13
}

/// Smallest power-of-two bucket count able to hold `capacity` entries.
fn bucket_count_for(capacity: usize) -> usize {
    let mut bucket_count = capacity
        .checked_next_power_of_two()
        .expect("capacity overflow");
    if max_entries(bucket_count) < capacity {
        bucket_count = bucket_count.checked_mul(2).expect("capacity overflow");
    }
    bucket_count.max(MIN_BUCKETS)
}

/// Metadata slot of the bucket table.
///
/// The upper 24 bits of `distance_and_fingerprint` hold the 1-based distance
/// to the ideal bucket, the lower 8 bits hold bits of the hash. Comparing the
/// packed value compares the distance first, and two buckets with equal
/// values are worth a key comparison.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
struct Bucket {
    distance_and_fingerprint: u32,
    entry_index: u32,
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        distance_and_fingerprint: 0,
        entry_index: 0,
    };

    /// Signature of a key sitting in its ideal bucket.
    #[inline(always)]
    fn signature(hash: u64) -> u32 {
        (hash as u32 & FINGERPRINT_MASK) + DISTANCE_INCREMENT
    }

    /// Move a packed signature one bucket further from its ideal bucket.
    #[inline(always)]
    fn step(distance_and_fingerprint: u32) -> u32 {
        debug_assert!(
            distance_and_fingerprint <= u32::MAX - DISTANCE_INCREMENT,
            "displacement overflow: run longer than 2^24 - 1 buckets"
        );
        distance_and_fingerprint + DISTANCE_INCREMENT
    }

    #[inline(always)]
    fn is_empty(self) -> bool {
        self.distance_and_fingerprint == 0
    }

    #[inline(always)]
    fn distance(self) -> u32 {
        self.distance_and_fingerprint >> FINGERPRINT_BITS
    }

    #[inline(always)]
    fn fingerprint(self) -> u32 {
        self.distance_and_fingerprint & FINGERPRINT_MASK
    }
}

/// Outcome of a probe: where the key is, or where it belongs.
#[derive(Clone, Copy)]
struct Probe {
    bucket_index: usize,
    distance_and_fingerprint: u32,
    found: bool,
}

/// Probe for the insertion point of a key known to be absent. Never looks at
/// the dense store.
#[inline]
fn find_vacant_bucket(buckets: &[Bucket], hash: u64) -> Probe {
    let mask = buckets.len() - 1;
    let mut bucket_index = hash as usize & mask;
    let mut distance_and_fingerprint = Bucket::signature(hash);

    while buckets[bucket_index].distance_and_fingerprint >= distance_and_fingerprint {
        distance_and_fingerprint = Bucket::step(distance_and_fingerprint);
        bucket_index = (bucket_index + 1) & mask;
    }

    Probe {
        bucket_index,
        distance_and_fingerprint,
        found: false,
    }
}

/// Place `bucket` at `bucket_index`, pushing the rest of the run one slot to
/// the right until an empty bucket absorbs it.
#[inline]
fn insert_bucket(buckets: &mut [Bucket], mut bucket: Bucket, mut bucket_index: usize) {
    let mask = buckets.len() - 1;
    loop {
        core::mem::swap(&mut buckets[bucket_index], &mut bucket);
        if bucket.is_empty() {
            break;
        }

        bucket.distance_and_fingerprint = Bucket::step(bucket.distance_and_fingerprint);
        bucket_index = (bucket_index + 1) & mask;
    }
}

/// Remove the bucket at `bucket_index` and shift the following run back by one
/// slot. Stops at the first bucket already in its ideal slot (or empty).
#[inline]
fn erase_bucket(buckets: &mut [Bucket], mut bucket_index: usize) {
    let mask = buckets.len() - 1;
    loop {
        let next_index = (bucket_index + 1) & mask;
        let mut next = buckets[next_index];

        // Empty buckets have a distance of 0 and also end the shift.
        if next.distance_and_fingerprint < 2 * DISTANCE_INCREMENT {
            break;
        }

        next.distance_and_fingerprint -= DISTANCE_INCREMENT;
        buckets[bucket_index] = next;
        bucket_index = next_index;
    }

    buckets[bucket_index] = Bucket::EMPTY;
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the dense store
    pub populated: usize,
    /// Maximum number of entries before the bucket table grows
    pub capacity: usize,
    /// Number of buckets in the bucket table
    pub bucket_count: usize,
    /// Longest probe distance of any entry (1 = ideal bucket)
    pub max_probe_distance: usize,
    /// Mean probe distance over all entries (1.0 = every entry ideal)
    pub mean_probe_distance: f64,
    /// Load factor (populated / bucket_count)
    pub load_factor: f64,
    /// Bytes held by the dense store and the bucket table
    pub total_bytes: usize,
    /// Bytes reserved but not holding an entry or an occupied bucket
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor over {} buckets)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.bucket_count
        );
        println!(
            "Probe distance: mean {:.3}, max {}",
            self.mean_probe_distance, self.max_probe_distance
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// A dense hash table using Robin Hood hashing with backward-shift deletion.
///
/// `HashTable<V>` keeps its values contiguously in insertion order (erasure
/// moves the last value into the hole), and a separate power-of-two bucket
/// table of 8-byte metadata slots pointing into that dense store. Like
/// [`hashbrown::HashTable`], the caller provides the hash and an equality
/// predicate for each operation. Operations that may move buckets around also
/// take a `hasher` closure, used to rehash values already in the table.
///
/// ## Performance Characteristics
///
/// - **Memory**: 8 bytes per bucket, buckets are at most 81.25% full, plus the
///   size of `V` per reserved entry.
/// - **Iteration**: a plain slice walk over the dense store.
///
/// [`hashbrown::HashTable`]: https://docs.rs/hashbrown/latest/hashbrown/struct.HashTable.html
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_dense::hash_table::HashTable;
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
///
/// // Insert a person
/// match table.entry(hash_id(123), |p: &Person| p.id == 123, |p| hash_id(p.id)) {
///     robin_dense::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     robin_dense::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash_id(123), |p| p.id == 123).unwrap().name, "Alice");
/// ```
pub struct HashTable<V, A: Allocator + Clone = Global> {
    entries: Vec<V, A>,
    buckets: Vec<Bucket, A>,
    max_entries: usize,
}

impl<V, A: Allocator + Clone> Debug for HashTable<V, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        if self.buckets.is_empty() {
            return f
                .debug_struct("HashTable")
                .field("metadata", &"empty")
                .field("populated", &self.entries.len())
                .field("capacity", &self.max_entries)
                .finish();
        }

        f.debug_struct("HashTable")
            .field(
                "metadata",
                &self
                    .buckets
                    .chunks(8)
                    .map(|row| {
                        row.iter()
                            .map(|b| {
                                if b.is_empty() {
                                    "............".to_string()
                                } else {
                                    format!(
                                        "{:02}:{:02x}>{:05}",
                                        b.distance(),
                                        b.fingerprint(),
                                        b.entry_index
                                    )
                                }
                            })
                            .collect::<alloc::vec::Vec<_>>()
                            .join(", ")
                    })
                    .collect::<alloc::vec::Vec<String>>(),
            )
            .field("populated", &self.entries.len())
            .field("capacity", &self.max_entries)
            .finish()
    }
}

impl<V, A> Clone for HashTable<V, A>
where
    V: Clone,
    A: Allocator + Clone,
{
    fn clone(&self) -> Self {
        let mut entries = Vec::with_capacity_in(self.max_entries, self.allocator().clone());
        entries.extend(self.entries.iter().cloned());

        Self {
            entries,
            buckets: self.buckets.clone(),
            max_entries: self.max_entries,
        }
    }
}

impl<V, A> Default for HashTable<V, A>
where
    A: Allocator + Clone + Default,
{
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<V> HashTable<V> {
    /// Creates an empty hash table. Nothing is allocated until the first
    /// insertion.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            buckets: Vec::new(),
            max_entries: 0,
        }
    }

    /// Creates a new hash table able to hold at least `capacity` values
    /// without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_dense::hash_table::HashTable;
    /// #
    /// // Create a table that can hold at least 100 items without resizing
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// assert!(table.bucket_count().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<V, A: Allocator + Clone> HashTable<V, A> {
    /// Creates an empty hash table backed by `alloc`. Nothing is allocated
    /// until the first insertion.
    pub fn new_in(alloc: A) -> Self {
        Self {
            entries: Vec::new_in(alloc.clone()),
            buckets: Vec::new_in(alloc),
            max_entries: 0,
        }
    }

    /// Creates a new hash table backed by `alloc`, able to hold at least
    /// `capacity` values without growing.
    ///
    /// The dense store is allocated before the bucket table, so an allocator
    /// that extends its most recent block can grow the store in place.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        let mut table = Self::new_in(alloc);
        if capacity > 0 {
            // Nothing to rehash in an empty table.
            table.grow(bucket_count_for(capacity), |_| 0);
        }
        table
    }

    /// Returns a reference to the allocator backing both arrays.
    pub fn allocator(&self) -> &A {
        self.entries.allocator()
    }

    /// Returns an iterator over all values in the table, in dense-store order.
    ///
    /// The order is insertion order until the first removal, which moves the
    /// last value into the removed value's position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_dense::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// for key in ["key1", "key2"] {
    ///     table
    ///         .entry(hash_str(key), |s: &String| s == key, |s| hash_str(s))
    ///         .or_insert(key.to_string());
    /// }
    ///
    /// let values: Vec<&String> = table.iter().collect();
    /// assert_eq!(values, ["key1", "key2"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator over mutable references to all values in the table.
    ///
    /// Mutating a value in a way that changes its hash or equality leaves the
    /// table unable to find it.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// Returns the dense store as a slice.
    pub fn as_slice(&self) -> &[V] {
        &self.entries
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The bucket table is reset immediately; the allocation of both arrays
    /// is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_dense::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table
    ///     .entry(hash_str("key1"), |s: &String| s == "key1", |s| hash_str(s))
    ///     .or_insert("key1".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values.len(), 1);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V, A> {
        self.buckets.fill(Bucket::EMPTY);
        Drain {
            inner: self.entries.drain(..),
        }
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of values the table can hold before the bucket
    /// table grows.
    ///
    /// This is always `bucket_count() * 13 / 16`.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Returns the number of buckets in the bucket table. Always zero or a
    /// power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Removes all elements from the table.
    ///
    /// Both the dense store and the bucket table keep their allocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_dense::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&n: &u64| n == 1, |&n| n).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2, |&n| n).or_insert(2);
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.fill(Bucket::EMPTY);
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// The bucket count is rounded up to the next power of two holding
    /// `len() + additional` values at the 13/16 load factor. The table never
    /// shrinks. Does nothing if capacity is already sufficient.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_dense::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// for i in 0..15 {
    ///     table.entry(i, |&n| n == i, |&n| n).or_insert(i);
    /// }
    ///
    /// table.reserve(50, |&n| n);
    /// assert!(table.capacity() >= 65);
    /// ```
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&V) -> u64) {
        let required = self
            .entries
            .len()
            .checked_add(additional)
            .expect("capacity overflow");
        if required > self.max_entries {
            self.grow(bucket_count_for(required), hasher);
        }
    }

    /// Returns a reference to the value matching `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_dense::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42, |&n| n).or_insert(42);
    ///
    /// assert_eq!(table.find(42, |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(7, |&n| n == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.find_index(hash, eq).map(|index| &self.entries[index])
    }

    /// Returns a mutable reference to the value matching `eq`, if any.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        self.find_index(hash, eq).map(|index| &mut self.entries[index])
    }

    /// Returns the position in the dense store of the value matching `eq`.
    ///
    /// The position stays valid until the table is next mutated.
    pub fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }

        let probe = self.find_bucket(hash, eq);
        probe
            .found
            .then(|| self.buckets[probe.bucket_index].entry_index as usize)
    }

    /// Returns the value at `index` in the dense store.
    pub fn get_index(&self, index: usize) -> Option<&V> {
        self.entries.get(index)
    }

    /// Returns the value at `index` in the dense store, mutably.
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut V> {
        self.entries.get_mut(index)
    }

    /// Removes and returns the value matching `eq`.
    ///
    /// If the removed value was not the last one in the dense store, the last
    /// value takes its position; `hasher` is called on it to find its bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_dense::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42, |&n| n).or_insert(42);
    ///
    /// let removed = table.remove(42, |&n| n == 42, |&n| n);
    /// assert_eq!(removed, Some(42));
    /// assert!(table.is_empty());
    ///
    /// // Removing non-existent value returns None
    /// let not_found = table.remove(99, |&n| n == 99, |&n| n);
    /// assert_eq!(not_found, None);
    /// ```
    pub fn remove(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Option<V> {
        if self.entries.is_empty() {
            return None;
        }

        let probe = self.find_bucket(hash, eq);
        if !probe.found {
            return None;
        }

        Some(self.erase_at(probe.bucket_index, hasher))
    }

    /// Removes and returns the value at `index` in the dense store, moving the
    /// last value into its position.
    ///
    /// Returns `None` if `index` is out of bounds. Positions are invalidated
    /// by every mutation of the table.
    pub fn swap_remove_index(&mut self, index: usize, hasher: impl Fn(&V) -> u64) -> Option<V> {
        let hash = hasher(self.entries.get(index)?);
        let bucket_index = self.bucket_for_entry(hash, index);
        Some(self.erase_at(bucket_index, hasher))
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// Every value is visited once; removed values are replaced by the last
    /// value of the dense store, which is visited next.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool, hasher: impl Fn(&V) -> u64) {
        let mut index = 0;
        while index < self.entries.len() {
            if f(&mut self.entries[index]) {
                index += 1;
            } else {
                self.swap_remove_index(index, &hasher);
            }
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// Grows the table first if it is at capacity, so a vacant entry can
    /// always be filled without rehashing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_dense::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// let hash = hash_str("hello");
    ///
    /// // Insert or update pattern
    /// match table.entry(hash, |s: &String| s == "hello", |s| hash_str(s)) {
    ///     robin_dense::hash_table::Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     robin_dense::hash_table::Entry::Occupied(mut entry) => {
    ///         entry.get_mut().push('!');
    ///     }
    /// }
    ///
    /// // Or use the convenience method
    /// table
    ///     .entry(hash, |s: &String| s == "hello", |s| hash_str(s))
    ///     .or_insert("hello".to_string());
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Entry<'_, V, A> {
        if self.entries.len() >= self.max_entries {
            self.grow((self.buckets.len() * 2).max(MIN_BUCKETS), hasher);
        }

        let probe = self.find_bucket(hash, eq);
        if probe.found {
            Entry::Occupied(OccupiedEntry {
                table: self,
                bucket_index: probe.bucket_index,
            })
        } else {
            Entry::Vacant(VacantEntry {
                table: self,
                bucket_index: probe.bucket_index,
                distance_and_fingerprint: probe.distance_and_fingerprint,
            })
        }
    }

    #[inline(always)]
    fn bucket_mask(&self) -> usize {
        debug_assert!(self.buckets.len().is_power_of_two());
        self.buckets.len() - 1
    }

    /// Find the bucket holding the value matching `eq`, or the bucket where it
    /// would be inserted.
    ///
    /// The bucket table must be allocated. The load factor guarantees an empty
    /// bucket, so the walk always terminates.
    #[inline]
    fn find_bucket(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mask = self.bucket_mask();
        let mut bucket_index = hash as usize & mask;
        let mut distance_and_fingerprint = Bucket::signature(hash);

        loop {
            let bucket = self.buckets[bucket_index];

            // The fingerprint only narrows the candidates; equality decides.
            if bucket.distance_and_fingerprint == distance_and_fingerprint {
                if eq(&self.entries[bucket.entry_index as usize]) {
                    return Probe {
                        bucket_index,
                        distance_and_fingerprint,
                        found: true,
                    };
                }
            } else if bucket.distance_and_fingerprint < distance_and_fingerprint {
                // Empty, or a resident closer to its ideal bucket than we are
                // to ours: the key would have displaced it.
                return Probe {
                    bucket_index,
                    distance_and_fingerprint,
                    found: false,
                };
            }

            distance_and_fingerprint = Bucket::step(distance_and_fingerprint);
            bucket_index = (bucket_index + 1) & mask;
        }
    }

    /// Find the bucket pointing at `entry_index`. Compares indices only, the
    /// entry is known to be present.
    fn bucket_for_entry(&self, hash: u64, entry_index: usize) -> usize {
        let mask = self.bucket_mask();
        let mut bucket_index = hash as usize & mask;

        loop {
            let bucket = self.buckets[bucket_index];
            debug_assert!(
                !bucket.is_empty(),
                "entry {entry_index} is not reachable from its ideal bucket"
            );

            if bucket.entry_index as usize == entry_index && !bucket.is_empty() {
                return bucket_index;
            }

            bucket_index = (bucket_index + 1) & mask;
        }
    }

    /// Erase the value referenced by the bucket at `bucket_index`, keeping the
    /// dense store compact.
    fn erase_at(&mut self, bucket_index: usize, hasher: impl Fn(&V) -> u64) -> V {
        let entry_index = self.buckets[bucket_index].entry_index as usize;
        let last_index = self.entries.len() - 1;

        // Hash the value that will be relocated before any bucket moves.
        let moved_hash = (entry_index != last_index).then(|| hasher(&self.entries[last_index]));

        erase_bucket(&mut self.buckets, bucket_index);

        if let Some(moved_hash) = moved_hash {
            let moved_bucket = self.bucket_for_entry(moved_hash, last_index);
            self.buckets[moved_bucket].entry_index = entry_index as u32;
        }

        self.entries.swap_remove(entry_index)
    }

    /// Rebuild the bucket table with `bucket_count` buckets.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, bucket_count: usize, hasher: impl Fn(&V) -> u64) {
        debug_assert!(bucket_count.is_power_of_two());
        debug_assert!(bucket_count > self.buckets.len());
        assert!(bucket_count <= MAX_BUCKETS, "capacity overflow");

        let max_entries = max_entries(bucket_count);

        // The old buckets are released before the dense store is reserved, so
        // an allocator that grows its latest block in place can extend it.
        self.buckets = Vec::new_in(self.allocator().clone());
        self.entries
            .reserve_exact(max_entries.saturating_sub(self.entries.len()));
        let mut buckets = Vec::with_capacity_in(bucket_count, self.allocator().clone());
        buckets.resize(bucket_count, Bucket::EMPTY);
        self.buckets = buckets;
        self.max_entries = max_entries;

        for (entry_index, entry) in self.entries.iter().enumerate() {
            let probe = find_vacant_bucket(&self.buckets, hasher(entry));
            insert_bucket(
                &mut self.buckets,
                Bucket {
                    distance_and_fingerprint: probe.distance_and_fingerprint,
                    entry_index: entry_index as u32,
                },
                probe.bucket_index,
            );
        }
    }

    /// Computes a histogram of probe distances for the current table state.
    ///
    /// Index `i` counts the entries stored `i` buckets past their ideal
    /// bucket. The vector is as long as the longest probe.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        let mut hist = alloc::vec::Vec::new();
        for bucket in self.buckets.iter().filter(|b| !b.is_empty()) {
            let offset = bucket.distance() as usize - 1;
            if hist.len() <= offset {
                hist.resize(offset + 1, 0);
            }
            hist[offset] += 1;
        }
        hist
    }

    /// Returns detailed performance and utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let populated = self.entries.len();
        let distance_sum: usize = hist
            .iter()
            .enumerate()
            .map(|(offset, count)| (offset + 1) * count)
            .sum();

        let entry_bytes = self.entries.capacity() * core::mem::size_of::<V>();
        let bucket_bytes = self.buckets.len() * core::mem::size_of::<Bucket>();

        DebugStats {
            populated,
            capacity: self.max_entries,
            bucket_count: self.buckets.len(),
            max_probe_distance: hist.len(),
            mean_probe_distance: if populated == 0 {
                0.0
            } else {
                distance_sum as f64 / populated as f64
            },
            load_factor: if self.buckets.is_empty() {
                0.0
            } else {
                populated as f64 / self.buckets.len() as f64
            },
            total_bytes: entry_bytes + bucket_bytes,
            wasted_bytes: (self.entries.capacity() - populated) * core::mem::size_of::<V>()
                + (self.buckets.len() - populated) * core::mem::size_of::<Bucket>(),
        }
    }

    /// Pretty-prints the probe-distance histogram horizontally using stdout.
    ///
    /// Requires the `std` feature. Each row is a probe distance, starting at 1
    /// for entries in their ideal bucket.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = *hist.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.entries.len());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let full = units / 8;
            let rem = units % 8;
            let mut bar = "█".repeat(full);
            if rem > 0 {
                let ch = match rem {
                    1 => '▏',
                    2 => '▎',
                    3 => '▍',
                    4 => '▌',
                    5 => '▋',
                    6 => '▊',
                    7 => '▉',
                    _ => unreachable!(),
                };
                bar.push(ch);
            }
            bar
        };

        for (offset, &count) in hist.iter().enumerate() {
            println!("{:>3} | {} ({})", offset + 1, make_bar(count), count);
        }
    }

    /// Checks every structural invariant of the table, panicking on the first
    /// violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self, hasher: impl Fn(&V) -> u64) {
        let bucket_count = self.buckets.len();
        assert!(bucket_count == 0 || bucket_count.is_power_of_two());
        assert_eq!(self.max_entries, max_entries(bucket_count));
        assert!(self.entries.len() <= self.max_entries, "{self:#?}");

        let mut seen = alloc::vec![false; self.entries.len()];
        for bucket in self.buckets.iter().filter(|b| !b.is_empty()) {
            let index = bucket.entry_index as usize;
            assert!(index < self.entries.len(), "dangling bucket {self:#?}");
            assert!(!seen[index], "entry {index} referenced twice {self:#?}");
            seen[index] = true;
        }
        assert!(seen.iter().all(|s| *s), "unreferenced entry {self:#?}");

        if bucket_count == 0 {
            return;
        }

        let mask = self.bucket_mask();
        for (bucket_index, bucket) in self.buckets.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            let hash = hasher(&self.entries[bucket.entry_index as usize]);
            let ideal = hash as usize & mask;
            assert_eq!(
                bucket_index.wrapping_sub(ideal) & mask,
                bucket.distance() as usize - 1,
                "wrong distance at bucket {bucket_index}"
            );
            assert_eq!(bucket.fingerprint(), hash as u32 & FINGERPRINT_MASK);

            // Every bucket on the way must be at least as far from home,
            // otherwise lookup stops before reaching this one.
            let mut probe_index = ideal;
            let mut signature = Bucket::signature(hash);
            while probe_index != bucket_index {
                assert!(
                    self.buckets[probe_index].distance_and_fingerprint >= signature,
                    "robin hood order broken at bucket {probe_index}"
                );
                signature += DISTANCE_INCREMENT;
                probe_index = (probe_index + 1) & mask;
            }
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V, A: Allocator + Clone = Global> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V, A>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, V, A>),
}

impl<'a, V, A: Allocator + Clone> Entry<'a, V, A> {
    /// Ensures a value is in the entry by inserting the default if empty, and
    /// returns a mutable reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default
    /// function if empty.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry.
    ///
    /// Returns `None` if the entry is vacant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_dense::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&n: &u64| n == 1, |&n| n).or_insert(1);
    ///
    /// let result = table
    ///     .entry(1, |&n| n == 1, |&n| n)
    ///     .and_modify(|n| *n += 10);
    /// assert_eq!(result, Some(&mut 11));
    /// ```
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

    /// Ensures a value is in the entry by inserting the default value if
    /// empty.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a `HashTable`.
///
/// The bucket table already has room for the value; inserting never grows.
pub struct VacantEntry<'a, V, A: Allocator + Clone = Global> {
    table: &'a mut HashTable<V, A>,
    bucket_index: usize,
    distance_and_fingerprint: u32,
}

impl<'a, V, A: Allocator + Clone> VacantEntry<'a, V, A> {
    /// Inserts a value into the table and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let entry_index = self.table.entries.len();
        debug_assert!(entry_index < self.table.max_entries);

        self.table.entries.push(value);
        insert_bucket(
            &mut self.table.buckets,
            Bucket {
                distance_and_fingerprint: self.distance_and_fingerprint,
                entry_index: entry_index as u32,
            },
            self.bucket_index,
        );

        &mut self.table.entries[entry_index]
    }

    /// Position the value will take in the dense store.
    pub fn index(&self) -> usize {
        self.table.entries.len()
    }
}

/// A view into an occupied entry in a `HashTable`.
pub struct OccupiedEntry<'a, V, A: Allocator + Clone = Global> {
    table: &'a mut HashTable<V, A>,
    bucket_index: usize,
}

impl<'a, V, A: Allocator + Clone> OccupiedEntry<'a, V, A> {
    /// Position of the value in the dense store.
    pub fn index(&self) -> usize {
        self.table.buckets[self.bucket_index].entry_index as usize
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.table.entries[self.index()]
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        let index = self.index();
        &mut self.table.entries[index]
    }

    /// Converts the entry into a mutable reference to the value, with the
    /// lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let index = self.index();
        &mut self.table.entries[index]
    }

    /// Removes the value from the table and returns it.
    ///
    /// `hasher` rehashes the value that takes its position in the dense store.
    pub fn remove(self, hasher: impl Fn(&V) -> u64) -> V {
        self.table.erase_at(self.bucket_index, hasher)
    }
}

/// An iterator over the values of a `HashTable`, in dense-store order.
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, V>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a `HashTable`.
pub struct IterMut<'a, V> {
    inner: core::slice::IterMut<'a, V>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a `HashTable`.
///
/// Values not consumed are dropped together with the iterator.
pub struct Drain<'a, V, A: Allocator = Global> {
    inner: allocator_api2::vec::Drain<'a, V, A>,
}

impl<V, A: Allocator> Iterator for Drain<'_, V, A> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, A: Allocator> ExactSizeIterator for Drain<'_, V, A> {}

/// A consuming iterator over the values of a `HashTable`.
pub struct IntoIter<V, A: Allocator = Global> {
    inner: allocator_api2::vec::IntoIter<V, A>,
}

impl<V, A: Allocator> Iterator for IntoIter<V, A> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, A: Allocator> ExactSizeIterator for IntoIter<V, A> {}

impl<V, A: Allocator + Clone> IntoIterator for HashTable<V, A> {
    type IntoIter = IntoIter<V, A>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a, V, A: Allocator + Clone> IntoIterator for &'a HashTable<V, A> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

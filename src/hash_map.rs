use alloc::borrow::ToOwned;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Index;

use allocator_api2::alloc::Allocator;
use allocator_api2::alloc::Global;

use crate::DefaultHashBuilder;
use crate::Equivalent;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// Rehash closure for the pairs stored in the table.
fn make_hasher<K, V, S>(hash_builder: &S) -> impl Fn(&(K, V)) -> u64 + '_
where
    K: Hash,
    S: BuildHasher,
{
    move |entry: &(K, V)| hash_builder.hash_one(&entry.0)
}

/// What an insertion did to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertStatus {
    /// The key was absent and a new pair was added.
    Added,
    /// The key was present; the stored value was left untouched.
    Found,
    /// The key was present and its value was overwritten.
    Replaced,
}

/// Result of [`HashMap::insert`] and friends: references to the stored pair
/// and what happened to it.
#[derive(Debug)]
pub struct InsertResult<'a, K, V> {
    /// The key as stored in the map.
    pub key: &'a K,
    /// The value as stored in the map, after the insertion.
    pub value: &'a mut V,
    /// Whether the pair was added, found, or had its value replaced.
    pub status: InsertStatus,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ReplaceExisting {
    No,
    Yes,
}

/// Resolve a table entry for an insertion, building the key and value only
/// when they are stored.
fn emplace_internal<'a, K, V, A: Allocator + Clone>(
    entry: TableEntry<'a, (K, V), A>,
    replace: ReplaceExisting,
    make_key: impl FnOnce() -> K,
    make_value: impl FnOnce() -> V,
) -> InsertResult<'a, K, V> {
    match entry {
        TableEntry::Occupied(entry) => {
            let (key, value) = entry.into_mut();
            let status = match replace {
                ReplaceExisting::No => InsertStatus::Found,
                ReplaceExisting::Yes => {
                    *value = make_value();
                    InsertStatus::Replaced
                }
            };
            InsertResult { key, value, status }
        }
        TableEntry::Vacant(entry) => {
            let (key, value) = entry.insert((make_key(), make_value()));
            InsertResult {
                key,
                value,
                status: InsertStatus::Added,
            }
        }
    }
}

/// A hash map implemented using the dense Robin Hood `HashTable` as the
/// underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. Pairs live
/// contiguously in a dense store, so iteration is a slice walk. Removal moves
/// the last pair into the removed pair's position.
///
/// Both arrays are allocated from `A`. Growth frees the bucket table before
/// extending the dense store, so an allocator whose [`Allocator::grow`] can
/// extend its most recent block in place (a bump or stack arena) grows the
/// store without copying it.
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per bucket at a maximum load of 13/16, plus the size
///   of `(K, V)` per reserved entry.
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder, A: Allocator + Clone = Global> {
    table: HashTable<(K, V), A>,
    hash_builder: S,
}

impl<K, V, S, A> Debug for HashMap<K, V, S, A>
where
    K: Debug,
    V: Debug,
    A: Allocator + Clone,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S, A> PartialEq for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|other_v| v == other_v))
    }
}

impl<K, V, S, A> Eq for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates a new hash map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_dense::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash map with at least the specified capacity and the
    /// given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_dense::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }
}

impl<K, V, S, A: Allocator + Clone> HashMap<K, V, S, A> {
    /// Creates a new hash map with the given hasher builder, allocating from
    /// `alloc`.
    pub fn with_hasher_in(hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::new_in(alloc),
            hash_builder,
        }
    }

    /// Creates a new hash map with at least the specified capacity, the given
    /// hasher builder, and allocating from `alloc`.
    pub fn with_capacity_and_hasher_in(capacity: usize, hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::with_capacity_in(capacity, alloc),
            hash_builder,
        }
    }

    /// Returns a reference to the map's allocator.
    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of buckets backing the map.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Removes all elements from the map.
    ///
    /// This operation preserves the map's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert!(map.capacity() > 0);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns the pair stored at `index` in the dense store.
    ///
    /// Indices run from `0` to `len()`, in iteration order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.table.get_index(index).map(|(k, v)| (k, v))
    }

    /// Returns the pair stored at `index` in the dense store, with a mutable
    /// value.
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.table.get_index_mut(index).map(|(k, v)| (&*k, v))
    }

    /// Returns an iterator over the key-value pairs of the map, in dense-store
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let pairs: Vec<_> = map.iter().collect();
    /// assert_eq!(pairs, [(&"a", &1), (&"b", &2)]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the pairs of the map with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes all pairs from the map and returns them as an iterator.
    ///
    /// The map keeps its allocated capacity.
    pub fn drain(&mut self) -> Drain<'_, K, V, A> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Computes a histogram of probe distances for the current table state.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram()
    }

    /// Returns detailed performance and utilization statistics for debugging.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Pretty-prints the probe-distance histogram using stdout.
    #[cfg(all(feature = "stats", feature = "std"))]
    pub fn print_probe_histogram(&self) {
        self.table.print_probe_histogram();
    }
}

impl<K, V, S, A> HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.reserve(100);
    /// assert!(map.capacity() >= 100);
    /// # }
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.table
            .reserve(additional, make_hasher::<K, V, S>(&self.hash_builder));
    }

    /// Returns the position of `key` in the dense store, usable with
    /// [`get_index`] and [`swap_remove_index`] until the map is next mutated.
    ///
    /// [`get_index`]: HashMap::get_index
    /// [`swap_remove_index`]: HashMap::swap_remove_index
    pub fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_index(hash, |(k, _)| key.equivalent(k))
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, or any type
    /// implementing [`Equivalent`] for it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert("bread".to_string(), "butter");
    ///
    /// assert_eq!(map.get("bread"), Some(&"butter"));
    /// assert_eq!(map.get("broad"), None);
    /// # }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| key.equivalent(k))
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| key.equivalent(k))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.find_index(key).is_some()
    }

    /// Inserts a key-value pair unless the key is already present.
    ///
    /// An existing value is left untouched and reported as
    /// [`InsertStatus::Found`]; the passed key and value are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    /// use robin_dense::InsertStatus;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a").status, InsertStatus::Added);
    ///
    /// let result = map.insert(37, "b");
    /// assert_eq!(result.status, InsertStatus::Found);
    /// assert_eq!(*result.value, "a");
    /// # }
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> InsertResult<'_, K, V> {
        self.insert_owned(key, ReplaceExisting::No, || value)
    }

    /// Inserts a key-value pair, overwriting the value of an existing key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    /// use robin_dense::InsertStatus;
    ///
    /// let mut map = HashMap::new();
    /// map.insert("brioche", "jam");
    ///
    /// let result = map.insert_or_assign("brioche", "peanut butter");
    /// assert_eq!(result.status, InsertStatus::Replaced);
    /// assert_eq!(map["brioche"], "peanut butter");
    /// # }
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> InsertResult<'_, K, V> {
        self.insert_owned(key, ReplaceExisting::Yes, || value)
    }

    /// Inserts `key` with a value built by `make_value`, unless the key is
    /// already present. `make_value` only runs when the pair is added.
    pub fn emplace(&mut self, key: K, make_value: impl FnOnce() -> V) -> InsertResult<'_, K, V> {
        self.insert_owned(key, ReplaceExisting::No, make_value)
    }

    /// Inserts a pair looked up by a borrowed key, cloning the key into the
    /// map only if it was absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    /// use robin_dense::InsertStatus;
    ///
    /// let mut map: HashMap<String, u32> = HashMap::new();
    /// assert_eq!(map.insert_ref("bun", 1).status, InsertStatus::Added);
    /// assert_eq!(map.insert_ref("bun", 2).status, InsertStatus::Found);
    /// assert_eq!(map["bun"], 1);
    /// # }
    /// ```
    pub fn insert_ref<Q>(&mut self, key: &Q, value: V) -> InsertResult<'_, K, V>
    where
        Q: ?Sized + Hash + Equivalent<K> + ToOwned<Owned = K>,
    {
        self.insert_borrowed(key, ReplaceExisting::No, value)
    }

    /// Like [`insert_or_assign`](HashMap::insert_or_assign), with a borrowed
    /// key cloned into the map only if it was absent.
    pub fn insert_or_assign_ref<Q>(&mut self, key: &Q, value: V) -> InsertResult<'_, K, V>
    where
        Q: ?Sized + Hash + Equivalent<K> + ToOwned<Owned = K>,
    {
        self.insert_borrowed(key, ReplaceExisting::Yes, value)
    }

    fn insert_owned(
        &mut self,
        key: K,
        replace: ReplaceExisting,
        make_value: impl FnOnce() -> V,
    ) -> InsertResult<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        let entry = self.table.entry(
            hash,
            |(k, _)| *k == key,
            make_hasher::<K, V, S>(&self.hash_builder),
        );
        emplace_internal(entry, replace, || key, make_value)
    }

    fn insert_borrowed<Q>(
        &mut self,
        key: &Q,
        replace: ReplaceExisting,
        value: V,
    ) -> InsertResult<'_, K, V>
    where
        Q: ?Sized + Hash + Equivalent<K> + ToOwned<Owned = K>,
    {
        let hash = self.hash_builder.hash_one(key);
        let entry = self.table.entry(
            hash,
            |(k, _)| key.equivalent(k),
            make_hasher::<K, V, S>(&self.hash_builder),
        );
        emplace_internal(entry, replace, || key.to_owned(), || value)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// The last pair of the dense store takes the removed pair's position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// # }
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(
            hash,
            |(k, _)| key.equivalent(k),
            make_hasher::<K, V, S>(&self.hash_builder),
        )
    }

    /// Removes the pair at `index` in the dense store, moving the last pair
    /// into its position.
    ///
    /// Returns `None` if `index` is out of bounds.
    pub fn swap_remove_index(&mut self, index: usize) -> Option<(K, V)> {
        self.table
            .swap_remove_index(index, make_hasher::<K, V, S>(&self.hash_builder))
    }

    /// Retains only the pairs for which the predicate returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut map: HashMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table
            .retain(|(k, v)| f(k, v), make_hasher::<K, V, S>(&self.hash_builder));
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashMap;
    ///
    /// let mut letters = HashMap::new();
    /// for ch in "a short treatise on fungi".chars() {
    ///     *letters.entry(ch).or_insert(0) += 1;
    /// }
    /// assert_eq!(letters[&'s'], 2);
    /// assert_eq!(letters[&'t'], 3);
    /// # }
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S, A> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(
            hash,
            |(k, _)| *k == key,
            make_hasher::<K, V, S>(&self.hash_builder),
        ) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry {
                entry,
                hash_builder: &self.hash_builder,
            }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder> {
    /// Creates a new hash map using the default hasher builder.
    ///
    /// Nothing is allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_dense::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a new hash map with the specified capacity using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V, A: Allocator + Clone> HashMap<K, V, DefaultHashBuilder, A> {
    /// Creates a new hash map using the default hasher builder, allocating
    /// from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::with_hasher_in(DefaultHashBuilder::default(), alloc)
    }

    /// Creates a new hash map with the specified capacity using the default
    /// hasher builder, allocating from `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::with_capacity_and_hasher_in(capacity, DefaultHashBuilder::default(), alloc)
    }
}

impl<K, V, S, A> Default for HashMap<K, V, S, A>
where
    S: Default,
    A: Allocator + Clone + Default,
{
    fn default() -> Self {
        Self::with_hasher_in(S::default(), A::default())
    }
}

impl<K, Q, V, S, A> Index<&Q> for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    Q: ?Sized + Hash + Equivalent<K>,
    S: BuildHasher,
    A: Allocator + Clone,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<K, V, S, A> FromIterator<(K, V)> for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    A: Allocator + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

/// Later pairs overwrite the values of earlier pairs with the same key.
impl<K, V, S, A> Extend<(K, V)> for HashMap<K, V, S, A>
where
    K: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);
        for (k, v) in iter {
            self.insert_or_assign(k, v);
        }
    }
}

impl<'a, K, V, S, A> Extend<(&'a K, &'a V)> for HashMap<K, V, S, A>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
    A: Allocator + Clone,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S, A: Allocator + Clone> IntoIterator for HashMap<K, V, S, A> {
    type IntoIter = IntoIter<K, V, A>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, A: Allocator + Clone> IntoIterator for &'a HashMap<K, V, S, A> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, A: Allocator + Clone> IntoIterator for &'a mut HashMap<K, V, S, A> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, S = DefaultHashBuilder, A: Allocator + Clone = Global> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, A>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, S, A>),
}

impl<'a, K, V, S, A: Allocator + Clone> Entry<'a, K, V, S, A> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, S, A> Entry<'a, K, V, S, A>
where
    V: Default,
    A: Allocator + Clone,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, A: Allocator + Clone = Global> {
    entry: crate::hash_table::VacantEntry<'a, (K, V), A>,
    key: K,
}

impl<'a, K, V, A: Allocator + Clone> VacantEntry<'a, K, V, A> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, S = DefaultHashBuilder, A: Allocator + Clone = Global> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V), A>,
    hash_builder: &'a S,
}

impl<'a, K, V, S, A: Allocator + Clone> OccupiedEntry<'a, K, V, S, A> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Position of the pair in the dense store.
    pub fn index(&self) -> usize {
        self.entry.index()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }
}

impl<K, V, S, A> OccupiedEntry<'_, K, V, S, A>
where
    K: Hash,
    S: BuildHasher,
    A: Allocator + Clone,
{
    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove(make_hasher::<K, V, S>(self.hash_builder))
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the key-value pairs of a `HashMap`, with mutable values.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// An iterator over mutable references to the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V, A: Allocator = Global> {
    inner: crate::hash_table::Drain<'a, (K, V), A>,
}

impl<K, V, A: Allocator> Iterator for Drain<'_, K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, A: Allocator> ExactSizeIterator for Drain<'_, K, V, A> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V, A: Allocator = Global> {
    inner: crate::hash_table::IntoIter<(K, V), A>,
}

impl<K, V, A: Allocator> Iterator for IntoIter<K, V, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, A: Allocator> ExactSizeIterator for IntoIter<K, V, A> {}

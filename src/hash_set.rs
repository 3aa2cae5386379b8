use alloc::borrow::ToOwned;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use allocator_api2::alloc::Allocator;
use allocator_api2::alloc::Global;

use crate::DefaultHashBuilder;
use crate::Equivalent;
use crate::InsertStatus;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

fn make_hasher<T, S>(hash_builder: &S) -> impl Fn(&T) -> u64 + '_
where
    T: Hash,
    S: BuildHasher,
{
    move |value: &T| hash_builder.hash_one(value)
}

/// Result of [`HashSet::emplace`] and friends: the stored value and what
/// happened to it.
#[derive(Debug)]
pub struct SetInsertResult<'a, T> {
    /// The value as stored in the set, after the insertion.
    pub key: &'a T,
    /// Whether the value was added, found, or replaced.
    pub status: InsertStatus,
}

/// A hash set implemented using the dense Robin Hood `HashTable` as the
/// underlying storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values. Values are kept
/// contiguously, in insertion order until the first removal.
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per bucket at a maximum load of 13/16, plus the size
///   of `T` per reserved entry.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder, A: Allocator + Clone = Global> {
    table: HashTable<T, A>,
    hash_builder: S,
}

impl<T, S, A> PartialEq for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S, A> Eq for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
}

impl<T, S, A> Debug for HashSet<T, S, A>
where
    T: Debug,
    A: Allocator + Clone,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S> {
    /// Creates a new hash set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_dense::HashSet;
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
    /// let set: HashSet<i32, _> = HashSet::with_hasher(SimpleHasher);
    /// assert!(set.is_empty());
    /// ```
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash set with at least the specified capacity and the
    /// given hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }
}

impl<T, S, A: Allocator + Clone> HashSet<T, S, A> {
    /// Creates a new hash set with the given hasher builder, allocating from
    /// `alloc`.
    pub fn with_hasher_in(hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::new_in(alloc),
            hash_builder,
        }
    }

    /// Creates a new hash set with at least the specified capacity, the given
    /// hasher builder, and allocating from `alloc`.
    pub fn with_capacity_and_hasher_in(capacity: usize, hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::with_capacity_in(capacity, alloc),
            hash_builder,
        }
    }

    /// Returns a reference to the set's allocator.
    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the set can hold before it grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// # }
    /// ```
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of buckets backing the set.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Removes all elements from the set, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns the value stored at `index` in the dense store.
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.table.get_index(index)
    }

    /// Returns an iterator over the values in the set, in dense-store order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let values: Vec<_> = set.iter().copied().collect();
    /// assert_eq!(values, [1, 2]);
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes all values from the set and returns them as an iterator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let drained: Vec<_> = set.drain().collect();
    /// assert_eq!(drained.len(), 2);
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T, A> {
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

impl<T, S, A> HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows.
    pub fn reserve(&mut self, additional: usize) {
        self.table
            .reserve(additional, make_hasher::<T, S>(&self.hash_builder));
    }

    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was added, `false` if an equal value was
    /// already present (the set is left unchanged).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert!(set.insert("bread"));
    /// assert!(!set.insert("bread"));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.emplace(value).status == InsertStatus::Added
    }

    /// Adds a value unless an equal one is present. Returns the stored value
    /// and whether it was [`Added`](InsertStatus::Added) or
    /// [`Found`](InsertStatus::Found); a found value is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    /// use robin_dense::InsertStatus;
    ///
    /// let mut set = HashSet::new();
    /// assert_eq!(set.emplace(7).status, InsertStatus::Added);
    ///
    /// let result = set.emplace(7);
    /// assert_eq!(result.status, InsertStatus::Found);
    /// assert_eq!(*result.key, 7);
    /// # }
    /// ```
    pub fn emplace(&mut self, value: T) -> SetInsertResult<'_, T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(
            hash,
            |v| *v == value,
            make_hasher::<T, S>(&self.hash_builder),
        ) {
            TableEntry::Occupied(entry) => SetInsertResult {
                key: entry.into_mut(),
                status: InsertStatus::Found,
            },
            TableEntry::Vacant(entry) => SetInsertResult {
                key: entry.insert(value),
                status: InsertStatus::Added,
            },
        }
    }

    /// Like [`emplace`](HashSet::emplace), with a borrowed value cloned into
    /// the set only if it was absent.
    pub fn emplace_ref<Q>(&mut self, value: &Q) -> SetInsertResult<'_, T>
    where
        Q: ?Sized + Hash + Equivalent<T> + ToOwned<Owned = T>,
    {
        self.emplace_with(value, Q::to_owned)
    }

    /// Adds a value, overwriting an equal value already present. The status
    /// is [`Added`](InsertStatus::Added) or
    /// [`Replaced`](InsertStatus::Replaced).
    pub fn insert_or_assign(&mut self, value: T) -> SetInsertResult<'_, T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(
            hash,
            |v| *v == value,
            make_hasher::<T, S>(&self.hash_builder),
        ) {
            TableEntry::Occupied(entry) => {
                let slot = entry.into_mut();
                *slot = value;
                SetInsertResult {
                    key: slot,
                    status: InsertStatus::Replaced,
                }
            }
            TableEntry::Vacant(entry) => SetInsertResult {
                key: entry.insert(value),
                status: InsertStatus::Added,
            },
        }
    }

    /// Adds a value to the set unless an equal one is present, and returns a
    /// reference to the stored value.
    pub fn get_or_insert(&mut self, value: T) -> &T {
        self.emplace(value).key
    }

    /// Looks up a value by a borrowed form, cloning it into the set only if
    /// it is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set: HashSet<String> = HashSet::new();
    /// assert_eq!(set.get_or_insert_owned("baguette"), "baguette");
    /// assert_eq!(set.len(), 1);
    /// set.get_or_insert_owned("baguette");
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn get_or_insert_owned<Q>(&mut self, value: &Q) -> &T
    where
        Q: ?Sized + Hash + Equivalent<T> + ToOwned<Owned = T>,
    {
        self.emplace_ref(value).key
    }

    /// Looks up a value by a borrowed form, inserting the result of `f` if it
    /// is absent. `f` must produce a value equal to `value`.
    pub fn get_or_insert_with<Q>(&mut self, value: &Q, f: impl FnOnce(&Q) -> T) -> &T
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.emplace_with(value, f).key
    }

    fn emplace_with<Q>(&mut self, value: &Q, f: impl FnOnce(&Q) -> T) -> SetInsertResult<'_, T>
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        let hash = self.hash_builder.hash_one(value);
        match self.table.entry(
            hash,
            |v| value.equivalent(v),
            make_hasher::<T, S>(&self.hash_builder),
        ) {
            TableEntry::Occupied(entry) => SetInsertResult {
                key: entry.into_mut(),
                status: InsertStatus::Found,
            },
            TableEntry::Vacant(entry) => {
                let new_value = f(value);
                debug_assert!(
                    value.equivalent(&new_value),
                    "new value is not equivalent to the lookup value"
                );
                SetInsertResult {
                    key: entry.insert(new_value),
                    status: InsertStatus::Added,
                }
            }
        }
    }

    /// Adds a value to the set, replacing and returning an equal value that
    /// was already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set = HashSet::new();
    /// assert_eq!(set.replace(1), None);
    /// assert_eq!(set.replace(1), Some(1));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(
            hash,
            |v| *v == value,
            make_hasher::<T, S>(&self.hash_builder),
        ) {
            TableEntry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Returns `true` if the set contains a value equivalent to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set: HashSet<String> = HashSet::new();
    /// set.insert("bagel".to_string());
    /// assert!(set.contains("bagel"));
    /// assert!(!set.contains("broad"));
    /// # }
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.find_index(value).is_some()
    }

    /// Returns a reference to the stored value equivalent to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| value.equivalent(v))
    }

    /// Returns the position of `value` in the dense store, valid until the
    /// set is next mutated.
    pub fn find_index<Q>(&self, value: &Q) -> Option<usize>
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find_index(hash, |v| value.equivalent(v))
    }

    /// Removes a value from the set. Returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equivalent to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(
            hash,
            |v| value.equivalent(v),
            make_hasher::<T, S>(&self.hash_builder),
        )
    }

    /// Removes the value at `index` in the dense store, moving the last value
    /// into its position.
    pub fn swap_remove_index(&mut self, index: usize) -> Option<T> {
        self.table
            .swap_remove_index(index, make_hasher::<T, S>(&self.hash_builder))
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let mut set: HashSet<i32> = (0..10).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 5);
    /// # }
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table
            .retain(|v| f(v), make_hasher::<T, S>(&self.hash_builder));
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    pub fn is_disjoint(&self, other: &HashSet<T, S, A>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if every element of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<T, S, A>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every element of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<T, S, A>) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over the union of `self` and `other`: all of
    /// `self`, then the elements of `other` missing from `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let union: Vec<_> = a.union(&b).copied().collect();
    /// assert_eq!(union, [1, 2, 3]);
    /// # }
    /// ```
    pub fn union<'a>(&'a self, other: &'a HashSet<T, S, A>) -> Union<'a, T, S, A> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Returns an iterator over the elements in both `self` and `other`.
    pub fn intersection<'a>(
        &'a self,
        other: &'a HashSet<T, S, A>,
    ) -> Intersection<'a, T, S, A> {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: smaller.iter(),
            other: larger,
        }
    }

    /// Returns an iterator over the elements in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<T, S, A>) -> Difference<'a, T, S, A> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the elements in exactly one of `self` and
    /// `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use robin_dense::HashSet;
    ///
    /// let a: HashSet<i32> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32> = [2, 3].into_iter().collect();
    ///
    /// let mut sym: Vec<_> = a.symmetric_difference(&b).copied().collect();
    /// sym.sort();
    /// assert_eq!(sym, [1, 3]);
    /// # }
    /// ```
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<T, S, A>,
    ) -> SymmetricDifference<'a, T, S, A> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<T> HashSet<T, DefaultHashBuilder> {
    /// Creates a new hash set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_dense::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a new hash set with the specified capacity using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<T, A: Allocator + Clone> HashSet<T, DefaultHashBuilder, A> {
    /// Creates a new hash set using the default hasher builder, allocating
    /// from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::with_hasher_in(DefaultHashBuilder::default(), alloc)
    }

    /// Creates a new hash set with the specified capacity using the default
    /// hasher builder, allocating from `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::with_capacity_and_hasher_in(capacity, DefaultHashBuilder::default(), alloc)
    }
}

impl<T, S, A> Default for HashSet<T, S, A>
where
    S: Default,
    A: Allocator + Clone + Default,
{
    fn default() -> Self {
        Self::with_hasher_in(S::default(), A::default())
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T, A: Allocator = Global> {
    inner: crate::hash_table::Drain<'a, T, A>,
}

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T, A: Allocator = Global> {
    inner: crate::hash_table::IntoIter<T, A>,
}

impl<T, A: Allocator> Iterator for Drain<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S, A: Allocator + Clone> IntoIterator for HashSet<T, S, A> {
    type IntoIter = IntoIter<T, A>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S, A: Allocator + Clone> IntoIterator for &'a HashSet<T, S, A> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S, A> FromIterator<T> for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
    A: Allocator + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = HashSet::default();
        set.extend(iter);
        set
    }
}

impl<T, S, A> Extend<T> for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, A> Extend<&'a T> for HashSet<T, S, A>
where
    T: Hash + Eq + Copy,
    S: BuildHasher,
    A: Allocator + Clone,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S, A: Allocator + Clone = Global> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    set: &'a HashSet<T, S, A>,
}

impl<'a, T, S, A> Iterator for Union<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.set.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S, A: Allocator + Clone = Global> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, A>,
}

impl<'a, T, S, A> Iterator for Intersection<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S, A: Allocator + Clone = Global> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, A>,
}

impl<'a, T, S, A> Iterator for Difference<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S, A: Allocator + Clone = Global> {
    iter: core::iter::Chain<Difference<'a, T, S, A>, Difference<'a, T, S, A>>,
}

impl<'a, T, S, A> Iterator for SymmetricDifference<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator + Clone,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type TestSet<T> = HashSet<T, SipHashBuilder>;

    fn assert_set_invariants<T: Hash + Eq, S: BuildHasher>(set: &HashSet<T, S>) {
        set.table
            .assert_invariants(make_hasher::<T, S>(&set.hash_builder));
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: TestSet<i32> = HashSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);

        let set2 = HashSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
        assert_eq!(set2.len(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let set = HashSet::<i32, _>::with_capacity_and_hasher(200, SipHashBuilder::default());
        assert!(set.capacity() >= 200);
        assert!(set.bucket_count().is_power_of_two());
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(set.contains(&1));

        assert!(!set.insert(1));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&1));

        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_remove() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        assert!(set.remove(&2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(!set.contains(&2));
        assert!(set.contains(&3));

        assert!(!set.remove(&2));
        assert!(!set.remove(&4));
        assert_eq!(set.len(), 2);
        assert_set_invariants(&set);
    }

    #[test]
    fn test_take_and_get() {
        let mut set: TestSet<String> = HashSet::default();
        set.insert("one".to_string());
        set.insert("two".to_string());

        assert_eq!(set.get("one").map(String::as_str), Some("one"));
        assert_eq!(set.take("one"), Some("one".to_string()));
        assert_eq!(set.take("one"), None);
        assert_eq!(set.get("one"), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_bakery() {
        let mut set: TestSet<String> = HashSet::default();

        assert!(set.insert("bread".to_string()));
        assert!(!set.insert("bread".to_string()));
        set.get_or_insert_owned("baguette");
        let bagel = "bagel".to_string();
        assert!(set.insert(bagel.clone()));
        assert_eq!(set.get_or_insert("bun".to_string()), "bun");
        assert!(set.insert("pretzel".to_string()));
        let brioche = "brioche".to_string();
        set.get_or_insert_with(brioche.as_str(), |s| s.to_string());

        assert!(set.contains("bread"));
        assert!(set.contains("baguette"));
        assert!(set.contains(&bagel));
        assert!(set.contains("bun"));
        assert!(set.contains("pretzel"));
        assert!(set.contains("brioche"));

        assert!(set.insert("ciabatta".to_string()));
        assert!(set.insert("pain".to_string()));
        assert!(set.find_index("broad").is_none());

        assert!(set.remove("ciabatta"));
        assert!(set.find_index("ciabatta").is_none());
        assert!(set.contains("pain"));
        assert!(!set.remove("broad"));

        for value in ["pretzel", "bun", "brioche", "baguette"] {
            assert!(set.remove(value), "{value} missing from {set:?}");
        }
        assert_eq!(set.len(), 3);
        assert_set_invariants(&set);
    }

    #[test]
    fn test_get_or_insert_keeps_existing() {
        let mut set: TestSet<String> = HashSet::default();
        set.insert("bun".to_string());

        let mut calls = 0;
        set.get_or_insert_with("bun", |s| {
            calls += 1;
            s.to_string()
        });
        assert_eq!(calls, 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_replace() {
        #[derive(Debug)]
        struct Tagged {
            id: u32,
            tag: &'static str,
        }

        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for Tagged {}

        impl Hash for Tagged {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut set: TestSet<Tagged> = HashSet::default();
        assert!(set.replace(Tagged { id: 1, tag: "old" }).is_none());
        let previous = set.replace(Tagged { id: 1, tag: "new" });
        assert_eq!(previous.map(|t| t.tag), Some("old"));
        assert_eq!(set.get_index(0).map(|t| t.tag), Some("new"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_emplace_reports_status() {
        let mut set: TestSet<u32> = HashSet::default();

        let added = set.emplace(42);
        assert_eq!(added.status, InsertStatus::Added);
        assert_eq!(*added.key, 42);

        let found = set.emplace(42);
        assert_eq!(found.status, InsertStatus::Found);
        assert_eq!(*found.key, 42);
        assert_eq!(set.len(), 1);

        for i in 0..200 {
            let status = set.emplace(i).status;
            let expected = if i == 42 {
                InsertStatus::Found
            } else {
                InsertStatus::Added
            };
            assert_eq!(status, expected, "value {i}");
        }
        assert_eq!(set.len(), 200);
        assert_set_invariants(&set);
    }

    #[test]
    fn test_emplace_ref_clones_only_when_added() {
        let mut set: TestSet<String> = HashSet::default();

        let added = set.emplace_ref("croissant");
        assert_eq!(added.status, InsertStatus::Added);
        assert_eq!(added.key, "croissant");

        let found = set.emplace_ref("croissant");
        assert_eq!(found.status, InsertStatus::Found);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insert_or_assign_overwrites() {
        struct Labeled {
            id: u32,
            label: &'static str,
        }

        impl PartialEq for Labeled {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for Labeled {}

        impl Hash for Labeled {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut set: TestSet<Labeled> = HashSet::default();
        let first = set.insert_or_assign(Labeled { id: 1, label: "rye" });
        assert_eq!(first.status, InsertStatus::Added);

        let found = set.emplace(Labeled { id: 1, label: "spelt" });
        assert_eq!(found.status, InsertStatus::Found);
        assert_eq!(found.key.label, "rye");

        let second = set.insert_or_assign(Labeled { id: 1, label: "spelt" });
        assert_eq!(second.status, InsertStatus::Replaced);
        assert_eq!(second.key.label, "spelt");
        assert_eq!(set.len(), 1);
        assert_set_invariants(&set);
    }

    #[test]
    fn test_custom_allocator() {
        let mut set: HashSet<u64, SipHashBuilder, Global> =
            HashSet::with_capacity_and_hasher_in(10, SipHashBuilder::default(), Global);
        assert_eq!(set.bucket_count(), 16);
        for i in 0..100 {
            assert!(set.insert(i));
        }
        assert_set_invariants(&set);

        let drained: Vec<u64> = set.drain().collect();
        assert_eq!(drained.len(), 100);
        assert!(set.is_empty());
    }

    #[test]
    fn test_reserve() {
        let mut set: TestSet<i32> = HashSet::default();
        set.insert(42);

        for i in 0..100 {
            set.reserve(i);
            assert!(set.capacity() >= i);
            assert!(set.contains(&42));
        }
        assert_set_invariants(&set);
    }

    #[test]
    fn test_clear() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        let capacity = set.capacity();

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(&1));
        assert_eq!(set.capacity(), capacity);
    }

    #[test]
    fn test_iter_and_into_iter() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(1);
        set.insert(2);
        set.insert(3);

        let values: Vec<_> = set.iter().copied().collect();
        assert_eq!(values, [1, 2, 3]);
        assert_eq!(set.iter().len(), 3);

        let mut owned: Vec<_> = set.into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![1, 2, 3]);
    }

    #[test]
    fn test_drain() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }

        let mut drained: Vec<_> = set.drain().collect();
        drained.sort();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(set.is_empty());

        set.insert(5);
        assert!(set.contains(&5));
        assert_set_invariants(&set);
    }

    #[test]
    fn test_swap_remove_index() {
        let mut set: TestSet<i32> = HashSet::default();
        for i in 0..5 {
            set.insert(i * 10);
        }

        assert_eq!(set.swap_remove_index(0), Some(0));
        assert_eq!(set.get_index(0), Some(&40));
        assert_eq!(set.find_index(&40), Some(0));
        assert_eq!(set.swap_remove_index(4), None);
        assert_set_invariants(&set);
    }

    #[test]
    fn test_retain() {
        let mut set: TestSet<i32> = (0..100).collect();
        set.retain(|v| v % 3 == 0);
        assert_eq!(set.len(), 34);
        for i in 0..100 {
            assert_eq!(set.contains(&i), i % 3 == 0);
        }
        assert_set_invariants(&set);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_large_set() {
        const SIZE: usize = 100000;

        let mut rng = SmallRng::seed_from_u64(42);
        let values: Vec<u32> = (0..SIZE).map(|_| rng.random()).collect();

        let mut set: TestSet<u32> = HashSet::default();
        for value in &values {
            set.insert(*value);
            assert!(set.len() <= set.bucket_count() / 16 * 13);
        }
        assert_set_invariants(&set);

        for value in &values {
            assert_eq!(set.get(value), Some(value));
        }

        // Duplicate draws are removed on their first occurrence.
        for value in &values {
            set.remove(value);
            assert!(!set.contains(value));
        }
        assert!(set.is_empty());
        assert_set_invariants(&set);
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set: TestSet<u64> = HashSet::default();
        for round in 0..10u64 {
            for i in 0..200 {
                assert!(set.insert(round * 1000 + i));
            }
            for i in 0..200 {
                assert!(set.remove(&(round * 1000 + i)));
            }
            assert!(set.is_empty());
        }
        assert_set_invariants(&set);
    }

    #[test]
    fn test_is_disjoint() {
        let a: TestSet<i32> = [1, 2, 3].into_iter().collect();
        let b: TestSet<i32> = [4, 5].into_iter().collect();
        let mut c = HashSet::with_hasher(a.hasher().clone());
        c.insert(3);

        assert!(a.is_disjoint(&b));
        assert!(!a.is_disjoint(&c));
    }

    #[test]
    fn test_is_subset_and_superset() {
        let a: TestSet<i32> = [1, 2].into_iter().collect();
        let mut b = HashSet::with_hasher(a.hasher().clone());
        b.extend([1, 2, 3]);

        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(b.is_superset(&a));
        assert!(!a.is_superset(&b));
    }

    #[test]
    fn test_union() {
        let a: TestSet<i32> = [1, 2].into_iter().collect();
        let b: TestSet<i32> = [2, 3].into_iter().collect();

        let mut union: Vec<_> = a.union(&b).copied().collect();
        union.sort();
        assert_eq!(union, [1, 2, 3]);
    }

    #[test]
    fn test_intersection_and_difference() {
        let a: TestSet<i32> = [1, 2, 3, 4].into_iter().collect();
        let b: TestSet<i32> = [3, 4, 5].into_iter().collect();

        let mut intersection: Vec<_> = a.intersection(&b).copied().collect();
        intersection.sort();
        assert_eq!(intersection, [3, 4]);

        let mut difference: Vec<_> = a.difference(&b).copied().collect();
        difference.sort();
        assert_eq!(difference, [1, 2]);

        let mut symmetric: Vec<_> = a.symmetric_difference(&b).copied().collect();
        symmetric.sort();
        assert_eq!(symmetric, [1, 2, 5]);
    }

    #[test]
    fn test_partial_eq_and_debug() {
        let a: TestSet<i32> = [1, 2, 3].into_iter().collect();
        let b: TestSet<i32> = [3, 2, 1].into_iter().collect();
        assert_eq!(a, b);

        let single: TestSet<i32> = [7].into_iter().collect();
        assert_eq!(alloc::format!("{single:?}"), "{7}");
    }

    #[test]
    fn test_extend_by_ref() {
        let mut set: TestSet<i32> = HashSet::default();
        let values = [1, 2, 2, 3];
        set.extend(values.iter());
        assert_eq!(set.len(), 3);
    }
}

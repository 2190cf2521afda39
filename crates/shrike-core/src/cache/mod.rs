//! Property test caching.
//!
//! Delta debugging revisits candidates often (ddmin re-tests complements
//! that coincide with earlier subsets, hierarchical levels overlap). A
//! [`CachingTester`] short-circuits repeated candidates through a
//! [`TrieCache`] keyed by the retained set, independent of item order.

pub mod tester;
pub mod trie;

pub use tester::CachingTester;
pub use trie::TrieCache;

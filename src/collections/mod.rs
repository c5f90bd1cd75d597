// ============================================================================
// spark-links - Link Collections
// Named groups of links with batch read/write
// ============================================================================

mod link_set;

pub use link_set::LinkSet;

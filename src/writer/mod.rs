//! PDF writing for incremental updates.
//!
//! ## Architecture
//!
//! ```text
//! replacement objects
//!     ↓
//! [IncrementalUpdate] (appends bodies, xref section, trailer)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! original bytes + update
//! ```

pub mod incremental;
pub mod object_serializer;

pub use incremental::IncrementalUpdate;
pub use object_serializer::ObjectSerializer;

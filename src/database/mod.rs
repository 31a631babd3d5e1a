//! Destination and auxiliary database support
//!
//! The engine writes batches through a [`DestinationSink`] and reads the rows
//! that drive row-source iteration through a [`RowSource`]. [`DuckDbSink`]
//! implements both on a DuckDB database; [`NullSink`] accepts everything and
//! stores nothing, for dry runs.

mod duck;
mod null;
mod types;

pub use duck::DuckDbSink;
pub use null::NullSink;
pub use types::{DestinationSink, RowCursor, RowSource, VecCursor};

//! Relational store and vector index adapters.

pub mod job_board_store;
pub mod schema;
pub mod sqlite_vec_loader;
pub mod vector_index;

pub use job_board_store::{
    JobBoardStore, OverlapHit, OverlapQuery, RecordQuery, SqliteJobBoardStore, StoreFuture,
};
pub use schema::init_schema;
pub use sqlite_vec_loader::init_sqlite_vec_extension;
pub use vector_index::{Collection, SqliteVecIndex, VectorFilter, VectorHit, VectorIndex};

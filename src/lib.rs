pub mod access;
pub mod catalog;
pub mod executor;
pub mod sql;
pub mod storage;

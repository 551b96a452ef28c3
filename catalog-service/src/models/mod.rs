pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod requests;
pub mod responses;
pub mod storage;

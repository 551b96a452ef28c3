//! Catalog search: criteria in, one ordered page of books out.

pub mod criteria;
pub mod engine;
pub mod pagination;
pub mod predicate;
pub mod validator;

pub use criteria::SearchCriteria;
pub use engine::{SearchEngine, SearchError};
pub use pagination::{PageWindow, ResultPage, PER_PAGE};
pub use predicate::{Criterion, Predicate};

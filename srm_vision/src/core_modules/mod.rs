pub mod edge;
pub mod edge_sorter;
pub mod error;
pub mod merge_driver;
pub mod merge_predicate;
pub mod plane;
pub mod reconstructor;
pub mod region_store;
pub mod utils;

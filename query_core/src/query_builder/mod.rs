//! List query building
//!
//! Options, pagination, ordering, joins and filters compile into a
//! [`Statement`] which executors render or evaluate.

pub mod builder;
pub mod filter;
pub mod join;
pub mod options;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod statement;


pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use join::{JoinCondition, JoinType};
pub use options::Options;
pub use ordering::{parse_sort, SortField, SortOrder};
pub use pagination::{PageInfo, PaginationPolicy};
pub use sql_generation::SqlGenerator;
pub use statement::Statement;

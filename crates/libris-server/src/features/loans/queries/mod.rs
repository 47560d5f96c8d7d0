pub mod get;
pub mod list;

pub use get::GetLoanQuery;
pub use list::ListLoansQuery;

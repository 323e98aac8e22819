pub mod pagination;
pub mod response;
mod string_enum;

pub use pagination::{
    PaginatedResponse, PaginationInfo, PaginationQuery, deserialize_optional_bool,
    deserialize_optional_i64,
};
pub use response::ApiResponse;
pub(crate) use string_enum::string_enum;

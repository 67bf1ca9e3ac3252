//! Shared database imports for models and routes.

pub mod prelude {
    pub use entity::prelude::*;
    pub use entity::probe_observation;
    pub use sea_orm::{
        ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
        PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    };
}

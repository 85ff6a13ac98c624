// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod collection;
pub mod compare;
pub mod field;
pub mod forms;
pub mod ids;
pub mod model;
pub mod mutation;
pub mod predicate;
pub mod schema;
pub mod selection;
pub mod session;
pub mod state;
pub mod stats;

pub use collection::*;
pub use compare::*;
pub use field::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use mutation::*;
pub use predicate::*;
pub use schema::*;
pub use selection::*;
pub use session::*;
pub use state::*;
pub use stats::*;

use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

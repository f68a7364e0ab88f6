pub mod evaluate;
pub mod interprocedural;
pub mod intraprocedural;

pub use evaluate::evaluate;
pub use interprocedural::{index_may_match, InterConstantPropagation};
pub use intraprocedural::ConstantPropagation;

pub mod component;
pub mod kernels;
pub mod operator;
pub mod unified;

pub use operator::{CombineComponentFn, CombineEntry, CombineUnifiedFn, Operator, lookup};
pub use unified::combine_mask_unified;

pub mod util;

pub use util::{build_plan, split_csv};

mod load;
mod types;

pub use load::{get_taskbridge_data_dir, load, load_default, load_from_path};
pub use types::*;

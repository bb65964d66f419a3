pub mod config;
pub mod fixtures;
pub mod logging;
pub mod params;

pub use config::{CONFIG_FILE, FragmentsConfig};
pub use fixtures::Fixtures;
pub use logging::init_logging;
pub use params::{parse_param, to_params};

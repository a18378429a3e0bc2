mod load;
mod types;

pub use load::{get_fanout_data_dir, load_default};
pub use types::{
    AppConfig, DispatchConfig, LoggingConfig, MountConfig, ScenarioConfig, StorageConfig,
    TransportConfig, TransportKind,
};

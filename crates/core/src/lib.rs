pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod request;
pub mod sink;
pub mod source;
pub mod store;
pub mod testing;
pub mod transform;

pub use config::{
    load_config, load_config_from_str, parse_listen_addr, validate_config, Config, ConfigError,
    ServerConfig, CONFIG_PATH_VAR,
};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineReport, Stage};
pub use request::{RequestError, ResizeRequest};
pub use sink::{ByteSink, FileSink, ObjectStoreSink, StagedUpload};
pub use source::{ByteSource, HttpSource};
pub use store::{MemoryStoreProvider, S3StoreProvider, StorageConfig, StoreError, StoreProvider};
pub use transform::{CommandTransform, Thumbnailer, Transform, TransformConfig};

pub mod local_host;

pub use local_host::{LocalHost, UploadResult};

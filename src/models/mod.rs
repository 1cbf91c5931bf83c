pub mod playlist;
pub mod status;

pub use playlist::{
    Channel, CheckStatusRequest, CheckStatusResponse, GroupedCatalog, ProcessRequest,
    ProcessResponse, UNKNOWN_GROUP,
};
pub use status::{StatusClass, StreamStatus};

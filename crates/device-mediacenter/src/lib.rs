pub mod mediacenter;
pub mod models;

pub use mediacenter::MediaCenterClient;
pub use models::{ActivePlayer, JsonRpcError, JsonRpcRequest, JsonRpcResponse, PlayerState};

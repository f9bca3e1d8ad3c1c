//! 路网图模块

mod edge;
mod network;

pub use edge::{EdgeData, EdgeKey};
pub use network::FlowNetwork;

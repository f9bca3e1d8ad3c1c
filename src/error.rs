//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("无效的容量: {0}")]
    InvalidCapacity(String),

    #[error("无效的路段长度: {0}")]
    InvalidWeight(String),

    #[error("无效的坐标格式: {0}")]
    InvalidCoordinate(String),

    #[error("起点或终点不在路网中: {0}")]
    DisconnectedStartEnd(String),

    #[error("残量图中缺少路径边: {0}")]
    MissingResidualEdge(String),

    #[error("边不存在: {0}")]
    EdgeNotFound(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("输入文件不存在 - {}", .0.display())]
    NotFound(PathBuf),

    #[error("文件格式无效，不是合法的JSON - {}: {source}", .path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("无效的旧版数据格式：{0}")]
    Schema(String),

    #[error("权限不足 - {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("读写失败 - {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON 序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConvertError {
    /// Classifies an I/O failure on `path` by its kind.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ConvertError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied(path.to_path_buf()),
            _ => ConvertError::Io { path: path.to_path_buf(), source: err },
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件 {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("配置文件格式错误 {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

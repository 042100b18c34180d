//! 存储层错误类型
//!
//! 封装底层错误（SQL 执行、连接、配置序列化），并区分映射冲突。

#[derive(Debug)]
pub struct StorageError {
    message: String,
    conflict: bool,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conflict: false,
        }
    }

    /// 唯一键冲突（例如同一映射键写入不同资产 ID）。
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conflict: true,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.conflict
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("serialization: {}", err))
    }
}

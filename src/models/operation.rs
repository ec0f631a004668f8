use serde::Serialize;

/// 异步操作的状态
///
/// 替代分散的 loading / error 布尔标志，序列化为
/// `{"status": "idle" | "loading" | "success" | "error", "data"?, "error"?}`。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationState<T> {
    Idle,
    Loading,
    Success { data: T },
    Error { error: String },
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        OperationState::Idle
    }
}

impl<T> OperationState<T> {
    pub fn is_finished(&self) -> bool {
        matches!(self, OperationState::Success { .. } | OperationState::Error { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            OperationState::Success { data } => Some(data),
            _ => None,
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => OperationState::Success { data },
            Err(e) => OperationState::Error { error: e.to_string() },
        }
    }
}

// ==========================================
// 优惠批量导入 - 提交网关错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 整批失败，不存在部分成功
// ==========================================

use thiserror::Error;

/// 提交方（远端 / 本地存储）返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitterError {
    /// 远端明确拒绝，消息原样保留
    #[error("{0}")]
    Rejected(String),

    /// 网络 / 协议错误
    #[error("transport error: {0}")]
    Transport(String),
}

/// 网关对调用方暴露的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("No valid deals to upload")]
    NothingToSubmit,

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to upload deals")]
    Failed,
}

impl From<SubmitterError> for SubmissionError {
    fn from(err: SubmitterError) -> Self {
        match err {
            SubmitterError::Rejected(msg) => SubmissionError::Rejected(msg),
            SubmitterError::Transport(_) => SubmissionError::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_relayed_verbatim() {
        let err: SubmissionError = SubmitterError::Rejected("Daily limit exceeded".to_string()).into();
        assert_eq!(err.to_string(), "Daily limit exceeded");
    }

    #[test]
    fn test_transport_becomes_generic_failure() {
        let err: SubmissionError =
            SubmitterError::Transport("connection refused".to_string()).into();
        assert_eq!(err, SubmissionError::Failed);
        assert_eq!(err.to_string(), "Failed to upload deals");
    }
}

pub mod data;
pub mod parameter;

pub use data::{Reading, TimestampFormat, WindowMode};
pub use parameter::{Destination, Parameter, SourceLocator, is_safe_identifier};

/// 会话 token：一次运行内获取一次，之后只读地传给每次上报。
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

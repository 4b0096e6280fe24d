//! 远程内容审核：可选的云端检测信号，与本地匹配结果取或
pub mod traits;
pub mod http;

pub use self::traits::{NoopModerator, RemoteModerator, RemoteSignal};
pub use self::http::HttpRemoteModerator;

pub mod cancel;
pub mod error;
pub mod sync_set;
pub mod types;

// 错误和结果类型
pub use error::{SearchError, SearchResult};

// 核心数据类型
pub use cancel::{CancelOnDrop, CancelSignal};
pub use sync_set::SyncNodeSet;
pub use types::{Direction, Hop, Node, TaggedHop, MARKER_TITLES};

pub mod body;
pub mod data;
pub mod path;
pub mod response;

pub use body::{Request, RequestBody};
pub use data::{ContextData, PathParams};
pub use path::{Path, PathResolver, SegmentPathResolver};
pub use response::{BufferedResponse, DynResponseSink, ResponseSink};

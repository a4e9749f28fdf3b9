mod builds;
mod constants;
mod objs;
mod routes;

pub use builds::*;
pub use constants::*;
pub use objs::*;
pub use routes::*;

pub mod mapper;
pub mod repair;
pub mod status;
pub mod sync;

pub use mapper::run_build_mapper;
pub use repair::run_repair;
pub use status::show_status;
pub use sync::run_sync;

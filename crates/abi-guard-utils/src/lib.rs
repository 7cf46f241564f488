pub mod atomic_write;
pub mod logging;
pub mod paths;

pub mod shutdown;

pub use shutdown::graceful_shutdown_signal;

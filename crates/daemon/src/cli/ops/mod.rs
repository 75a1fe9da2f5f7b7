pub mod daemon;
pub mod health;
pub mod init;
pub mod list;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use list::List;
pub use version::Version;

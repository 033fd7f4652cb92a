pub mod flash;
pub mod session;

pub use flash::Toast;
pub use session::AdminUser;

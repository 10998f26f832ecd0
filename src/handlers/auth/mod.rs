// Account registration, login, and current-user lookup
pub mod login;
pub mod register;
pub mod whoami;

pub use login::login;
pub use register::register;
pub use whoami::whoami;

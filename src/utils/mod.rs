pub mod ids;
pub mod jwt;
pub mod money;
pub mod password;
pub mod time;
pub mod validate;

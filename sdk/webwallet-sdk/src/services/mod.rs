pub mod dispatch;
pub mod token;

pub mod account;
pub mod job;
pub mod worker;
pub mod household;
pub mod admin;
pub mod notification;
pub mod payment;
pub mod catalog;
pub mod chat;

pub use account::*;
pub use job::*;
pub use worker::*;
pub use household::*;
pub use admin::*;
pub use notification::*;
pub use payment::*;
pub use catalog::*;
pub use chat::*;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod household;
pub mod job;
pub mod notification;
pub mod pages;
pub mod payment;
pub mod upload;
pub mod worker;

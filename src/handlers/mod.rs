pub mod auth;
pub mod dashboard;
pub mod deposits;
pub mod earnings;
pub mod notify;
pub mod plans;
pub mod users;
pub mod wallets;
pub mod withdrawals;

//! 个人媒体库后端：用户档案，以及由季、集和媒体组成的系列。

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

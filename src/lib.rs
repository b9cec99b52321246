//! hostinfo: reports the serving machine's host name over HTTP and exposes
//! Prometheus metrics for the traffic it handles.

pub mod config;
pub mod hostname;
pub mod server;

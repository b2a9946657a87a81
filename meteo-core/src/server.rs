//! Transport adapters. Both drive the same [`crate::rpc::Dispatcher`]; the
//! transports only differ in how frames arrive and responses leave.

pub mod http;
pub mod stdio;

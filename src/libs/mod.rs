pub mod batch;
pub mod chs;
pub mod compare;
pub mod error;
pub mod gene;
pub mod greedy;
pub mod io;
pub mod loc;
pub mod prep;
pub mod stat;

pub use season::*;
pub use ticket::*;

pub mod season;
pub mod ticket;

pub mod traits;

pub mod reqwest_transport;

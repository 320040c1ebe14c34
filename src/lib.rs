pub mod config;
pub mod error;
pub mod net;
pub mod sim;
pub mod topo;
pub mod traffic;

#[cfg(test)]
mod test;

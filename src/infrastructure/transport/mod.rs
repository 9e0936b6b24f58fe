pub mod reqwest_transport;
#[cfg(test)]
pub mod scripted;

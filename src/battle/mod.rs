pub mod controller;
pub mod effects;
pub mod resolver;

#[cfg(test)]
mod tests;

mod core;

#[cfg(test)]
mod tests;

pub use self::core::{render, render_to_string};

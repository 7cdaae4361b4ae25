mod core;


pub use self::core::{Cursors, Item, RingBuffer};

//! Small helpers that are not tied to the machine itself.

pub mod bit_splitter;

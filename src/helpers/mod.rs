//! Leaf utilities shared by the sheet parser, the reconciler and the leave classifier.

pub mod date;
pub mod string;

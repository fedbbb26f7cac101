pub mod deck;
pub mod dictation;
pub mod input;

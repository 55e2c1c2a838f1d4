pub mod matching;
pub mod session;
pub mod settings;
pub mod words;

pub mod stores;
pub mod translators;

pub mod null;
pub mod tcp;

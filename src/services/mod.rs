pub mod encoding;
pub mod export;
pub mod gap_filler;
pub mod pipeline;
pub mod splitter;
pub mod translator;
pub mod walker;

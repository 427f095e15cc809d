pub mod autocorr;
pub mod filter;
pub mod fusion;
pub mod note;
pub mod onset_window;
pub mod zero_crossing;

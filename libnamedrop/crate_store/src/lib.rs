pub mod pin_board;
pub mod pinned_track;
pub mod store;

#[cfg(test)]
#[path = "./test_util.rs"]
pub(crate) mod test_util;

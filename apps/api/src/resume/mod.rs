// Resume core: normalize raw editor text, merge it with generated content,
// and assemble the ordered document handed to a renderer.
// normalize/merge/assemble are pure; handlers and store do the I/O.

pub mod assemble;
pub mod handlers;
pub mod merge;
pub mod normalize;
pub mod store;

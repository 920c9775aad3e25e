#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use pj_codec as codec;
pub use pj_utils as utils;

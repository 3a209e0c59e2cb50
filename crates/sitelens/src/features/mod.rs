//! The five probes that each fill one disjoint slice of a [`FeatureRecord`](crate::record::FeatureRecord).

pub mod content;
pub mod headers;
pub mod lexical;
pub mod registry;
pub mod tls;

//! # tinyimagenet
//!
//! The TinyImageNet directory layout as an indexable image classification
//! dataset.
//!
//! This crate provides:
//! - [`TinyImageNet`]: eager `(path, label)` index over one split, with lazy
//!   image decoding on [`get`](TinyImageNet::get)
//! - [`ClassCatalog`]: sorted class identifiers, dense labels, display names
//! - [`Dataset`] trait: length + random access, the shape a batching loader expects
//! - [`Transform`] trait: injectable per-item preprocessing (closures included)
//   - Built-in transforms: Resize, ToChw, Normalize
//   - Parsers for wnids.txt, words.txt and val_annotations.txt

pub mod annotations;
pub mod catalog;
pub mod dataset;
pub mod error;
pub mod split;
pub mod tinyimagenet;
pub mod transform;

pub use annotations::{BoundingBox, ValAnnotation};
pub use catalog::ClassCatalog;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use split::Split;
pub use tinyimagenet::{TinyImageNet, TinyImageNetBuilder, TinyImageNetConfig, UNLABELED};
pub use transform::{Identity, Normalize, PlanarImage, Resize, Then, ToChw, Transform};

pub use image::RgbImage;

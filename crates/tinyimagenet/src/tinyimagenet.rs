// TinyImageNet: index builder and accessor for the TinyImageNet layout
//
//   root/
//     wnids.txt                    one class identifier per line
//     words.txt                    optional, <wnid>\t<name>
//     train/<wnid>/images/*        per-class training images
//     val/images/*                 validation images
//     val/val_annotations.txt      <file>\t<wnid>\t...
//     test/images/*                unlabeled test images
//
// The index is built eagerly and is immutable afterwards. Images are decoded
// lazily on `get`, converted to 8-bit RGB, then passed through the transform.
//
// USAGE:
//
//   let ds = TinyImageNet::new("data/tiny-imagenet-200")
//       .split(Split::Val)
//       .use_words(true)
//       .transform(Resize::new(64, 64).then(ToChw))
//       .build()?;
//   let (pixels, label) = ds.get(0)?;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::annotations::{parse_val_annotations, read_text_file, val_labels};
use crate::catalog::ClassCatalog;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::split::Split;
use crate::transform::{Identity, Transform};

/// Label of every sample in an unlabeled split.
pub const UNLABELED: i64 = -1;

// TinyImageNetConfig

/// The serializable construction options of a [`TinyImageNet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TinyImageNetConfig {
    /// Base directory of the dataset.
    pub root: PathBuf,
    /// Partition to index.
    #[serde(default)]
    pub split: Split,
    /// Resolve human-readable class names from `words.txt`.
    #[serde(default)]
    pub use_words: bool,
}

impl TinyImageNetConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            split: Split::default(),
            use_words: false,
        }
    }

    pub fn split(mut self, split: Split) -> Self {
        self.split = split;
        self
    }

    pub fn use_words(mut self, yes: bool) -> Self {
        self.use_words = yes;
        self
    }
}

// TinyImageNetBuilder

/// Builder for [`TinyImageNet`].
pub struct TinyImageNetBuilder<T = RgbImage> {
    config: TinyImageNetConfig,
    transform: Box<dyn Transform<RgbImage, Output = T>>,
}

impl TinyImageNetBuilder<RgbImage> {
    /// Create a builder rooted at the given directory, for the train split.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::from_config(TinyImageNetConfig::new(root))
    }

    /// Create a builder from a complete configuration.
    pub fn from_config(config: TinyImageNetConfig) -> Self {
        TinyImageNetBuilder {
            config,
            transform: Box::new(Identity),
        }
    }
}

impl<T> TinyImageNetBuilder<T> {
    pub fn split(mut self, split: Split) -> Self {
        self.config.split = split;
        self
    }

    pub fn use_words(mut self, yes: bool) -> Self {
        self.config.use_words = yes;
        self
    }

    /// Apply `transform` to every decoded image before it is returned.
    pub fn transform<U, F>(self, transform: F) -> TinyImageNetBuilder<U>
    where
        F: Transform<RgbImage, Output = U> + 'static,
    {
        TinyImageNetBuilder {
            config: self.config,
            transform: Box::new(transform),
        }
    }

    pub fn config(&self) -> &TinyImageNetConfig {
        &self.config
    }

    /// Read the class catalog and index the selected split.
    pub fn build(self) -> Result<TinyImageNet<T>> {
        TinyImageNet::scan(self.config, self.transform)
    }
}

impl<T> fmt::Debug for TinyImageNetBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinyImageNetBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// SampleIndex

/// Aligned `(path, label)` sequences.
#[derive(Debug, Default)]
struct SampleIndex {
    paths: Vec<PathBuf>,
    labels: Vec<i64>,
}

impl SampleIndex {
    fn push(&mut self, path: PathBuf, label: i64) {
        self.paths.push(path);
        self.labels.push(label);
    }
}

// TinyImageNet dataset

/// A TinyImageNet split as an indexable `(image, label)` dataset.
///
/// `T` is the item type produced by the transform; without a transform it
/// is the decoded [`RgbImage`]. Labels are catalog indices, or
/// [`UNLABELED`] for the test split.
pub struct TinyImageNet<T = RgbImage> {
    root: PathBuf,
    split: Split,
    catalog: ClassCatalog,
    index: SampleIndex,
    transform: Box<dyn Transform<RgbImage, Output = T>>,
}

impl TinyImageNet<RgbImage> {
    /// Convenience entry-point: `TinyImageNet::new(root)` returns a builder.
    ///
    /// To build straight from a split name, use [`open`](Self::open).
    pub fn new<P: AsRef<Path>>(root: P) -> TinyImageNetBuilder {
        TinyImageNetBuilder::new(root)
    }

    /// Build an untransformed dataset from a split name (`train`, `val` or `test`).
    pub fn open<P: AsRef<Path>>(root: P, split: &str, use_words: bool) -> Result<Self> {
        let split: Split = split.parse()?;
        TinyImageNetBuilder::new(root)
            .split(split)
            .use_words(use_words)
            .build()
    }
}

impl<T> TinyImageNet<T> {
    fn scan(
        config: TinyImageNetConfig,
        transform: Box<dyn Transform<RgbImage, Output = T>>,
    ) -> Result<Self> {
        let TinyImageNetConfig {
            root,
            split,
            use_words,
        } = config;

        let catalog = ClassCatalog::load(&root, use_words)?;

        let index = match split {
            Split::Train => index_train(&root, &catalog)?,
            Split::Val => index_val(&root, &catalog)?,
            Split::Test => index_test(&root)?,
        };

        info!(
            root = %root.display(),
            split = %split,
            samples = index.paths.len(),
            classes = catalog.len(),
            "indexed TinyImageNet split"
        );

        Ok(TinyImageNet {
            root,
            split,
            catalog,
            index,
            transform,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.index.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.paths.is_empty()
    }

    /// Decode the image at `index`, apply the transform, and return it with its label.
    pub fn get(&self, index: usize) -> Result<(T, i64)> {
        let (image, label) = self.get_raw(index)?;
        Ok((self.transform.apply(image), label))
    }

    /// Decode the image at `index` without applying the transform.
    pub fn get_raw(&self, index: usize) -> Result<(RgbImage, i64)> {
        let path = self.index.paths.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        Ok((load_rgb(path)?, self.index.labels[index]))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn is_labeled(&self) -> bool {
        self.split.is_labeled()
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Sorted class identifiers.
    pub fn classes(&self) -> &[String] {
        self.catalog.classes()
    }

    /// Display names aligned with [`classes`](Self::classes).
    pub fn class_names(&self) -> &[String] {
        self.catalog.names()
    }

    pub fn num_classes(&self) -> usize {
        self.catalog.len()
    }

    /// Label of a class identifier.
    pub fn class_index(&self, wnid: &str) -> Option<usize> {
        self.catalog.index_of(wnid)
    }

    /// Display name for a label; `None` for [`UNLABELED`] or an unknown label.
    pub fn class_name(&self, label: i64) -> Option<&str> {
        usize::try_from(label)
            .ok()
            .and_then(|l| self.catalog.name_of(l))
    }

    pub fn class_to_idx(&self) -> &std::collections::HashMap<String, usize> {
        self.catalog.class_to_idx()
    }

    /// File path of the i-th sample.
    pub fn path_of(&self, index: usize) -> Option<&Path> {
        self.index.paths.get(index).map(PathBuf::as_path)
    }

    /// Label of the i-th sample.
    pub fn label_of(&self, index: usize) -> Option<i64> {
        self.index.labels.get(index).copied()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.index.paths
    }

    pub fn labels(&self) -> &[i64] {
        &self.index.labels
    }
}

impl<T> Dataset for TinyImageNet<T> {
    type Item = (T, i64);

    fn len(&self) -> usize {
        TinyImageNet::len(self)
    }

    fn get(&self, index: usize) -> Result<(T, i64)> {
        TinyImageNet::get(self, index)
    }

    fn name(&self) -> &str {
        "TinyImageNet"
    }
}

impl<T> fmt::Debug for TinyImageNet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinyImageNet")
            .field("root", &self.root)
            .field("split", &self.split)
            .field("classes", &self.catalog.len())
            .field("samples", &self.len())
            .finish_non_exhaustive()
    }
}

// Index construction

fn index_train(root: &Path, catalog: &ClassCatalog) -> Result<SampleIndex> {
    let train_dir = root.join("train");
    let mut index = SampleIndex::default();
    for (label, wnid) in catalog.classes().iter().enumerate() {
        let class_dir = train_dir.join(wnid).join("images");
        if !class_dir.is_dir() {
            debug!(
                class = %wnid,
                dir = %class_dir.display(),
                "skipping missing class directory"
            );
            continue;
        }
        for path in list_files(&class_dir)? {
            index.push(path, label as i64);
        }
    }
    Ok(index)
}

fn index_val(root: &Path, catalog: &ClassCatalog) -> Result<SampleIndex> {
    let val_dir = root.join("val");
    let images_dir = val_dir.join("images");
    if !images_dir.is_dir() {
        return Err(Error::missing(images_dir));
    }
    let annotations_path = val_dir.join("val_annotations.txt");
    let annotations = parse_val_annotations(&read_text_file(&annotations_path)?);
    let file_to_wnid = val_labels(&annotations);

    let mut index = SampleIndex::default();
    for path in list_files(&images_dir)? {
        // Annotation keys are UTF-8, so a non-UTF-8 file name never matches one.
        let label = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| file_to_wnid.get(n))
            .and_then(|wnid| catalog.index_of(wnid));
        match label {
            Some(label) => index.push(path, label as i64),
            None => debug!(
                path = %path.display(),
                "skipping unannotated, unknown-class or non-UTF-8-named image"
            ),
        }
    }
    Ok(index)
}

fn index_test(root: &Path) -> Result<SampleIndex> {
    let images_dir = root.join("test").join("images");
    if !images_dir.is_dir() {
        return Err(Error::missing(images_dir));
    }
    let mut index = SampleIndex::default();
    for path in list_files(&images_dir)? {
        index.push(path, UNLABELED);
    }
    Ok(index)
}

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Open and decode an image, normalizing it to 8-bit RGB.
///
/// The format is sniffed from the file contents; the extension is only a
/// fallback when the contents are not recognized.
fn load_rgb(path: &Path) -> Result<RgbImage> {
    let decode_error = |source: ImageError| Error::Decode {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;
    Ok(image.to_rgb8())
}

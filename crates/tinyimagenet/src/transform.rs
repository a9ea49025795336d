// Transform: per-item preprocessing applied after decoding

use image::imageops::{self, FilterType};
use image::RgbImage;

/// A transform applied to each decoded item before it is returned.
///
/// Any `Fn(I) -> O + Send + Sync` closure is a transform, so callers can
/// inject arbitrary preprocessing without defining a type.
pub trait Transform<I>: Send + Sync {
    type Output;

    /// Apply the transform to one item.
    fn apply(&self, input: I) -> Self::Output;

    /// Chain `next` after this transform.
    fn then<B>(self, next: B) -> Then<Self, B>
    where
        Self: Sized,
        B: Transform<Self::Output>,
    {
        Then { first: self, second: next }
    }
}

impl<I, O, F> Transform<I> for F
where
    F: Fn(I) -> O + Send + Sync,
{
    type Output = O;

    fn apply(&self, input: I) -> O {
        self(input)
    }
}

/// Returns the input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<I> Transform<I> for Identity {
    type Output = I;

    fn apply(&self, input: I) -> I {
        input
    }
}

/// Two transforms applied in sequence. Built by [`Transform::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<I, A, B> Transform<I> for Then<A, B>
where
    A: Transform<I>,
    B: Transform<A::Output>,
{
    type Output = B::Output;

    fn apply(&self, input: I) -> Self::Output {
        self.second.apply(self.first.apply(input))
    }
}

// Built-in transforms

/// Resize images to exactly (width, height).
///
/// Images already at the target size pass through untouched.
#[derive(Debug, Clone, Copy)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
    pub filter: FilterType,
}

impl Resize {
    /// Resize with the Lanczos3 filter.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

impl Transform<RgbImage> for Resize {
    type Output = RgbImage;

    fn apply(&self, image: RgbImage) -> RgbImage {
        if image.width() == self.width && image.height() == self.height {
            return image;
        }
        imageops::resize(&image, self.width, self.height, self.filter)
    }
}

/// Pixel data in planar `[C, H, W]` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarImage {
    /// Channel-major pixel values.
    pub data: Vec<f32>,
    /// `[channels, height, width]`.
    pub shape: [usize; 3],
}

/// Convert an RGB image to a [`PlanarImage`] with values scaled to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToChw;

impl Transform<RgbImage> for ToChw {
    type Output = PlanarImage;

    fn apply(&self, image: RgbImage) -> PlanarImage {
        let (w, h) = image.dimensions();
        let raw = image.as_raw();
        // Convert from [H, W, C] interleaved to [C, H, W] planar
        let npix = plane_len(w, h);
        let mut data = vec![0.0f32; 3 * npix];
        for i in 0..npix {
            data[i] = raw[i * 3] as f32 / 255.0;
            data[npix + i] = raw[i * 3 + 1] as f32 / 255.0;
            data[2 * npix + i] = raw[i * 3 + 2] as f32 / 255.0;
        }
        PlanarImage {
            data,
            shape: [3, h as usize, w as usize],
        }
    }
}

/// Pixels per channel plane, computed in `usize` so large images cannot overflow.
fn plane_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Standardize each channel of a [`PlanarImage`] to zero mean and unit variance.
#[derive(Debug, Clone, Copy)]
pub struct Normalize {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalize {
    pub fn new(mean: [f32; 3], std: [f32; 3]) -> Self {
        Self { mean, std }
    }

    /// The per-channel statistics of ImageNet, commonly reused for TinyImageNet.
    pub fn imagenet() -> Self {
        Self::new([0.485, 0.456, 0.406], [0.229, 0.224, 0.225])
    }
}

impl Transform<PlanarImage> for Normalize {
    type Output = PlanarImage;

    fn apply(&self, mut image: PlanarImage) -> PlanarImage {
        let plane = image.shape[1] * image.shape[2];
        for (c, values) in image.data.chunks_mut(plane.max(1)).enumerate().take(3) {
            for v in values {
                *v = (*v - self.mean[c]) / self.std[c];
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 0, 51])
            } else {
                Rgb([0, 255, 102])
            }
        })
    }

    #[test]
    fn closures_are_transforms() {
        let t = |img: RgbImage| img.width() * 10;
        assert_eq!(t.apply(checker(3, 2)), 30);
    }

    #[test]
    fn identity_passes_through() {
        let img = checker(2, 2);
        assert_eq!(Identity.apply(img.clone()), img);
    }

    #[test]
    fn resize_changes_dimensions() {
        let out = Resize::new(4, 6)
            .with_filter(FilterType::Nearest)
            .apply(checker(8, 8));
        assert_eq!(out.dimensions(), (4, 6));
    }

    #[test]
    fn to_chw_is_planar_and_scaled() {
        let out = ToChw.apply(checker(2, 1));
        assert_eq!(out.shape, [3, 1, 2]);
        // R plane, G plane, B plane
        assert_eq!(&out.data[0..2], &[1.0, 0.0]);
        assert_eq!(&out.data[2..4], &[0.0, 1.0]);
        assert!((out.data[4] - 0.2).abs() < 1e-6);
        assert!((out.data[5] - 0.4).abs() < 1e-6);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn plane_len_does_not_wrap_at_u32() {
        assert_eq!(plane_len(65_536, 65_536), 1usize << 32);
        assert_eq!(plane_len(u32::MAX, 2), 2 * u32::MAX as usize);
    }

    #[test]
    fn to_chw_non_square() {
        let out = ToChw.apply(checker(3, 5));
        assert_eq!(out.shape, [3, 5, 3]);
        assert_eq!(out.data.len(), 45);
    }

    #[test]
    fn normalize_per_channel() {
        let t = Normalize::new([0.5, 0.0, 0.0], [0.5, 1.0, 2.0]);
        let out = t.apply(PlanarImage {
            data: vec![1.0, 0.0, 0.5, 0.25, 1.0, 2.0],
            shape: [3, 1, 2],
        });
        assert_eq!(out.data, vec![1.0, -1.0, 0.5, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn then_chains_in_order() {
        let t = Resize::new(2, 2).with_filter(FilterType::Nearest).then(ToChw);
        let out = t.apply(checker(4, 4));
        assert_eq!(out.shape, [3, 2, 2]);
        assert_eq!(out.data.len(), 12);
    }
}

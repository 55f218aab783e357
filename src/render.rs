//! Crop-to-fit resizing of the base image into each variant.

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::config::VariantSpec;

/// Region of the source image kept before scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropBox {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width of the region
    pub width: u32,
    /// Height of the region
    pub height: u32,
}

impl CropBox {
    fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// True when the box is the whole `width`x`height` frame.
    pub fn is_full_frame(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

/// Largest centered region of a `src_w`x`src_h` image with the aspect ratio of `dst_w`x`dst_h`.
pub fn crop_box(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> CropBox {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return CropBox::full(src_w, src_h);
    }
    let (sw, sh, dw, dh) = (
        u64::from(src_w),
        u64::from(src_h),
        u64::from(dst_w),
        u64::from(dst_h),
    );
    // compare src_w/src_h against dst_w/dst_h without floats
    let src_side = sw * dh;
    let dst_side = sh * dw;
    if src_side == dst_side {
        CropBox::full(src_w, src_h)
    } else if src_side > dst_side {
        // source is wider, trim the sides
        let width = ((sh * dw + dh / 2) / dh).clamp(1, sw) as u32;
        CropBox {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        let height = ((sw * dh + dw / 2) / dw).clamp(1, sh) as u32;
        CropBox {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    }
}

/// Renders `base` at exactly `spec.width`x`spec.height`, center-cropping whatever doesn't fit.
pub fn render_variant(base: &RgbImage, spec: &VariantSpec) -> RgbImage {
    let (src_w, src_h) = base.dimensions();
    if src_w == 0 || src_h == 0 {
        return RgbImage::new(spec.width, spec.height);
    }

    let region = crop_box(src_w, src_h, spec.width, spec.height);
    let cropped = if region.is_full_frame(src_w, src_h) {
        None
    } else {
        Some(imageops::crop_imm(base, region.x, region.y, region.width, region.height).to_image())
    };
    let source = cropped.as_ref().unwrap_or(base);

    if source.dimensions() == (spec.width, spec.height) {
        return source.clone();
    }
    imageops::resize(source, spec.width, spec.height, FilterType::Lanczos3)
}

//! Pixel primitives over an RGBA8 frame. Everything clips silently.

use super::layout::PxRect;

pub(crate) struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

fn pixel_offset(width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return None;
    }
    (y as usize)
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
}

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    let Some(offset) = pixel_offset(width, height, x, y) else {
        return;
    };
    let Some(pixel) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    pixel.copy_from_slice(&color);
}

/// Source-over blend of `color` onto the frame; the result is opaque.
pub(crate) fn blend_pixel_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    let Some(offset) = pixel_offset(width, height, x, y) else {
        return;
    };
    let Some(pixel) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    let alpha = u16::from(color[3]);
    for channel in 0..3 {
        let src = u16::from(color[channel]);
        let dst = u16::from(pixel[channel]);
        pixel[channel] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
    }
    pixel[3] = 255;
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

pub(crate) fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: PxRect, color: [u8; 4]) {
    for y in rect.y..rect.y + rect.h {
        for x in rect.x..rect.x + rect.w {
            write_pixel_rgba_clipped(frame, width, height, x, y, color);
        }
    }
}

pub(crate) fn blend_rect(frame: &mut [u8], width: u32, height: u32, rect: PxRect, color: [u8; 4]) {
    if color[3] == 255 {
        fill_rect(frame, width, height, rect, color);
        return;
    }
    if color[3] == 0 {
        return;
    }
    for y in rect.y..rect.y + rect.h {
        for x in rect.x..rect.x + rect.w {
            blend_pixel_clipped(frame, width, height, x, y, color);
        }
    }
}

pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    thickness: i32,
    color: [u8; 4],
) {
    if rect.w <= 0 || rect.h <= 0 {
        return;
    }
    let t = thickness.max(1);
    let bands = [
        PxRect { h: t, ..rect },
        PxRect {
            y: rect.y + rect.h - t,
            h: t,
            ..rect
        },
        PxRect { w: t, ..rect },
        PxRect {
            x: rect.x + rect.w - t,
            w: t,
            ..rect
        },
    ];
    for band in bands {
        fill_rect(frame, width, height, band, color);
    }
}

/// Nearest-neighbour stretch of `image` into `rect`, blending by source alpha.
pub(crate) fn draw_image_stretched(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    image: &LoadedImage,
) {
    if image.width == 0 || image.height == 0 || rect.w <= 0 || rect.h <= 0 {
        return;
    }
    if image.rgba.len() < image.width as usize * image.height as usize * 4 {
        return;
    }
    let draw_left = rect.x.max(0);
    let draw_top = rect.y.max(0);
    let draw_right = (rect.x + rect.w).min(width as i32);
    let draw_bottom = (rect.y + rect.h).min(height as i32);
    for out_y in draw_top..draw_bottom {
        let src_y = ((out_y - rect.y) as u64 * u64::from(image.height) / rect.h as u64) as usize;
        let src_y = src_y.min(image.height as usize - 1);
        for out_x in draw_left..draw_right {
            let src_x = ((out_x - rect.x) as u64 * u64::from(image.width) / rect.w as u64) as usize;
            let src_x = src_x.min(image.width as usize - 1);
            let src = (src_y * image.width as usize + src_x) * 4;
            let color = [
                image.rgba[src],
                image.rgba[src + 1],
                image.rgba[src + 2],
                image.rgba[src + 3],
            ];
            match color[3] {
                0 => {}
                255 => write_pixel_rgba_clipped(frame, width, height, out_x, out_y, color),
                _ => blend_pixel_clipped(frame, width, height, out_x, out_y, color),
            }
        }
    }
}

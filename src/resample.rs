/// Bilinearly resample an interleaved `channels`-per-pixel buffer.
///
/// Destination pixel centers are mapped back into source space with
/// `(d + 0.5) * src / dst - 0.5`, the 2x2 neighborhood is clamped to the
/// source edges (no wrap, no extrapolation) and each channel is lerped
/// with the fractional weights. `dst` must hold `dst_w * dst_h * channels`
/// bytes and `src` `src_w * src_h * channels`.
pub fn resample_bilinear(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    channels: usize,
) {
    debug_assert_eq!(src.len(), src_w as usize * src_h as usize * channels);
    debug_assert_eq!(dst.len(), dst_w as usize * dst_h as usize * channels);

    if src_w == dst_w && src_h == dst_h {
        dst.copy_from_slice(src);
        return;
    }
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return;
    }

    let src_stride = src_w as usize * channels;
    let dst_stride = dst_w as usize * channels;

    for y in 0..dst_h as usize {
        let src_y = ((y as f32 + 0.5) * src_h as f32 / dst_h as f32) - 0.5;
        let y0 = src_y.floor() as i32;
        let y1 = (y0 + 1).min(src_h as i32 - 1) as usize;
        let fy = src_y - y0 as f32;
        let y0 = y0.max(0) as usize;

        let row = &mut dst[y * dst_stride..(y + 1) * dst_stride];

        for x in 0..dst_w as usize {
            let src_x = ((x as f32 + 0.5) * src_w as f32 / dst_w as f32) - 0.5;
            let x0 = src_x.floor() as i32;
            let x1 = (x0 + 1).min(src_w as i32 - 1) as usize;
            let fx = src_x - x0 as f32;
            let x0 = x0.max(0) as usize;

            let p00 = y0 * src_stride + x0 * channels;
            let p10 = y0 * src_stride + x1 * channels;
            let p01 = y1 * src_stride + x0 * channels;
            let p11 = y1 * src_stride + x1 * channels;

            for c in 0..channels {
                let c00 = src[p00 + c] as f32;
                let c10 = src[p10 + c] as f32;
                let c01 = src[p01 + c] as f32;
                let c11 = src[p11 + c] as f32;
                let top = c00 + fx * (c10 - c00);
                let bottom = c01 + fx * (c11 - c01);
                row[x * channels + c] = (top + fy * (bottom - top)) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_survives_any_target_size() {
        let src = vec![123u8; 5 * 5 * 3];
        for (dw, dh) in [(3u32, 3u32), (8, 8), (16, 4), (1, 1)] {
            let mut dst = vec![0u8; (dw * dh) as usize * 3];
            resample_bilinear(&src, 5, 5, &mut dst, dw, dh, 3);
            assert!(dst.iter().all(|&b| b == 123), "{}x{}", dw, dh);
        }
    }

    #[test]
    fn identical_dimensions_copy_exactly() {
        let src: Vec<u8> = (0..4 * 4 * 4).map(|i| (i * 7 % 251) as u8).collect();
        let mut dst = vec![0u8; src.len()];
        resample_bilinear(&src, 4, 4, &mut dst, 4, 4, 4);
        assert_eq!(src, dst);
    }

    #[test]
    fn two_to_one_averages_neighbors() {
        // 2x1 RGB: pure black and pure white collapse to the midpoint.
        let src = vec![0u8, 0, 0, 255, 255, 255];
        let mut dst = vec![0u8; 3];
        resample_bilinear(&src, 2, 1, &mut dst, 1, 1, 3);
        assert_eq!(dst, vec![127, 127, 127]);
    }

    #[test]
    fn upscale_clamps_at_edges() {
        // 1x1 source upscaled: every destination pixel samples the single
        // source pixel regardless of the fractional coordinate.
        let src = vec![9u8, 8, 7];
        let mut dst = vec![0u8; 4 * 4 * 3];
        resample_bilinear(&src, 1, 1, &mut dst, 4, 4, 3);
        for px in dst.chunks(3) {
            assert_eq!(px, &[9, 8, 7]);
        }
    }
}

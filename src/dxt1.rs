use byteorder::{LittleEndian, WriteBytesExt};
use rayon::prelude::*;

/// DXT1/BC1 blocks cover 4x4 texels and encode to 8 bytes.
pub const BLOCK_DIM: u32 = 4;
const BLOCK_BYTES: usize = 8;

/// Size in bytes of the DXT1 encoding of a `width` x `height` image.
/// Both dimensions must be multiples of 4.
pub fn compressed_size(width: u32, height: u32) -> usize {
    (width / BLOCK_DIM) as usize * (height / BLOCK_DIM) as usize * BLOCK_BYTES
}

/// Compress a tightly packed RGB buffer to DXT1 with fixed default
/// parameters (bounding-box endpoints, no alpha punch-through). Both
/// dimensions must be multiples of 4; block rows are encoded in parallel.
pub fn compress_rgb(src: &[u8], width: u32, height: u32) -> Vec<u8> {
    assert_eq!(width % BLOCK_DIM, 0, "width must be a multiple of 4");
    assert_eq!(height % BLOCK_DIM, 0, "height must be a multiple of 4");
    assert_eq!(src.len(), width as usize * height as usize * 3);

    let blocks_w = (width / BLOCK_DIM) as usize;
    let blocks_h = (height / BLOCK_DIM) as usize;

    let rows: Vec<Vec<u8>> = (0..blocks_h)
        .into_par_iter()
        .map(|by| {
            let mut out = Vec::with_capacity(blocks_w * BLOCK_BYTES);
            for bx in 0..blocks_w {
                encode_block(src, width as usize, bx, by, &mut out);
            }
            out
        })
        .collect();

    rows.concat()
}

fn encode_block(src: &[u8], width: usize, bx: usize, by: usize, out: &mut Vec<u8>) {
    // Gather the 16 texels of the block.
    let mut texels = [[0u8; 3]; 16];
    for ty in 0..4 {
        let row = (by * 4 + ty) * width * 3;
        for tx in 0..4 {
            let at = row + (bx * 4 + tx) * 3;
            texels[ty * 4 + tx] = [src[at], src[at + 1], src[at + 2]];
        }
    }

    // Bounding-box endpoint selection.
    let mut lo = [255u8; 3];
    let mut hi = [0u8; 3];
    for texel in &texels {
        for c in 0..3 {
            lo[c] = lo[c].min(texel[c]);
            hi[c] = hi[c].max(texel[c]);
        }
    }

    let mut c0 = pack_565(hi);
    let mut c1 = pack_565(lo);
    // c0 > c1 selects the opaque 4-color mode.
    if c0 < c1 {
        std::mem::swap(&mut c0, &mut c1);
    }

    let indices = if c0 == c1 {
        0
    } else {
        let palette = palette_565(c0, c1);
        let mut word = 0u32;
        for (i, texel) in texels.iter().enumerate() {
            word |= (nearest(&palette, *texel) as u32) << (i * 2);
        }
        word
    };

    // Failing to write to a Vec is unreachable.
    out.write_u16::<LittleEndian>(c0).unwrap();
    out.write_u16::<LittleEndian>(c1).unwrap();
    out.write_u32::<LittleEndian>(indices).unwrap();
}

fn pack_565(rgb: [u8; 3]) -> u16 {
    ((rgb[0] as u16 >> 3) << 11) | ((rgb[1] as u16 >> 2) << 5) | (rgb[2] as u16 >> 3)
}

fn unpack_565(c: u16) -> [u8; 3] {
    // Expand with bit replication so pure white stays 255.
    let r = ((c >> 11) & 0x1f) as u8;
    let g = ((c >> 5) & 0x3f) as u8;
    let b = (c & 0x1f) as u8;
    [
        (r << 3) | (r >> 2),
        (g << 2) | (g >> 4),
        (b << 3) | (b >> 2),
    ]
}

fn palette_565(c0: u16, c1: u16) -> [[u8; 3]; 4] {
    let a = unpack_565(c0);
    let b = unpack_565(c1);
    let mut palette = [a, b, [0; 3], [0; 3]];
    for c in 0..3 {
        palette[2][c] = ((2 * a[c] as u16 + b[c] as u16) / 3) as u8;
        palette[3][c] = ((a[c] as u16 + 2 * b[c] as u16) / 3) as u8;
    }
    palette
}

fn nearest(palette: &[[u8; 3]; 4], texel: [u8; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = u32::MAX;
    for (i, color) in palette.iter().enumerate() {
        let dist: u32 = (0..3)
            .map(|c| {
                let d = color[c] as i32 - texel[c] as i32;
                (d * d) as u32
            })
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

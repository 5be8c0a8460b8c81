use crate::config::Size;
use image::{GrayImage, Luma};

const HIST_SIZE: usize = 256;

/// Contrast-limited adaptive histogram equalization
///
/// The image is split into a `tiles.width` x `tiles.height` grid (padded by
/// reflection when the size is not a multiple of the grid). Each tile gets its
/// own equalization table from a clipped histogram, and every pixel is mapped
/// through a bilinear blend of the four nearest tables. This flattens uneven
/// lighting while keeping noise in flat areas from being amplified.
pub fn apply(gray: &GrayImage, clip_limit: f32, tiles: Size) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tile_w = width.div_ceil(tiles.width);
    let tile_h = height.div_ceil(tiles.height);
    let tile_area = (tile_w * tile_h) as usize;

    let clip = if clip_limit > 0.0 {
        Some(((clip_limit * tile_area as f32 / HIST_SIZE as f32) as u32).max(1))
    } else {
        None
    };

    let mut luts = Vec::with_capacity((tiles.width * tiles.height) as usize);
    for ty in 0..tiles.height {
        for tx in 0..tiles.width {
            let mut hist = [0u32; HIST_SIZE];
            for y in ty * tile_h..(ty + 1) * tile_h {
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let v = gray
                        .get_pixel(reflect_101(x, width), reflect_101(y, height))
                        .0[0];
                    hist[v as usize] += 1;
                }
            }
            if let Some(limit) = clip {
                clip_histogram(&mut hist, limit);
            }
            luts.push(equalization_table(&hist, tile_area));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles.width + tx) as usize];
    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;

    GrayImage::from_fn(width, height, |x, y| {
        let (tx1, tx2, xa) = neighbours(x as f32 * inv_tw - 0.5, tiles.width);
        let (ty1, ty2, ya) = neighbours(y as f32 * inv_th - 0.5, tiles.height);
        let v = gray.get_pixel(x, y).0[0] as usize;

        let top = lut_at(tx1, ty1)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[v] as f32 * xa;
        let bottom = lut_at(tx1, ty2)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[v] as f32 * xa;
        let res = top * (1.0 - ya) + bottom * ya;

        Luma([res.round().clamp(0.0, 255.0) as u8])
    })
}

/// Index into `[0, len)` mirroring around the last pixel without repeating it
fn reflect_101(i: u32, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let i = i % period;
    if i < len {
        i
    } else {
        period - i
    }
}

/// Tile indices on either side of a fractional tile coordinate and the weight of the second
fn neighbours(t: f32, count: u32) -> (u32, u32, f32) {
    let t1 = t.floor();
    let weight = t - t1;
    let t1 = t1 as i64;
    let first = t1.max(0) as u32;
    let second = (t1 + 1).min(count as i64 - 1) as u32;
    (first, second, weight)
}

/// Cap every bin at `limit` and spread the excess evenly over all bins
fn clip_histogram(hist: &mut [u32; HIST_SIZE], limit: u32) {
    let mut clipped = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / HIST_SIZE as u32;
    let mut residual = clipped as usize - batch as usize * HIST_SIZE;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual != 0 {
        let step = (HIST_SIZE / residual).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            i += step;
            residual -= 1;
        }
    }
}

fn equalization_table(hist: &[u32; HIST_SIZE], tile_area: usize) -> [u8; HIST_SIZE] {
    let scale = 255.0 / tile_area as f32;
    let mut lut = [0u8; HIST_SIZE];
    let mut sum = 0u32;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

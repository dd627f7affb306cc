/// Precompute the result of a tilable computation
/// for faster memory access by row.
///
/// Yields `tile_size` rows of `row_size` values, `map(x, y, idx)` each.
#[inline(always)]
pub fn precompute_tiled_rows<T, MapFn>(tile_size: usize, row_size: usize, map: MapFn) -> Vec<T>
where
    MapFn: Fn(usize, usize, usize) -> T,
{
    let mut cache = Vec::with_capacity(tile_size * row_size);
    for y in 0..tile_size {
        for x in 0..row_size {
            cache.push(map(x, y, cache.len()));
        }
    }
    cache
}

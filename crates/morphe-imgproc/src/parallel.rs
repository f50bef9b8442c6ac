use rayon::prelude::*;

use morphe_image::Image;

/// Controls how parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool.
    #[default]
    Parallel,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,
}

/// Map every item with `f` and collect the results in input order.
///
/// The first error aborts the collection.
pub fn try_map_collect<T, R, E>(
    strategy: ExecutionStrategy,
    items: &[T],
    f: impl Fn(&T) -> Result<R, E> + Send + Sync,
) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
{
    match strategy {
        ExecutionStrategy::Serial => items.iter().map(f).collect(),
        ExecutionStrategy::Parallel => items.par_iter().map(f).collect(),
    }
}

/// Apply a function to each pixel value of two images in parallel, writing into `dst`.
pub fn par_iter_rows_val_two<const C: usize, T3>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    dst: &mut Image<T3, C>,
    f: impl Fn(&u8, &u8, &mut T3) + Send + Sync,
) where
    T3: Send,
{
    let stride = (C * src1.cols()).max(1);
    src1.as_slice()
        .par_chunks_exact(stride)
        .zip(src2.as_slice().par_chunks_exact(stride))
        .zip(dst.as_slice_mut().par_chunks_exact_mut(stride))
        .for_each(|((src1_chunk, src2_chunk), dst_chunk)| {
            src1_chunk
                .iter()
                .zip(src2_chunk.iter())
                .zip(dst_chunk.iter_mut())
                .for_each(|((src1_pixel, src2_pixel), dst_pixel)| {
                    f(src1_pixel, src2_pixel, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphe_image::ImageError;

    #[test]
    fn test_map_serial_and_parallel() {
        let src = vec![1, 2, 3, 4];
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Parallel] {
            let dst: Result<Vec<i32>, ()> = try_map_collect(strategy, &src, |s| Ok(*s * 2));
            assert_eq!(dst, Ok(vec![2, 4, 6, 8]));
        }
    }

    #[test]
    fn test_map_error() {
        let src = vec![1, 2, 3];
        let res: Result<Vec<i32>, String> =
            try_map_collect(ExecutionStrategy::Parallel, &src, |s| {
                if *s == 2 {
                    Err("two".to_string())
                } else {
                    Ok(*s)
                }
            });
        assert_eq!(res, Err("two".to_string()));
    }

    #[test]
    fn test_iter_rows_val_two() -> Result<(), ImageError> {
        let a = Image::<u8, 1>::new([2, 2].into(), vec![1, 2, 3, 4])?;
        let b = Image::<u8, 1>::new([2, 2].into(), vec![10, 20, 30, 40])?;
        let mut dst = Image::<u16, 1>::from_size_val([2, 2].into(), 0)?;
        par_iter_rows_val_two(&a, &b, &mut dst, |x, y, d| *d = *x as u16 + *y as u16);
        assert_eq!(dst.as_slice(), &[11, 22, 33, 44]);
        Ok(())
    }
}

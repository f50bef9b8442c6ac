use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use morphe_image::Image;
use morphe_imgproc::{
    interpolation::InterpolationMode,
    warp::{AffineTransform, TriangleMask},
};

fn bench_warp_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("WarpTriangle");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let image = Image::<u8, 3>::new(image_size, vec![0u8; width * height * 3]).unwrap();
        let output = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();

        let (w, h) = ((*width - 1) as f64, (*height - 1) as f64);
        let src = [[0.0, 0.0], [w, 0.0], [0.0, h]];
        let dst = [[w * 0.1, h * 0.05], [w, h * 0.1], [w * 0.05, h]];
        let transform = AffineTransform::from_triangles(&src, &dst).unwrap();

        group.bench_with_input(
            BenchmarkId::new("bilinear", &parameter_string),
            &(&image, &output, &transform),
            |b, i| {
                let (src, mut dst, transform) = (i.0, i.1.clone(), i.2);
                b.iter(|| {
                    transform.warp_with(
                        black_box(src),
                        black_box(&mut dst),
                        black_box(InterpolationMode::Bilinear),
                    )
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("mask", &parameter_string),
            &(dst, image_size),
            |b, i| b.iter(|| TriangleMask::from_triangle(black_box(&i.0), black_box(i.1))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_warp_triangle);
criterion_main!(benches);

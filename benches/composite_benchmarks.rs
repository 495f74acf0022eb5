use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use segdemo::{
    normalize, BlendPathway, CompositeConfig, Image, Mask, MaskCompositor, Orientation,
    ResampleFilter,
};

const RESOLUTIONS: [(u32, u32); 3] = [(640, 480), (1280, 720), (1920, 1080)];

fn test_image(width: u32, height: u32) -> Image {
    let buffer = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    Image::new(DynamicImage::ImageRgb8(buffer))
}

fn test_mask(width: u32, height: u32) -> Mask {
    let data = (0..width * height).map(|i| (i % 256) as u8).collect();
    Mask::new(data, (width, height))
}

fn benchmark_blend_pathways(c: &mut Criterion) {
    let mut group = c.benchmark_group("blend_pathway");

    for (width, height) in RESOLUTIONS {
        let original = test_image(width, height);
        let mask = test_mask(width, height);

        for pathway in [BlendPathway::Vectorized, BlendPathway::Scanline] {
            let compositor =
                MaskCompositor::new(CompositeConfig::default().with_pathway(pathway));
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", pathway), format!("{}x{}", width, height)),
                &(original.clone(), mask.clone()),
                |b, (original, mask)| {
                    b.iter(|| compositor.composite(black_box(original), black_box(mask)));
                },
            );
        }
    }

    group.finish();
}

fn benchmark_mask_resampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_resampling");
    let original = test_image(1920, 1080);
    // Segmenters commonly return masks at reduced resolution.
    let mask = test_mask(480, 270);

    for filter in [ResampleFilter::Nearest, ResampleFilter::Bilinear] {
        let compositor = MaskCompositor::new(CompositeConfig::default().with_filter(filter));
        group.bench_function(format!("{:?}", filter), |b| {
            b.iter(|| compositor.composite(black_box(&original), black_box(&mask)));
        });
    }

    group.finish();
}

fn benchmark_orientation(c: &mut Criterion) {
    let mut group = c.benchmark_group("orientation");
    let image = test_image(1920, 1080);

    for orientation in [Orientation::Identity, Orientation::Rotate90, Orientation::Rotate270] {
        let tagged = image.clone().with_orientation(orientation);
        group.bench_function(format!("{:?}", orientation), |b| {
            b.iter(|| normalize(black_box(tagged.clone())));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_blend_pathways,
    benchmark_mask_resampling,
    benchmark_orientation
);
criterion_main!(benches);

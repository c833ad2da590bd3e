use markscan::{
    rectify, CornerLabel, CornerLocator, CornerSet, ImageView, LocateConfig, MemorySource,
    OwnedImage, Point2, Rgb, SearchRegion, TemplateStore,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        for x in 0..width {
            out.push(image[row + x0 + x]);
        }
    }
    out
}

fn bench_locator(c: &mut Criterion) {
    let img_width = 640;
    let img_height = 480;
    let image = make_image(img_width, img_height);
    let image_view = ImageView::from_slice(&image, img_width, img_height).unwrap();

    let tpl_size = 40;
    let offsets = [(60, 50), (530, 55), (520, 390), (70, 380)];
    let mut source = MemorySource::new();
    for (label, (x0, y0)) in CornerLabel::ALL.into_iter().zip(offsets) {
        let patch = extract_patch(&image, img_width, x0, y0, tpl_size, tpl_size);
        source.insert(label, OwnedImage::new(patch, tpl_size, tpl_size).unwrap());
    }
    let store = TemplateStore::from_source(&source).unwrap();

    let full = CornerLocator::new(&store).unwrap();
    c.bench_function("locate_full_frame", |b| {
        b.iter(|| black_box(full.locate(image_view).unwrap()));
    });

    let quadrant = CornerLocator::new(&store).unwrap().with_config(LocateConfig {
        region: SearchRegion::Quadrant,
        ..LocateConfig::default()
    });
    c.bench_function("locate_quadrants", |b| {
        b.iter(|| black_box(quadrant.locate(image_view).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let parallel = CornerLocator::new(&store).unwrap().with_config(LocateConfig {
            parallel: true,
            ..LocateConfig::default()
        });
        c.bench_function("locate_full_frame_parallel", |b| {
            b.iter(|| black_box(parallel.locate(image_view).unwrap()));
        });
    }
}

fn bench_rectify(c: &mut Criterion) {
    let width = 1280;
    let height = 720;
    let frame: Vec<Rgb> = make_image(width, height)
        .into_iter()
        .map(|v| [v, v.wrapping_add(40), v.wrapping_add(80)])
        .collect();
    let frame = OwnedImage::new(frame, width, height).unwrap();
    let corners = CornerSet::new(
        Point2::new(180.0, 60.0),
        Point2::new(1100.0, 90.0),
        Point2::new(1040.0, 680.0),
        Point2::new(230.0, 650.0),
    );

    c.bench_function("rectify_900x1270", |b| {
        b.iter(|| black_box(rectify(frame.view(), &corners, 900, 1270).unwrap()));
    });
}

criterion_group!(benches, bench_locator, bench_rectify);
criterion_main!(benches);

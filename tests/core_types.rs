use markscan::{
    to_gray, CornerLabel, CornerSet, ImageView, OwnedImage, Point2, Raster, Rgb, ScanError,
    Stage, Template,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        ScanError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );
    assert_eq!(err.stage(), Stage::Input);
}

#[test]
fn image_view_rejects_invalid_stride_and_small_buffer() {
    let data = [0u8; 8];
    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        ScanError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );

    let err = ImageView::new(&data[..3], 2, 2, 2).err().unwrap();
    assert_eq!(err, ScanError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn strided_roi_reads_expected_pixels() {
    let data: Vec<u8> = (0u8..20).collect();
    let view = ImageView::new(&data, 4, 4, 5).unwrap();
    let roi = view.roi(1, 2, 2, 2).unwrap();
    assert_eq!(roi.width(), 2);
    assert_eq!(roi.stride(), 5);
    assert_eq!(roi.row(0).unwrap(), &[11, 12]);
    assert_eq!(roi.row(1).unwrap(), &[16, 17]);
    assert_eq!(roi.get(1, 1), Some(&17));
    assert!(roi.get(2, 0).is_none());

    let owned = roi.to_owned_image().unwrap();
    assert_eq!(owned.data(), &[11, 12, 16, 17]);

    let err = view.roi(3, 3, 2, 2).err().unwrap();
    assert!(matches!(err, ScanError::RoiOutOfBounds { .. }));
}

#[test]
fn gray_conversion_uses_bt601_weights() {
    let pixels: Vec<Rgb> = vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [90, 90, 90]];
    let frame = OwnedImage::new(pixels, 2, 2).unwrap();
    let gray = to_gray(frame.view()).unwrap();
    assert_eq!(gray.data(), &[76, 150, 29, 90]);

    let raster = Raster::from(frame);
    assert_eq!(raster.dimensions(), (2, 2));
    assert_eq!(raster.into_gray().unwrap(), gray);
}

#[test]
fn constant_template_is_degenerate() {
    let err = Template::new(CornerLabel::TopLeft, vec![42u8; 16], 4, 4)
        .err()
        .unwrap();
    assert!(matches!(err, ScanError::DegenerateTemplate { .. }));
    assert_eq!(err.stage(), Stage::Load);
}

#[test]
fn template_plan_is_zero_mean() {
    let data: Vec<u8> = (0..24u8).map(|v| v.wrapping_mul(37)).collect();
    let tpl = Template::new(CornerLabel::BottomLeft, data, 6, 4).unwrap();
    let plan = tpl.plan();
    assert_eq!((plan.width(), plan.height()), (6, 4));
    let sum: f32 = plan.t_prime().iter().sum();
    assert!(sum.abs() < 1e-3);
    assert!(plan.var_t() > 0.0);
}

#[test]
fn corner_labels_follow_canonical_order() {
    let stems: Vec<_> = CornerLabel::ALL.iter().map(|l| l.asset_stem()).collect();
    assert_eq!(stems, ["tmpl_tl", "tmpl_tr", "tmpl_br", "tmpl_bl"]);
    for (idx, label) in CornerLabel::ALL.iter().enumerate() {
        assert_eq!(label.index(), idx);
    }
    assert_eq!(CornerLabel::BottomRight.to_string(), "BR");
}

#[test]
fn ordering_check_matches_the_coarse_layout_rule() {
    let skewed = CornerSet::new(
        Point2::new(120.0, 170.0),
        Point2::new(1160.0, 170.0),
        Point2::new(1140.0, 550.0),
        Point2::new(120.0, 550.0),
    );
    assert!(skewed.is_plausibly_ordered());
    assert_eq!(skewed[CornerLabel::BottomRight], Point2::new(1140.0, 550.0));

    let rectangle = CornerSet::new(
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(0.0, 10.0),
    );
    assert!(!rectangle.is_plausibly_ordered());
}

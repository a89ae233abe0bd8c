use multimatch::lowlevel::TemplatePlan;
use multimatch::{
    BoundingBox, Detection, ImageView, MultiMatchError, ObjectCount, OwnedImage, ScoreMap,
    Template,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        MultiMatchError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        MultiMatchError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 12];

    let err = ImageView::new(&data, 2, 1, 3, 5).err().unwrap();
    assert_eq!(
        err,
        MultiMatchError::InvalidStride {
            row_len: 6,
            stride: 5,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 3];

    let err = ImageView::new(&data, 2, 2, 1, 2).err().unwrap();
    assert_eq!(err, MultiMatchError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn image_view_roi_matches_expected_values() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();
    assert_eq!(view.stride(), 4);
    assert_eq!(view.as_slice(), data.as_slice());

    let roi = view.roi(1, 1, 2, 2).unwrap();
    assert_eq!(roi.width(), 2);
    assert_eq!(roi.height(), 2);
    assert_eq!(roi.stride(), 4);
    assert_eq!(roi.row(0).unwrap(), &[5, 6]);
    assert_eq!(roi.row(1).unwrap(), &[9, 10]);

    let err = view.roi(3, 3, 2, 2).err().unwrap();
    assert_eq!(
        err,
        MultiMatchError::RoiOutOfBounds {
            x: 3,
            y: 3,
            width: 2,
            height: 2,
            img_width: 4,
            img_height: 4,
        }
    );
}

#[test]
fn interleaved_view_addresses_pixels() {
    let data: Vec<u8> = (0u8..12).collect();
    let view = ImageView::from_interleaved(&data, 2, 2, 3).unwrap();
    assert_eq!(view.channels(), 3);
    assert_eq!(view.row_len(), 6);
    assert_eq!(view.pixel(1, 0).unwrap(), &[3, 4, 5]);
    assert_eq!(view.pixel(0, 1).unwrap(), &[6, 7, 8]);
    assert!(view.pixel(2, 0).is_none());
}

#[test]
fn owned_image_copies_strided_roi() {
    let data: Vec<u8> = (0u8..20).collect();
    let view = ImageView::from_slice(&data, 5, 4).unwrap();
    let owned = OwnedImage::from_view(view.roi(1, 2, 3, 2).unwrap()).unwrap();
    assert_eq!(owned.width(), 3);
    assert_eq!(owned.height(), 2);
    assert_eq!(owned.data(), &[11, 12, 13, 16, 17, 18]);
}

#[test]
fn template_keeps_channel_layout() {
    let tpl = Template::interleaved(vec![1, 2, 3, 4, 5, 6], 2, 1, 3).unwrap();
    assert_eq!(tpl.width(), 2);
    assert_eq!(tpl.height(), 1);
    assert_eq!(tpl.channels(), 3);

    let err = Template::new(vec![0; 5], 2, 2).err().unwrap();
    assert_eq!(
        err,
        MultiMatchError::InvalidDimensions {
            width: 2,
            height: 2,
        }
    );
    let err = Template::new(vec![0; 3], 2, 2).err().unwrap();
    assert_eq!(err, MultiMatchError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn template_plan_centers_samples() {
    let tpl = Template::new(vec![10, 20, 30, 40], 2, 2).unwrap();
    let plan = TemplatePlan::from_view(tpl.view()).unwrap();
    assert_eq!(plan.len(), 4);
    assert!((plan.mean() - 25.0).abs() < 1e-6);
    assert!((plan.energy() - 500.0).abs() < 1e-9);
    assert_eq!(plan.zero_mean(), &[-15.0, -5.0, 5.0, 15.0]);
    assert!(!plan.is_flat());

    let flat = Template::new(vec![7; 9], 3, 3).unwrap();
    assert!(TemplatePlan::from_view(flat.view()).unwrap().is_flat());
}

#[test]
fn score_map_checks_buffer_length() {
    let err = ScoreMap::new(vec![0.0; 5], 3, 2).err().unwrap();
    assert_eq!(err, MultiMatchError::BufferTooSmall { needed: 6, got: 5 });

    let map = ScoreMap::from_fn(3, 2, |row, col| (row * 10 + col) as f32).unwrap();
    assert_eq!(map.get(1, 2), Some(12.0));
    assert_eq!(map.row(0).unwrap(), &[0.0, 1.0, 2.0]);
    assert!(map.get(2, 0).is_none());
    assert!(ScoreMap::single(0.3).is_single_cell());
}

#[test]
fn bounding_box_geometry() {
    let a = BoundingBox::new(2, 3, 4, 5).unwrap();
    assert_eq!(a.xywh(), (2, 3, 4, 5));
    assert_eq!(a.corners(), (2, 3, 6, 8));
    assert_eq!(a.area(), 20);

    let b = BoundingBox::new(4, 3, 4, 5).unwrap();
    assert_eq!(a.intersection_area(&b), 10);
    assert!((a.iou(&b) - 10.0 / 30.0).abs() < 1e-6);
    assert_eq!(a.iou(&b), b.iou(&a));

    assert_eq!(
        BoundingBox::new(0, 0, 0, 3).err().unwrap(),
        MultiMatchError::InvalidDimensions {
            width: 0,
            height: 3,
        }
    );
}

#[test]
fn detection_exposes_its_record() {
    let det = Detection::new(BoundingBox::new(5, 6, 7, 8).unwrap(), 0.75, 2, "screw");
    assert_eq!(det.xywh(), (5, 6, 7, 8));
    assert_eq!(det.corners(), (5, 6, 12, 14));
    assert_eq!(det.score(), 0.75);
    assert_eq!(det.template_index(), 2);
    assert_eq!(det.label(), "screw");

    let scaled = det.upscaled(0.5).unwrap();
    assert_eq!((scaled.x, scaled.y), (10.0, 12.0));
    assert_eq!((scaled.width, scaled.height), (14.0, 16.0));
    assert_eq!(scaled.label, "screw");
}

#[test]
fn object_count_rejects_zero() {
    assert_eq!(
        ObjectCount::finite(0).err().unwrap(),
        MultiMatchError::InvalidObjectCount
    );
    assert!(ObjectCount::ONE.is_single());
    assert!(!ObjectCount::finite(2).unwrap().is_single());
    assert_eq!(ObjectCount::default(), ObjectCount::Unbounded);
}

// Placement and tiling unit tests

use canvas_watermark::canvas::{DrawCall, RecordingContext};
use canvas_watermark::watermark::*;
use canvas_watermark::DecodedImage;
use image::{Rgba, RgbaImage};
use rstest::rstest;

fn centers(ctx: &RecordingContext) -> Vec<(f32, f32)> {
    ctx.paints().filter_map(DrawCall::surface_point).collect()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[rstest]
#[case("top-left", 10.0, 10.0)]
#[case("top-center", 80.0, 10.0)]
#[case("top-right", 150.0, 10.0)]
#[case("left-center", 10.0, 40.0)]
#[case("center", 80.0, 40.0)]
#[case("right-center", 150.0, 40.0)]
#[case("bottom-left", 10.0, 70.0)]
#[case("bottom-center", 80.0, 70.0)]
#[case("bottom-right", 150.0, 70.0)]
fn test_anchor_top_left_points(#[case] keyword: &str, #[case] x: f32, #[case] y: f32) {
    let point = calculate_position(
        Position::parse(keyword),
        &ContainerSize::new(200.0, 100.0),
        &BoundingBox::new(40.0, 20.0),
        Offset::new(10.0, 10.0),
    );
    assert!(close(point.x, x) && close(point.y, y), "{keyword}: {point:?}");
}

#[test]
fn test_unknown_keyword_behaves_like_offset_origin() {
    let position = Position::parse("somewhere");
    assert_eq!(position, Position::Unrecognized);

    let point = calculate_position(
        position,
        &ContainerSize::new(200.0, 100.0),
        &BoundingBox::new(40.0, 20.0),
        Offset::new(4.0, 6.0),
    );
    assert_eq!(point, PlacementPoint::new(4.0, 6.0));
}

#[test]
fn test_oversized_item_goes_negative() {
    let point = calculate_position(
        Position::Center,
        &ContainerSize::new(50.0, 50.0),
        &BoundingBox::new(90.0, 70.0),
        Offset::default(),
    );
    assert_eq!(point, PlacementPoint::new(-20.0, -10.0));
}

#[rstest]
#[case(0.0)]
#[case(-30.0)]
#[case(45.0)]
#[case(90.0)]
fn test_grid_covers_container(#[case] degrees: f32) {
    let container = ContainerSize::new(317.0, 211.0);
    let rotated = RotatedBoundingBox::from_box(&BoundingBox::new(60.0, 14.0), deg_to_rad(degrees));
    let grid = TileGrid::new(&container, &rotated, 25.0);

    assert!(grid.cols as f32 * grid.unit_width >= container.width + grid.unit_width - 1e-3);
    assert!(grid.rows as f32 * grid.unit_height >= container.height + grid.unit_height - 1e-3);
    assert_eq!(grid.iter().count(), grid.len());
}

#[test]
fn test_repeated_text_renders_one_instance_per_tile() {
    let mut ctx = RecordingContext::new();
    // 5 chars * 20px * 0.5 = 50 wide, 20 tall, unrotated
    let text = TextWatermark::new("DRAFT")
        .with_font_size(20.0)
        .repeated(30.0);
    render(
        &mut ctx,
        &ContainerSize::new(300.0, 120.0),
        PreparedWatermark::Text(&text),
    )
    .unwrap();

    // unit 80x50: ceil(300/80)+1 = 5 columns, ceil(120/50)+1 = 4 rows
    let points = centers(&ctx);
    assert_eq!(points.len(), 20);
    assert!(close(points[0].0, 25.0) && close(points[0].1, 10.0));
    assert!(close(points[4].0, 4.0 * 80.0 + 25.0));
    assert!(close(points[19].1, 3.0 * 50.0 + 10.0));
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_repeat_ignores_position_and_offset() {
    let logo = DecodedImage::new(RgbaImage::from_pixel(30, 30, Rgba([0, 0, 0, 255])));
    let plain = ImageWatermark::new("logo.png").repeated(10.0);
    let moved = ImageWatermark::new("logo.png")
        .with_position("center")
        .with_offset(33.0, 44.0)
        .repeated(10.0);

    let mut first = RecordingContext::new();
    let mut second = RecordingContext::new();
    let container = ContainerSize::new(100.0, 100.0);
    render(
        &mut first,
        &container,
        PreparedWatermark::Image {
            watermark: &plain,
            image: &logo,
        },
    )
    .unwrap();
    render(
        &mut second,
        &container,
        PreparedWatermark::Image {
            watermark: &moved,
            image: &logo,
        },
    )
    .unwrap();

    assert_eq!(centers(&first), centers(&second));
}

#[test]
fn test_image_size_falls_back_per_axis() {
    let watermark = ImageWatermark::new("logo.png").with_width(50.0);
    assert_eq!(watermark.effective_size(200, 100), (50.0, 100.0));

    let watermark = ImageWatermark::new("logo.png").with_height(50.0);
    assert_eq!(watermark.effective_size(200, 100), (200.0, 50.0));

    let watermark = ImageWatermark::new("logo.png");
    assert_eq!(watermark.effective_size(200, 100), (200.0, 100.0));
}

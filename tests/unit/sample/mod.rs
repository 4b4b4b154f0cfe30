use super::*;
use crate::foundation::core::Affine;
use crate::foundation::fixed::{Fixed, PointFixed};
use crate::foundation::error::PixcompError;
use crate::image::bits::BitsImage;
use crate::image::format::PixelFormat;
use crate::image::gradient::{Color, Gradient, GradientOptions, GradientStop, LinearGradient};

fn ramp() -> Gradient {
    Gradient::new(
        vec![
            GradientStop::new(0.0, Color::from_rgba8(255, 0, 0, 255)),
            GradientStop::new(1.0, Color::from_rgba8(0, 0, 255, 255)),
        ],
        &GradientOptions::default(),
    )
    .expect("gradient")
}

#[test]
fn scanline_origin_maps_pixel_centers() {
    let header = ImageHeader::default();
    let (p, step) = scanline_origin(&header, 2, 3);
    assert_eq!(p, Point::new(2.5, 3.5));
    assert_eq!(step, Vec2::new(1.0, 0.0));

    let img = Image::solid(0)
        .with_transform(Affine::scale(2.0))
        .expect("transform");
    let (p, step) = scanline_origin(img.header(), 0, 0);
    assert_eq!(p, Point::new(1.0, 1.0));
    assert_eq!(step, Vec2::new(2.0, 0.0));
}

#[test]
fn solid_fill_broadcasts() {
    let mut row = vec![0; 5];
    fetch_scanline(&Image::solid(0x8011_2233), 7, -4, &mut row).expect("fetch");
    assert_eq!(row, vec![0x8011_2233; 5]);
}

#[test]
fn horizontal_hint_matches_per_pixel_evaluation() {
    let img = Image::linear(LinearGradient::new(
        PointFixed::from_f64(0.0, 0.0),
        PointFixed::from_f64(0.0, 8.0),
        ramp(),
    ));
    assert_eq!(img.class(), SourceClass::Horizontal);
    for y in 0..8 {
        let mut row = vec![0; 6];
        fetch_scanline(&img, -2, y, &mut row).expect("fetch");
        for (i, &px) in row.iter().enumerate() {
            let mut single = [0u32; 1];
            fetch_kind(&img, -2 + i as i32, y, &mut single).expect("fetch");
            assert_eq!(px, single[0]);
        }
    }
}

#[test]
fn vertical_class_rows_are_identical() {
    let img = Image::linear(LinearGradient::new(
        PointFixed::from_f64(0.0, 5.0),
        PointFixed::from_f64(8.0, 5.0),
        ramp(),
    ));
    assert_eq!(img.class(), SourceClass::Vertical);
    let mut first = vec![0; 8];
    fetch_scanline(&img, 0, 0, &mut first).expect("fetch");
    for y in 1..6 {
        let mut row = vec![0; 8];
        fetch_scanline(&img, 0, y, &mut row).expect("fetch");
        assert_eq!(row, first);
    }
}

#[test]
fn alpha_map_applies_to_fetched_pixels() {
    let map = Image::bits(BitsImage::from_argb32(2, 1, &[0x8000_0000, 0xff00_0000]).expect("bits"))
        .into_ref();
    let img = Image::solid(0xffff_ffff)
        .with_alpha_map(&map, 1, 0)
        .expect("alpha map");
    let mut row = vec![0; 4];
    fetch_scanline(&img, 0, 0, &mut row).expect("fetch");
    assert_eq!(row, vec![0, 0x8080_8080, 0xffff_ffff, 0]);

    drop(map);
    fetch_scanline(&img, 0, 0, &mut row).expect("fetch");
    assert_eq!(row, vec![0xffff_ffff; 4]);
}

#[test]
fn validation_catches_missing_palettes_and_bad_kernels() {
    let indexed = Image::bits(BitsImage::alloc(PixelFormat::C8, 1, 1).expect("alloc"));
    assert!(matches!(validate(&indexed), Err(PixcompError::Contract(_))));

    let bad_kernel = Image::bits(BitsImage::alloc(PixelFormat::A8, 1, 1).expect("alloc"))
        .with_filter(Filter::Convolution, vec![Fixed::ONE]);
    assert!(matches!(validate(&bad_kernel), Err(PixcompError::Contract(_))));

    assert!(validate(&Image::solid(0)).is_ok());
}

#[test]
fn destination_validation_skips_the_unused_kernel() {
    let bad_kernel = Image::bits(BitsImage::alloc(PixelFormat::A8, 1, 1).expect("alloc"))
        .with_filter(Filter::Convolution, vec![Fixed::ONE]);
    assert!(validate_destination(&bad_kernel).is_ok());

    let indexed = Image::bits(BitsImage::alloc(PixelFormat::C8, 1, 1).expect("alloc"));
    assert!(matches!(
        validate_destination(&indexed),
        Err(PixcompError::Contract(_))
    ));
}

use super::*;
use crate::foundation::core::{alpha, blue, red};
use crate::foundation::fixed::{Fixed, PointFixed};
use crate::image::gradient::{Circle, Color, GradientOptions, GradientStop};

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

fn linear(x1: f64, x2: f64) -> LinearGradient {
    LinearGradient::new(
        PointFixed::from_f64(x1, 0.0),
        PointFixed::from_f64(x2, 0.0),
        ramp(),
    )
}

#[test]
fn repeat_policies_fold_ramp_position() {
    assert_eq!(repeat_t(-0.1, Repeat::None), None);
    assert_eq!(repeat_t(1.0, Repeat::None), Some(1.0));
    assert_eq!(repeat_t(1.5, Repeat::Pad), Some(1.0));
    assert_eq!(repeat_t(1.25, Repeat::Normal), Some(0.25));
    assert_eq!(repeat_t(-0.25, Repeat::Normal), Some(0.75));
    assert_eq!(repeat_t(1.25, Repeat::Reflect), Some(0.75));
    assert_eq!(repeat_t(-0.25, Repeat::Reflect), Some(0.25));
    assert_eq!(repeat_t(f64::NAN, Repeat::Pad), None);
}

#[test]
fn linear_ramp_is_monotone_along_its_axis() {
    let header = ImageHeader::default();
    let mut row = vec![0; 16];
    fetch_linear(&header, &linear(0.0, 16.0), 0, 0, &mut row);
    for pair in row.windows(2) {
        assert!(red(pair[1]) <= red(pair[0]));
        assert!(blue(pair[1]) >= blue(pair[0]));
    }
    assert!(row.iter().all(|&px| alpha(px) == 0xff));
    assert!(red(row[0]) > red(row[15]));
}

#[test]
fn linear_outside_range_is_transparent_without_repeat() {
    let header = ImageHeader::default();
    let mut row = vec![0xffff_ffff; 4];
    fetch_linear(&header, &linear(4.0, 8.0), 0, 0, &mut row);
    assert_eq!(row, vec![0; 4]);
}

#[test]
fn coincident_linear_endpoints_are_transparent() {
    let header = ImageHeader::default();
    let mut row = vec![0xffff_ffff; 3];
    fetch_linear(&header, &linear(2.0, 2.0), 0, 0, &mut row);
    assert_eq!(row, vec![0; 3]);
}

#[test]
fn degenerate_radial_is_transparent() {
    let header = ImageHeader::default();
    let c = Circle::from_f64(1.0, 1.0, 3.0);
    let radial = RadialGradient::new(c, c, ramp()).expect("radial");
    let mut row = vec![0xffff_ffff; 4];
    fetch_radial(&header, &radial, 0, 0, &mut row);
    assert_eq!(row, vec![0; 4]);
}

#[test]
fn radial_starts_at_first_stop_in_the_center() {
    let header = ImageHeader::default();
    let radial = RadialGradient::new(
        Circle::from_f64(0.5, 0.5, 0.0),
        Circle::from_f64(0.5, 0.5, 8.0),
        ramp(),
    )
    .expect("radial");
    let mut row = vec![0; 1];
    fetch_radial(&header, &radial, 0, 0, &mut row);
    assert_eq!(row[0], 0xffff_0000);
}

#[test]
fn conical_covers_every_pixel() {
    let header = ImageHeader::default();
    let conical = ConicalGradient::new(PointFixed::from_f64(2.0, 2.0), Fixed::ZERO, ramp());
    let mut row = vec![0; 4];
    fetch_conical(&header, &conical, 0, 0, &mut row);
    assert!(row.iter().all(|&px| alpha(px) == 0xff));
}

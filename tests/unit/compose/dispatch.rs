use super::*;
use crate::foundation::core::Affine;
use crate::image::format::PixelFormat;
use crate::image::gradient::{Color, Gradient, GradientOptions, GradientStop, LinearGradient};
use crate::image::region::Region;
use crate::foundation::fixed::PointFixed;

fn raster(width: u32, height: u32, fill: u32) -> Image {
    let pixels = vec![fill; (width * height) as usize];
    Image::bits(BitsImage::from_argb32(width, height, &pixels).expect("raster"))
}

fn pixels(image: &Image) -> Vec<u32> {
    let bits = image.as_bits().expect("bits");
    let mut out = Vec::new();
    for y in 0..bits.height() as i32 {
        for x in 0..bits.width() as i32 {
            out.push(image.pixel(x, y).expect("pixel"));
        }
    }
    out
}

fn ramp_image() -> Image {
    let gradient = Gradient::new(
        vec![
            GradientStop::new(0.0, Color::from_rgba8(255, 0, 0, 255)),
            GradientStop::new(1.0, Color::from_rgba8(0, 0, 255, 128)),
        ],
        &GradientOptions::default(),
    )
    .expect("gradient");
    Image::linear(LinearGradient {
        gradient,
        p1: PointFixed::from_f64(0.0, 0.0),
        p2: PointFixed::from_f64(16.0, 16.0),
    })
}

#[test]
fn over_half_gray_onto_opaque_black() {
    let dest = raster(4, 1, 0xff00_0000);
    let src = Image::solid(0x8080_8080);
    let req = ComposeRequest::new(Operator::Over, &src, &dest, 4, 1);
    composite(&req, &ComposeOptions::default()).expect("composite");
    assert_eq!(pixels(&dest), vec![0xff80_8080; 4]);
}

#[test]
fn fully_clipped_request_is_a_no_op() {
    let dest = raster(4, 1, 0xff11_2233);
    let src = Image::solid(0xffff_ffff);
    let req = ComposeRequest::new(Operator::Src, &src, &dest, 2, 2).with_dest_origin(10, 10);
    composite(&req, &ComposeOptions::default()).expect("clipped");
    assert_eq!(pixels(&dest), vec![0xff11_2233; 4]);
}

#[test]
fn contract_violations_leave_destination_untouched() {
    let dest = raster(2, 2, 0xff00_00ff);
    let src = Image::solid(0xffff_ffff);

    let req = ComposeRequest::new(Operator::Src, &src, &dest, 0, 2);
    let err = composite(&req, &ComposeOptions::default()).expect_err("zero width");
    assert!(matches!(err, PixcompError::Contract(_)));

    let solid_dest = Image::solid(0);
    let req = ComposeRequest::new(Operator::Src, &src, &solid_dest, 1, 1);
    let err = composite(&req, &ComposeOptions::default()).expect_err("solid dest");
    assert!(matches!(err, PixcompError::Contract(_)));

    let bad_kernel = raster(2, 2, 0).with_filter(Filter::Convolution, Vec::new());
    let req = ComposeRequest::new(Operator::Over, &bad_kernel, &dest, 2, 2);
    let err = composite(&req, &ComposeOptions::default()).expect_err("bad kernel");
    assert!(matches!(err, PixcompError::Contract(_)));

    let opts = ComposeOptions {
        parallel: true,
        threads: Some(0),
    };
    let req = ComposeRequest::new(Operator::Src, &src, &dest, 2, 2);
    let err = composite(&req, &opts).expect_err("zero threads");
    assert!(matches!(err, PixcompError::Contract(_)));

    assert_eq!(pixels(&dest), vec![0xff00_00ff; 4]);
}

#[test]
fn dst_operators_never_touch_the_destination() {
    let bits = BitsImage::alloc(PixelFormat::X8R8G8B8, 3, 1).expect("alloc");
    {
        let mut buf = bits.write().expect("lock");
        buf.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8 * 17);
    }
    let before = bits.read().expect("lock").clone();
    let dest = Image::bits(bits.clone());
    let src = Image::solid(0x8012_3456);
    for op in [Operator::Dst, Operator::DisjointDst, Operator::ConjointDst] {
        let req = ComposeRequest::new(op, &src, &dest, 3, 1);
        composite(&req, &ComposeOptions::default()).expect("dst");
    }
    assert_eq!(*bits.read().expect("lock"), before);
}

#[test]
fn clear_respects_clip_region() {
    let dest = raster(4, 2, 0xffff_ffff)
        .with_clip_region(Some(Region::from_rect(IntRect::new(1, 0, 3, 1))));
    let src = Image::solid(0xffff_ffff);
    let req = ComposeRequest::new(Operator::Clear, &src, &dest, 4, 2);
    composite(&req, &ComposeOptions::default()).expect("clear");
    assert_eq!(
        pixels(&dest),
        vec![
            0xffff_ffff, 0, 0, 0xffff_ffff, //
            0xffff_ffff, 0xffff_ffff, 0xffff_ffff, 0xffff_ffff,
        ]
    );
}

#[test]
fn src_copy_matches_general_path() {
    let src_pixels: Vec<u32> = (0..12u32).map(|i| 0xff00_0000 | i * 0x0001_0203).collect();
    let src = Image::bits(BitsImage::from_argb32(4, 3, &src_pixels).expect("src"));
    let opaque = Image::solid(0xffff_ffff);

    let fast = raster(3, 2, 0);
    let req = ComposeRequest::new(Operator::Src, &src, &fast, 2, 2)
        .with_src_origin(1, 1)
        .with_dest_origin(1, 0);
    composite(&req, &ComposeOptions::default()).expect("fast");

    let general = raster(3, 2, 0);
    let req = ComposeRequest::new(Operator::Src, &src, &general, 2, 2)
        .with_src_origin(1, 1)
        .with_dest_origin(1, 0)
        .with_mask(&opaque, 0, 0);
    composite(&req, &ComposeOptions::default()).expect("general");

    assert_eq!(pixels(&fast), pixels(&general));
    assert_eq!(fast.pixel(1, 0).expect("pixel"), src_pixels[5]);
    assert_eq!(fast.pixel(2, 1).expect("pixel"), src_pixels[10]);
    assert_eq!(fast.pixel(0, 0).expect("pixel"), 0);
}

#[test]
fn parallel_rows_match_serial_rows() {
    let src = ramp_image()
        .with_transform(Affine::rotate(0.3))
        .expect("transform");
    let serial = raster(16, 16, 0xff20_4060);
    let req = ComposeRequest::new(Operator::Over, &src, &serial, 16, 16);
    composite(&req, &ComposeOptions::default()).expect("serial");

    for threads in [None, Some(3)] {
        let opts = ComposeOptions {
            parallel: true,
            threads,
        };
        let dest = raster(16, 16, 0xff20_4060);
        let req = ComposeRequest::new(Operator::Over, &src, &dest, 16, 16);
        composite(&req, &opts).expect("parallel");
        assert_eq!(pixels(&dest), pixels(&serial));
    }
}

#[test]
fn self_composite_falls_back_to_ordered_rows() {
    let src_pixels: Vec<u32> = (0..8u32).map(|i| 0xff00_0000 | i).collect();
    let dest = Image::bits(BitsImage::from_argb32(4, 2, &src_pixels).expect("dest"));
    let alias = dest.clone();
    let req = ComposeRequest::new(Operator::Add, &alias, &dest, 4, 2);
    let opts = ComposeOptions {
        parallel: true,
        threads: None,
    };
    composite(&req, &opts).expect("self add");
    let expected: Vec<u32> = src_pixels.iter().map(|&p| 0xff00_0000 | (p & 0xff) * 2).collect();
    assert_eq!(pixels(&dest), expected);
}

#[test]
fn component_alpha_mask_scales_each_channel() {
    let dest = raster(1, 1, 0);
    let src = Image::solid(0xffff_ffff);
    let mask = Image::solid(0xff80_4000).with_component_alpha(true);
    let req = ComposeRequest::new(Operator::Over, &src, &dest, 1, 1).with_mask(&mask, 0, 0);
    composite(&req, &ComposeOptions::default()).expect("component");
    assert_eq!(dest.pixel(0, 0).expect("pixel"), 0xff80_4000);
}

#[test]
fn destination_alpha_map_receives_result_alpha() {
    let map = Image::bits(BitsImage::alloc(PixelFormat::A8, 2, 1).expect("map")).into_ref();
    let dest = Image::bits(BitsImage::alloc(PixelFormat::X8R8G8B8, 2, 1).expect("dest"))
        .with_alpha_map(&map, 0, 0)
        .expect("alpha map");
    let src = Image::solid(0x8040_2010);
    let req = ComposeRequest::new(Operator::Src, &src, &dest, 2, 1);
    composite(&req, &ComposeOptions::default()).expect("src");
    assert_eq!(map.pixel(0, 0).expect("alpha"), 0x8000_0000);
    assert_eq!(map.pixel(1, 0).expect("alpha"), 0x8000_0000);
    assert_eq!(dest.pixel(0, 0).expect("color") & 0x00ff_ffff, 0x0040_2010);
}

#[test]
fn fill_rect_clips_to_bounds_and_region() {
    let image = raster(3, 3, 0).with_clip_region(Some(Region::new([
        IntRect::new(0, 0, 2, 2),
        IntRect::new(2, 2, 3, 3),
    ])));
    fill_rect(&image, IntRect::new(1, 1, 10, 10), 0xff12_3456).expect("fill");
    assert_eq!(
        pixels(&image),
        vec![
            0, 0, 0, //
            0, 0xff12_3456, 0, //
            0, 0, 0xff12_3456,
        ]
    );
    let err = fill_rect(&Image::solid(0), IntRect::new(0, 0, 1, 1), 0).expect_err("solid");
    assert!(matches!(err, PixcompError::Contract(_)));
}

#[test]
fn dedicated_pool_rejects_zero_threads() {
    assert!(build_thread_pool(0).is_err());
    assert_eq!(build_thread_pool(2).expect("pool").current_num_threads(), 2);
}

#[test]
fn shrunk_buffers_fail_instead_of_indexing_out_of_bounds() {
    let dest = raster(4, 1, 0xff00_0000);
    let src = Image::solid(0x8080_8080);
    dest.as_bits().expect("bits").bits().write().expect("raw lock").clear();
    let req = ComposeRequest::new(Operator::Over, &src, &dest, 4, 1);
    let err = composite(&req, &ComposeOptions::default()).expect_err("empty dest buffer");
    assert!(matches!(err, PixcompError::Contract(_)));
    for op in [Operator::Clear, Operator::Src] {
        let req = ComposeRequest::new(op, &src, &dest, 4, 1);
        assert!(composite(&req, &ComposeOptions::default()).is_err(), "{op:?}");
    }

    let src_bits = raster(4, 1, 0xffff_ffff);
    let intact = raster(4, 1, 0);
    src_bits.as_bits().expect("bits").bits().write().expect("raw lock").truncate(4);
    let req = ComposeRequest::new(Operator::Src, &src_bits, &intact, 4, 1);
    let err = composite(&req, &ComposeOptions::default()).expect_err("short src buffer");
    assert!(matches!(err, PixcompError::Contract(_)));
    assert_eq!(pixels(&intact), vec![0; 4]);

    let err = fill_rect(&dest, IntRect::new(0, 0, 4, 1), 0).expect_err("fill");
    assert!(matches!(err, PixcompError::Contract(_)));
}

#[test]
fn destination_kernel_does_not_block_compositing() {
    let dest = raster(2, 1, 0xff00_0000).with_filter(Filter::Convolution, Vec::new());
    let src = Image::solid(0x8080_8080);
    let req = ComposeRequest::new(Operator::Over, &src, &dest, 2, 1);
    composite(&req, &ComposeOptions::default()).expect("dest filter is unused");
    assert_eq!(pixels(&dest), vec![0xff80_8080; 2]);

    let bad_src = raster(2, 1, 0).with_filter(Filter::Convolution, Vec::new());
    let req = ComposeRequest::new(Operator::Over, &bad_src, &dest, 2, 1);
    let err = composite(&req, &ComposeOptions::default()).expect_err("src kernel is sampled");
    assert!(matches!(err, PixcompError::Contract(_)));
}

#[test]
fn any_component_alpha_participant_selects_the_component_path() {
    let src = Image::solid(0xffff_ffff);
    let mask = Image::solid(0xff80_4000);

    let unified = raster(1, 1, 0);
    let req = ComposeRequest::new(Operator::Over, &src, &unified, 1, 1).with_mask(&mask, 0, 0);
    composite(&req, &ComposeOptions::default()).expect("unified");
    assert_eq!(unified.pixel(0, 0).expect("pixel"), 0xffff_ffff);

    let dest = raster(1, 1, 0).with_component_alpha(true);
    let req = ComposeRequest::new(Operator::Over, &src, &dest, 1, 1).with_mask(&mask, 0, 0);
    composite(&req, &ComposeOptions::default()).expect("component dest");
    assert_eq!(dest.pixel(0, 0).expect("pixel"), 0xff80_4000);

    let ca_src = Image::solid(0xffff_ffff).with_component_alpha(true);
    let dest = raster(1, 1, 0);
    let req = ComposeRequest::new(Operator::Over, &ca_src, &dest, 1, 1).with_mask(&mask, 0, 0);
    composite(&req, &ComposeOptions::default()).expect("component src");
    assert_eq!(dest.pixel(0, 0).expect("pixel"), 0xff80_4000);
}

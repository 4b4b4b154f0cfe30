use super::*;
use crate::blend::operator::{Operator, lookup};
use crate::foundation::core::pack_argb;

fn premultiplied(seed: u32, n: usize) -> Vec<u32> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (state >> 16) & 0xff
    };
    (0..n)
        .map(|_| {
            let a = next();
            let c = |v: u32| (v * a / 255) as u8;
            pack_argb(a as u8, c(next()), c(next()), c(next()))
        })
        .collect()
}

fn run(f: fn(&mut [u32], &[u32]), src: &[u32], dest: &[u32]) -> Vec<u32> {
    let mut out = dest.to_vec();
    f(&mut out, src);
    out
}

#[test]
fn over_half_white_on_black_is_mid_gray() {
    let out = run(over, &[0x8080_8080; 4], &[0xff00_0000; 4]);
    assert_eq!(out, vec![0xff80_8080; 4]);
}

#[test]
fn dst_leaves_destination_untouched() {
    let dest = premultiplied(1, 32);
    assert_eq!(run(dst, &premultiplied(2, 32), &dest), dest);
}

#[test]
fn clear_and_src_ignore_destination() {
    let src_px = premultiplied(3, 16);
    let dest = premultiplied(4, 16);
    assert_eq!(run(clear, &src_px, &dest), vec![0; 16]);
    assert_eq!(run(src, &src_px, &dest), src_px);
}

#[test]
fn in_against_opaque_destination_keeps_source() {
    let src_px = premultiplied(5, 16);
    assert_eq!(run(in_, &src_px, &[0xff12_3456; 16]), src_px);
    assert_eq!(run(out, &src_px, &[0xff12_3456; 16]), vec![0; 16]);
}

#[test]
fn xor_of_two_opaque_pixels_is_transparent() {
    assert_eq!(run(xor, &[0xff00_ff00], &[0xffff_0000]), vec![0]);
}

#[test]
fn atop_over_opaque_destination_matches_over() {
    let src_px = premultiplied(6, 32);
    let dest = vec![0xff20_4060; 32];
    assert_eq!(run(atop, &src_px, &dest), run(over, &src_px, &dest));
}

#[test]
fn add_saturates_per_channel() {
    let out = run(add, &[0x80ff_0101], &[0x8001_fe02]);
    assert_eq!(out, vec![0xffff_ff03]);
}

#[test]
fn saturate_scales_source_to_remaining_coverage() {
    let out = run(saturate, &[0xffff_ffff], &[0x8000_0000]);
    assert_eq!(out, vec![0xff7f_7f7f]);
    // Enough room left: plain add.
    let out = run(saturate, &[0x4040_4040], &[0x4000_0000]);
    assert_eq!(out, vec![0x8040_4040]);
}

#[test]
fn mask_alpha_scales_source() {
    let mut s = vec![0xffff_ffff, 0xffff_ffff, 0x8080_8080];
    combine_mask_unified(&mut s, &[0x0000_0000, 0xff00_0000, 0x8012_3456]);
    assert_eq!(s, vec![0, 0xffff_ffff, 0x4040_4040]);
}

#[test]
fn joint_part_functions_handle_zero_alpha() {
    assert_eq!(disjoint_out_part(0, 0xff), 0xff);
    assert_eq!(disjoint_in_part(0, 0xff), 0);
    assert_eq!(conjoint_out_part(0, 0), 0);
    assert_eq!(conjoint_in_part(0, 0), 0xff);
    assert_eq!(conjoint_in_part(0xff, 0x80), 0x80);
    assert_eq!(disjoint_out_part(0xff, 0x80), 0x7f);
}

#[test]
fn disjoint_over_matches_general_form_on_premultiplied_pixels() {
    let src_px = premultiplied(7, 256);
    let dest = premultiplied(8, 256);
    assert_eq!(
        run(disjoint_over, &src_px, &dest),
        run(joint::<false, PARTS_A_OVER>, &src_px, &dest)
    );
}

#[test]
fn conjoint_src_and_dst_reduce_to_plain_operators() {
    let src_px = premultiplied(9, 64);
    let dest = premultiplied(10, 64);
    assert_eq!(run(joint::<true, PARTS_A>, &src_px, &dest), src_px);
    assert_eq!(run(joint::<true, PARTS_B>, &src_px, &dest), dest);
}

#[derive(Clone, Copy, Debug)]
enum Factor {
    Zero,
    One,
    Out,
    In,
}

/// `(Fa, Fb)` of every disjoint/conjoint operator, from its Porter-Duff
/// definition.
const JOINT_FACTORS: [(Operator, Factor, Factor); 24] = {
    use Factor::*;
    [
        (Operator::DisjointClear, Zero, Zero),
        (Operator::DisjointSrc, One, Zero),
        (Operator::DisjointDst, Zero, One),
        (Operator::DisjointOver, One, Out),
        (Operator::DisjointOverReverse, Out, One),
        (Operator::DisjointIn, In, Zero),
        (Operator::DisjointInReverse, Zero, In),
        (Operator::DisjointOut, Out, Zero),
        (Operator::DisjointOutReverse, Zero, Out),
        (Operator::DisjointAtop, In, Out),
        (Operator::DisjointAtopReverse, Out, In),
        (Operator::DisjointXor, Out, Out),
        (Operator::ConjointClear, Zero, Zero),
        (Operator::ConjointSrc, One, Zero),
        (Operator::ConjointDst, Zero, One),
        (Operator::ConjointOver, One, Out),
        (Operator::ConjointOverReverse, Out, One),
        (Operator::ConjointIn, In, Zero),
        (Operator::ConjointInReverse, Zero, In),
        (Operator::ConjointOut, Out, Zero),
        (Operator::ConjointOutReverse, Zero, Out),
        (Operator::ConjointAtop, In, Out),
        (Operator::ConjointAtopReverse, Out, In),
        (Operator::ConjointXor, Out, Out),
    ]
};

/// Coverage of `a` given the other alpha `b`, on a 0..=255 scale.
fn reference_factor(factor: Factor, conjoint: bool, a: u32, b: u32) -> u32 {
    match (factor, conjoint) {
        (Factor::Zero, _) => 0,
        (Factor::One, _) => 255,
        // min(1, (1 - b) / a)
        (Factor::Out, false) => {
            if a == 0 || 255 - b >= a { 255 } else { (255 - b) * 255 / a }
        }
        // max(1 - (1 - b) / a, 0)
        (Factor::In, false) => {
            if a == 0 || 255 - b >= a { 0 } else { 255 - (255 - b) * 255 / a }
        }
        // max(1 - b / a, 0)
        (Factor::Out, true) => {
            if b >= a { 0 } else { 255 - b * 255 / a }
        }
        // min(1, b / a)
        (Factor::In, true) => {
            if b >= a { 255 } else { b * 255 / a }
        }
    }
}

fn reference_pixel(fa: Factor, fb: Factor, conjoint: bool, s: u32, d: u32) -> u32 {
    let (sa, da) = (s >> 24, d >> 24);
    let ka = reference_factor(fa, conjoint, sa, da);
    let kb = reference_factor(fb, conjoint, da, sa);
    [0, 8, 16, 24].iter().fold(0, |acc, &shift| {
        let sc = (s >> shift) & 0xff;
        let dc = (d >> shift) & 0xff;
        let v = ((sc * ka + 127) / 255 + (dc * kb + 127) / 255).min(255);
        acc | (v << shift)
    })
}

#[test]
fn joint_table_entries_match_reference_factors() {
    let mut src_px = premultiplied(31, 2000);
    let mut dest = premultiplied(32, 2000);
    for (s, d) in [
        (0, 0),
        (0, 0xff80_4020),
        (0xff80_4020, 0),
        (0xffff_ffff, 0xffff_ffff),
        (0x8040_2010, 0x7f7f_7f7f),
        (0x0101_0101, 0xfe00_fe00),
    ] {
        src_px.push(s);
        dest.push(d);
    }

    for (op, fa, fb) in JOINT_FACTORS {
        let conjoint = op.code() >= 0x20;
        let entry = lookup(op).expect("entry");
        let out = run(entry.unified, &src_px, &dest);
        for (i, (&s, &d)) in src_px.iter().zip(&dest).enumerate() {
            assert_eq!(
                out[i],
                reference_pixel(fa, fb, conjoint, s, d),
                "{op:?} s={s:08x} d={d:08x}"
            );
        }
    }
}

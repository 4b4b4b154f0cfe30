use crate::blend::unified::{
    PARTS_A, PARTS_A_ATOP, PARTS_A_OVER, PARTS_B, PARTS_B_ATOP, PARTS_B_OVER, PARTS_XOR, A_IN,
    A_OUT, B_IN, B_OUT,
};
use crate::blend::{component, unified};
use crate::foundation::error::{PixcompError, PixcompResult};

/// Combine `src` into `dest` in place; the mask is already folded into `src`.
pub type CombineUnifiedFn = fn(&mut [u32], &[u32]);

/// Combine `src` through a per-channel `mask` into `dest` in place.
pub type CombineComponentFn = fn(&mut [u32], &[u32], &[u32]);

/// Compositing operators, numbered with their protocol codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Operator {
    Clear = 0x00,
    Src = 0x01,
    Dst = 0x02,
    Over = 0x03,
    OverReverse = 0x04,
    In = 0x05,
    InReverse = 0x06,
    Out = 0x07,
    OutReverse = 0x08,
    Atop = 0x09,
    AtopReverse = 0x0a,
    Xor = 0x0b,
    Add = 0x0c,
    Saturate = 0x0d,

    DisjointClear = 0x10,
    DisjointSrc = 0x11,
    DisjointDst = 0x12,
    DisjointOver = 0x13,
    DisjointOverReverse = 0x14,
    DisjointIn = 0x15,
    DisjointInReverse = 0x16,
    DisjointOut = 0x17,
    DisjointOutReverse = 0x18,
    DisjointAtop = 0x19,
    DisjointAtopReverse = 0x1a,
    DisjointXor = 0x1b,

    ConjointClear = 0x20,
    ConjointSrc = 0x21,
    ConjointDst = 0x22,
    ConjointOver = 0x23,
    ConjointOverReverse = 0x24,
    ConjointIn = 0x25,
    ConjointInReverse = 0x26,
    ConjointOut = 0x27,
    ConjointOutReverse = 0x28,
    ConjointAtop = 0x29,
    ConjointAtopReverse = 0x2a,
    ConjointXor = 0x2b,
}

impl Operator {
    pub const ALL: [Operator; 38] = [
        Operator::Clear,
        Operator::Src,
        Operator::Dst,
        Operator::Over,
        Operator::OverReverse,
        Operator::In,
        Operator::InReverse,
        Operator::Out,
        Operator::OutReverse,
        Operator::Atop,
        Operator::AtopReverse,
        Operator::Xor,
        Operator::Add,
        Operator::Saturate,
        Operator::DisjointClear,
        Operator::DisjointSrc,
        Operator::DisjointDst,
        Operator::DisjointOver,
        Operator::DisjointOverReverse,
        Operator::DisjointIn,
        Operator::DisjointInReverse,
        Operator::DisjointOut,
        Operator::DisjointOutReverse,
        Operator::DisjointAtop,
        Operator::DisjointAtopReverse,
        Operator::DisjointXor,
        Operator::ConjointClear,
        Operator::ConjointSrc,
        Operator::ConjointDst,
        Operator::ConjointOver,
        Operator::ConjointOverReverse,
        Operator::ConjointIn,
        Operator::ConjointInReverse,
        Operator::ConjointOut,
        Operator::ConjointOutReverse,
        Operator::ConjointAtop,
        Operator::ConjointAtopReverse,
        Operator::ConjointXor,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Operator {
    type Error = PixcompError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.code() == code)
            .ok_or_else(|| PixcompError::contract(format!("unknown operator code {code:#04x}")))
    }
}

/// One row of the combine table.
#[derive(Clone, Copy)]
pub struct CombineEntry {
    pub op: Operator,
    pub unified: CombineUnifiedFn,
    pub component: CombineComponentFn,
}

impl std::fmt::Debug for CombineEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombineEntry").field("op", &self.op).finish_non_exhaustive()
    }
}

const fn entry(op: Operator, unified: CombineUnifiedFn, component: CombineComponentFn) -> CombineEntry {
    CombineEntry {
        op,
        unified,
        component,
    }
}

const DISJOINT: bool = false;
const CONJOINT: bool = true;

static COMBINE_TABLE: [CombineEntry; 38] = [
    entry(Operator::Clear, unified::clear, component::clear),
    entry(Operator::Src, unified::src, component::src),
    entry(Operator::Dst, unified::dst, component::dst),
    entry(Operator::Over, unified::over, component::over),
    entry(Operator::OverReverse, unified::over_reverse, component::over_reverse),
    entry(Operator::In, unified::in_, component::in_),
    entry(Operator::InReverse, unified::in_reverse, component::in_reverse),
    entry(Operator::Out, unified::out, component::out),
    entry(Operator::OutReverse, unified::out_reverse, component::out_reverse),
    entry(Operator::Atop, unified::atop, component::atop),
    entry(Operator::AtopReverse, unified::atop_reverse, component::atop_reverse),
    entry(Operator::Xor, unified::xor, component::xor),
    entry(Operator::Add, unified::add, component::add),
    entry(Operator::Saturate, unified::saturate, component::saturate),
    entry(Operator::DisjointClear, unified::clear, component::clear),
    entry(Operator::DisjointSrc, unified::src, component::src),
    entry(Operator::DisjointDst, unified::dst, component::dst),
    entry(
        Operator::DisjointOver,
        unified::disjoint_over,
        component::joint::<DISJOINT, PARTS_A_OVER>,
    ),
    entry(
        Operator::DisjointOverReverse,
        unified::joint::<DISJOINT, PARTS_B_OVER>,
        component::joint::<DISJOINT, PARTS_B_OVER>,
    ),
    entry(
        Operator::DisjointIn,
        unified::joint::<DISJOINT, A_IN>,
        component::joint::<DISJOINT, A_IN>,
    ),
    entry(
        Operator::DisjointInReverse,
        unified::joint::<DISJOINT, B_IN>,
        component::joint::<DISJOINT, B_IN>,
    ),
    entry(
        Operator::DisjointOut,
        unified::joint::<DISJOINT, A_OUT>,
        component::joint::<DISJOINT, A_OUT>,
    ),
    entry(
        Operator::DisjointOutReverse,
        unified::joint::<DISJOINT, B_OUT>,
        component::joint::<DISJOINT, B_OUT>,
    ),
    entry(
        Operator::DisjointAtop,
        unified::joint::<DISJOINT, PARTS_A_ATOP>,
        component::joint::<DISJOINT, PARTS_A_ATOP>,
    ),
    entry(
        Operator::DisjointAtopReverse,
        unified::joint::<DISJOINT, PARTS_B_ATOP>,
        component::joint::<DISJOINT, PARTS_B_ATOP>,
    ),
    entry(
        Operator::DisjointXor,
        unified::joint::<DISJOINT, PARTS_XOR>,
        component::joint::<DISJOINT, PARTS_XOR>,
    ),
    entry(Operator::ConjointClear, unified::clear, component::clear),
    entry(
        Operator::ConjointSrc,
        unified::joint::<CONJOINT, PARTS_A>,
        component::joint::<CONJOINT, PARTS_A>,
    ),
    entry(
        Operator::ConjointDst,
        unified::joint::<CONJOINT, PARTS_B>,
        component::joint::<CONJOINT, PARTS_B>,
    ),
    entry(
        Operator::ConjointOver,
        unified::joint::<CONJOINT, PARTS_A_OVER>,
        component::joint::<CONJOINT, PARTS_A_OVER>,
    ),
    entry(
        Operator::ConjointOverReverse,
        unified::joint::<CONJOINT, PARTS_B_OVER>,
        component::joint::<CONJOINT, PARTS_B_OVER>,
    ),
    entry(
        Operator::ConjointIn,
        unified::joint::<CONJOINT, A_IN>,
        component::joint::<CONJOINT, A_IN>,
    ),
    entry(
        Operator::ConjointInReverse,
        unified::joint::<CONJOINT, B_IN>,
        component::joint::<CONJOINT, B_IN>,
    ),
    entry(
        Operator::ConjointOut,
        unified::joint::<CONJOINT, A_OUT>,
        component::joint::<CONJOINT, A_OUT>,
    ),
    entry(
        Operator::ConjointOutReverse,
        unified::joint::<CONJOINT, B_OUT>,
        component::joint::<CONJOINT, B_OUT>,
    ),
    entry(
        Operator::ConjointAtop,
        unified::joint::<CONJOINT, PARTS_A_ATOP>,
        component::joint::<CONJOINT, PARTS_A_ATOP>,
    ),
    entry(
        Operator::ConjointAtopReverse,
        unified::joint::<CONJOINT, PARTS_B_ATOP>,
        component::joint::<CONJOINT, PARTS_B_ATOP>,
    ),
    entry(
        Operator::ConjointXor,
        unified::joint::<CONJOINT, PARTS_XOR>,
        component::joint::<CONJOINT, PARTS_XOR>,
    ),
];

/// Combine functions for `op`. Resolved once per composite call.
pub fn lookup(op: Operator) -> PixcompResult<&'static CombineEntry> {
    COMBINE_TABLE
        .iter()
        .find(|e| e.op == op)
        .ok_or_else(|| PixcompError::contract(format!("operator {op:?} has no combine entry")))
}

#[cfg(test)]
#[path = "../../tests/unit/blend/operator.rs"]
mod tests;

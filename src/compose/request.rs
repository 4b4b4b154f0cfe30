use anyhow::Context;

use crate::blend::operator::Operator;
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::image::model::Image;

/// One composite call: blend `width x height` pixels of `src` (through
/// `mask`) into `dest`. Owns nothing.
#[derive(Clone, Copy, Debug)]
pub struct ComposeRequest<'a> {
    pub op: Operator,
    pub src: &'a Image,
    /// `None` means full coverage.
    pub mask: Option<&'a Image>,
    pub dest: &'a Image,
    pub src_x: i32,
    pub src_y: i32,
    pub mask_x: i32,
    pub mask_y: i32,
    pub dest_x: i32,
    pub dest_y: i32,
    pub width: u16,
    pub height: u16,
}

impl<'a> ComposeRequest<'a> {
    /// Request with every origin at zero and no mask.
    pub fn new(op: Operator, src: &'a Image, dest: &'a Image, width: u16, height: u16) -> Self {
        Self {
            op,
            src,
            mask: None,
            dest,
            src_x: 0,
            src_y: 0,
            mask_x: 0,
            mask_y: 0,
            dest_x: 0,
            dest_y: 0,
            width,
            height,
        }
    }

    pub fn with_mask(mut self, mask: &'a Image, mask_x: i32, mask_y: i32) -> Self {
        self.mask = Some(mask);
        self.mask_x = mask_x;
        self.mask_y = mask_y;
        self
    }

    pub fn with_src_origin(mut self, x: i32, y: i32) -> Self {
        self.src_x = x;
        self.src_y = y;
        self
    }

    pub fn with_dest_origin(mut self, x: i32, y: i32) -> Self {
        self.dest_x = x;
        self.dest_y = y;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Execution options for [`crate::composite`].
pub struct ComposeOptions {
    /// Compute rows concurrently with rayon.
    pub parallel: bool,
    /// Dedicated worker count for parallel mode; `None` uses the global pool.
    pub threads: Option<usize>,
}

impl ComposeOptions {
    pub fn from_json_str(s: &str) -> PixcompResult<Self> {
        let opts: Self = serde_json::from_str(s).context("parse compose options json")?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> PixcompResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(PixcompError::contract(
                "compose option 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

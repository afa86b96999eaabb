use robic_core::ExprErrorKind;

use crate::expr::ops::BinaryOp;
use crate::expr::MAX_NESTING_DEPTH;

/// Why a frame was pushed, which decides how its value feeds the parent
/// when the level closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    /// `(` met while looking for an operand; the child value becomes the
    /// parent's operand at `)`.
    SubExpression,
    /// `&` met inside an operand name; the child name's value is converted
    /// to text and spliced into the parent name.
    Interpolation,
    /// True branch of a ternary conditional; closed by `:`.
    TernaryMiddle,
}

/// Scanning position of one nesting level inside the scratch buffer.
///
/// `unary_start..name_start` holds the staged unary markers of the operand
/// currently being read; `name_start..` holds its name, if it has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScanState {
    pub(crate) unary_start: usize,
    pub(crate) name_start: usize,
    /// Scanning a named operand.
    pub(crate) in_name: bool,
    /// The name was opened by `&` rather than `'`.
    pub(crate) amp: bool,
    /// The name is an interpolation's inner name: its value splices as text
    /// instead of resolving as an operand.
    pub(crate) splice: bool,
    /// This level is a ternary true branch awaiting its `:`.
    pub(crate) ternary_middle: bool,
}

/// Parse state saved when descending one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) kind: FrameKind,
    pub(crate) op: BinaryOp,
    pub(crate) acc: i32,
    pub(crate) scan: ScanState,
}

/// Bounded stack of frames replacing call recursion, so the nesting limit
/// is enforced uniformly for parentheses, interpolations, and ternaries.
#[derive(Debug)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub(crate) fn new() -> Self {
        Self {
            frames: Vec::with_capacity(MAX_NESTING_DEPTH),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn push(&mut self, frame: Frame) -> Result<(), ExprErrorKind> {
        if self.frames.len() >= MAX_NESTING_DEPTH {
            return Err(ExprErrorKind::StackOverflow);
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop a frame that must exist and must have been pushed for `kind`;
    /// anything else is a close with nothing to close.
    pub(crate) fn pop_kind(&mut self, kind: FrameKind) -> Result<Frame, ExprErrorKind> {
        match self.frames.pop() {
            Some(frame) if frame.kind == kind => Ok(frame),
            Some(frame) => {
                self.frames.push(frame);
                Err(ExprErrorKind::StackUnderflow)
            }
            None => Err(ExprErrorKind::StackUnderflow),
        }
    }
}

use robic_core::{ContextId, ExprError, ExprErrorKind, VariableSource, WorldVersion};

use crate::expr::frames::{Frame, FrameKind, FrameStack, ScanState};
use crate::expr::ops::BinaryOp;
use crate::expr::scan::{parse_int_literal, Cursor};
use crate::expr::scratch::Scratch;
use crate::expr::skip::{skip_expression, skip_identifier, skip_to_ternary_else};
use crate::expr::{Evaluation, Evaluator};

impl Evaluator {
    /// Evaluate `text`, whose opening parenthesis the caller has already
    /// consumed, up to and past the matching `)`.
    ///
    /// On success the returned [`Evaluation`] carries the value and the byte
    /// offset just past that `)`. On failure the [`ExprError`] offset marks
    /// where scanning stopped; it is still a valid resynchronization point
    /// for the caller's surrounding token stream.
    pub fn evaluate(
        &mut self,
        text: &str,
        vars: &mut dyn VariableSource,
        context: ContextId,
    ) -> Result<Evaluation, ExprError> {
        self.scratch.clear();
        self.frames.clear();

        let mut machine = Machine {
            cur: Cursor::new(text.as_bytes()),
            scratch: &mut self.scratch,
            frames: &mut self.frames,
            vars,
            context,
            op: BinaryOp::Add,
            acc: 0,
            scan: ScanState::default(),
            pending: None,
        };
        match machine.run() {
            Ok(value) => Ok(Evaluation {
                value,
                end: machine.cur.pos(),
            }),
            Err(kind) => Err(ExprError::new(kind, machine.cur.pos())),
        }
    }
}

/// One operand-scan step outcome that is not yet a value.
enum Begin {
    /// A literal resolved directly.
    Value(i32),
    /// A marker was staged, a name was opened, or a frame was pushed;
    /// re-enter the loop.
    Again,
}

/// Live state of one evaluation: the cursor, the storage borrowed from the
/// [`Evaluator`], and the current level's accumulator/operator/scan flags.
/// Enclosing levels live on the frame stack.
struct Machine<'a> {
    cur: Cursor<'a>,
    scratch: &'a mut Scratch,
    frames: &'a mut FrameStack,
    vars: &'a mut dyn VariableSource,
    context: ContextId,
    op: BinaryOp,
    acc: i32,
    scan: ScanState,
    /// Operand value produced by a level pop, consumed by the parent's next
    /// combine step.
    pending: Option<i32>,
}

impl Machine<'_> {
    /// The level loop: resolve one operand, fold it into the accumulator,
    /// scan one operator; pushes and pops move between nesting levels until
    /// the outermost `)` closes.
    fn run(&mut self) -> Result<i32, ExprErrorKind> {
        loop {
            let value = if let Some(value) = self.pending.take() {
                value
            } else if self.scan.in_name {
                match self.scan_name()? {
                    Some(value) => value,
                    None => continue,
                }
            } else {
                match self.begin_operand()? {
                    Begin::Value(value) => value,
                    Begin::Again => continue,
                }
            };

            self.combine(value);

            match self.next_operator()? {
                OpToken::Binary(op) => self.op = op,
                OpToken::TernaryIf => self.ternary_if()?,
                OpToken::TernaryElse => {
                    if let Some(result) = self.ternary_else()? {
                        return Ok(result);
                    }
                }
                OpToken::Close => {
                    if let Some(result) = self.close_level()? {
                        return Ok(result);
                    }
                }
            }
        }
    }

    /// Classify the next operand token. Unary prefixes are staged as marker
    /// bytes below the operand and applied once its value is known.
    fn begin_operand(&mut self) -> Result<Begin, ExprErrorKind> {
        self.cur.skip_spaces();
        let byte = self.cur.bump().ok_or(ExprErrorKind::InvalidOperand)?;
        match byte {
            b'~' | b'!' | b'-' => {
                let marker = if byte == b'-' { b'-' } else { b'~' };
                self.scratch.push(marker);
                self.scan.name_start = self.scratch.len();
                Ok(Begin::Again)
            }
            b'(' => {
                self.push_level(FrameKind::SubExpression)?;
                Ok(Begin::Again)
            }
            b'\'' => {
                self.open_name(false);
                Ok(Begin::Again)
            }
            b'&' => {
                self.open_name(true);
                Ok(Begin::Again)
            }
            b'0'..=b'9' => {
                self.cur.retreat(1);
                Ok(Begin::Value(parse_int_literal(&mut self.cur)))
            }
            _ => Err(ExprErrorKind::InvalidOperand),
        }
    }

    fn open_name(&mut self, amp: bool) {
        self.scan.in_name = true;
        self.scan.amp = amp;
        self.scan.name_start = self.scratch.len();
    }

    /// Gather a named operand. Returns the counter value when an ordinary
    /// name completes, or `None` when control moved levels (interpolation
    /// push, splice resolution) and the loop must re-enter.
    fn scan_name(&mut self) -> Result<Option<i32>, ExprErrorKind> {
        loop {
            let byte = self.cur.bump().ok_or(ExprErrorKind::InvalidOperand)?;
            match byte {
                b'\'' => {
                    if self.scan.splice {
                        // An interpolation cut short by the outer name's
                        // terminator: splice what was gathered and let the
                        // outer scan see the quote.
                        self.cur.retreat(1);
                        self.finish_splice()?;
                        return Ok(None);
                    }
                    return Ok(Some(self.resolve_name()));
                }
                b'&' => {
                    if self.scan.amp {
                        if self.scan.splice {
                            self.finish_splice()?;
                            return Ok(None);
                        }
                        return Ok(Some(self.resolve_name()));
                    }
                    if self.cur.eat(b'&') {
                        self.scratch.push(b'&');
                        continue;
                    }
                    self.push_interpolation()?;
                    return Ok(None);
                }
                b'(' => self.copy_balanced()?,
                _ => self.scratch.push(byte),
            }
        }
    }

    /// Copy a balanced `(...)` run into the name verbatim; it is name text,
    /// not arithmetic, and its content must not end the name scan.
    fn copy_balanced(&mut self) -> Result<(), ExprErrorKind> {
        self.scratch.push(b'(');
        let mut level = 1usize;
        while level > 0 {
            let byte = self.cur.bump().ok_or(ExprErrorKind::InvalidOperand)?;
            self.scratch.push(byte);
            match byte {
                b'(' => level += 1,
                b')' => level -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn resolve_name(&mut self) -> i32 {
        self.vars
            .read_counter(self.scratch.slice_from(self.scan.name_start), self.context)
    }

    /// Descend into a fresh level, saving this one.
    fn push_level(&mut self, kind: FrameKind) -> Result<(), ExprErrorKind> {
        self.frames.push(Frame {
            kind,
            op: self.op,
            acc: self.acc,
            scan: self.scan,
        })?;
        self.op = BinaryOp::Add;
        self.acc = 0;
        self.scan = ScanState {
            unary_start: self.scratch.len(),
            name_start: self.scratch.len(),
            ..ScanState::default()
        };
        Ok(())
    }

    /// Fold the resolved operand into the accumulator: apply staged unary
    /// markers innermost-first, erase this operand's scratch region, then
    /// apply the pending binary operator.
    fn combine(&mut self, value: i32) {
        let mut value = value;
        let markers = self.scan.unary_start..self.scan.name_start;
        for &marker in self.scratch.range(markers.start, markers.end).iter().rev() {
            match marker {
                b'~' => value = !value,
                b'-' => value = value.wrapping_neg(),
                _ => {}
            }
        }
        self.scratch.truncate(self.scan.unary_start);
        self.scan.name_start = self.scan.unary_start;
        self.scan.in_name = false;
        self.scan.amp = false;
        self.scan.splice = false;
        self.acc = self.op.apply(self.acc, value);
    }

    fn next_operator(&mut self) -> Result<OpToken, ExprErrorKind> {
        self.cur.skip_spaces();
        let byte = self.cur.bump().ok_or(ExprErrorKind::InvalidOperator)?;
        let token = match byte {
            b'+' => OpToken::Binary(BinaryOp::Add),
            b'-' => OpToken::Binary(BinaryOp::Sub),
            b'*' => OpToken::Binary(BinaryOp::Mul),
            b'/' => OpToken::Binary(BinaryOp::Div),
            b'%' => OpToken::Binary(BinaryOp::Mod),
            b'^' => OpToken::Binary(BinaryOp::Pow),
            b'a' => OpToken::Binary(BinaryOp::BitAnd),
            b'o' => OpToken::Binary(BinaryOp::BitOr),
            b'x' => OpToken::Binary(BinaryOp::BitXor),
            b'<' => {
                if self.cur.eat(b'<') {
                    OpToken::Binary(BinaryOp::ShiftLeft)
                } else if self.cur.eat(b'=') {
                    OpToken::Binary(BinaryOp::LessEqual)
                } else {
                    OpToken::Binary(BinaryOp::Less)
                }
            }
            b'>' => {
                if self.cur.eat(b'>') {
                    if self.cur.eat(b'>') {
                        OpToken::Binary(BinaryOp::ShiftRightArith)
                    } else {
                        OpToken::Binary(BinaryOp::ShiftRight)
                    }
                } else if self.cur.eat(b'=') {
                    OpToken::Binary(BinaryOp::GreaterEqual)
                } else {
                    OpToken::Binary(BinaryOp::Greater)
                }
            }
            b'=' => OpToken::Binary(BinaryOp::Equal),
            b'!' => {
                if self.cur.eat(b'=') {
                    OpToken::Binary(BinaryOp::NotEqual)
                } else {
                    return Err(ExprErrorKind::InvalidOperator);
                }
            }
            b'?' => OpToken::TernaryIf,
            b':' => OpToken::TernaryElse,
            b')' => OpToken::Close,
            _ => return Err(ExprErrorKind::InvalidOperator),
        };
        Ok(token)
    }

    /// `?`: on a truthy accumulator open the true branch as a new level; on
    /// a falsy one discard the true branch unevaluated and continue with the
    /// false branch at this same level.
    fn ternary_if(&mut self) -> Result<(), ExprErrorKind> {
        self.require_ternary_support()?;
        if self.acc != 0 {
            self.push_level(FrameKind::TernaryMiddle)?;
            self.scan.ternary_middle = true;
        } else {
            skip_to_ternary_else(&mut self.cur)?;
            self.op = BinaryOp::Add;
            self.acc = 0;
            self.scan = ScanState {
                unary_start: self.scratch.len(),
                name_start: self.scratch.len(),
                ternary_middle: self.scan.ternary_middle,
                ..ScanState::default()
            };
        }
        Ok(())
    }

    /// `:` closing a finished true branch: pop back to the condition's
    /// level, discard the false branch up to this level's `)`, and make the
    /// true branch's value the level's value. Nested ternary middles ended
    /// by the same scan unwind here too.
    fn ternary_else(&mut self) -> Result<Option<i32>, ExprErrorKind> {
        self.require_ternary_support()?;
        if !self.scan.ternary_middle {
            return Err(ExprErrorKind::InvalidOperator);
        }
        let value = self.acc;
        self.pop_ternary_middle()?;

        let mut ternary_level = 0usize;
        loop {
            let byte = self.cur.bump().ok_or(ExprErrorKind::InvalidOperator)?;
            match byte {
                b'?' => ternary_level += 1,
                b':' => {
                    if ternary_level == 0 {
                        if !self.scan.ternary_middle {
                            return Err(ExprErrorKind::InvalidOperator);
                        }
                        self.pop_ternary_middle()?;
                    } else {
                        ternary_level -= 1;
                    }
                }
                b'\'' | b'&' => skip_identifier(&mut self.cur, byte),
                b'(' => skip_expression(&mut self.cur),
                b')' => break,
                _ => {}
            }
        }

        self.acc = value;
        self.close_level()
    }

    fn pop_ternary_middle(&mut self) -> Result<(), ExprErrorKind> {
        let frame = self.frames.pop_kind(FrameKind::TernaryMiddle)?;
        self.op = frame.op;
        self.acc = frame.acc;
        self.scan = frame.scan;
        Ok(())
    }

    /// `)`: finish this level. With no open frame the whole expression is
    /// done; otherwise the level's value becomes the parent's operand.
    fn close_level(&mut self) -> Result<Option<i32>, ExprErrorKind> {
        if self.scan.ternary_middle {
            // A true branch ran into `)` without its `:`.
            return Err(ExprErrorKind::InvalidOperator);
        }
        let value = self.acc;
        if self.frames.is_empty() {
            return Ok(Some(value));
        }
        let frame = self.frames.pop_kind(FrameKind::SubExpression)?;
        self.op = frame.op;
        self.acc = frame.acc;
        self.scan = frame.scan;
        self.pending = Some(value);
        Ok(None)
    }

    /// Mid-name `&`: save the outer name scan and start gathering the inner
    /// name whose value will be spliced as text.
    fn push_interpolation(&mut self) -> Result<(), ExprErrorKind> {
        self.push_level(FrameKind::Interpolation)?;
        self.scan.in_name = true;
        self.scan.amp = true;
        self.scan.splice = true;
        Ok(())
    }

    /// The inner name is complete: convert its value to text, restore the
    /// outer name scan, and splice the text where the inner name began.
    fn finish_splice(&mut self) -> Result<(), ExprErrorKind> {
        let inner_start = self.scan.name_start;
        let text = crate::expr::interp::variable_text(
            self.scratch.slice_from(inner_start),
            self.vars,
            self.context,
        );
        let frame = self.frames.pop_kind(FrameKind::Interpolation)?;
        self.op = frame.op;
        self.acc = frame.acc;
        self.scan = frame.scan;
        self.scratch.truncate(inner_start);
        self.scratch.extend(&text);
        Ok(())
    }

    fn require_ternary_support(&mut self) -> Result<(), ExprErrorKind> {
        if self.vars.format_version(self.context) < WorldVersion::TERNARY {
            return Err(ExprErrorKind::InvalidOperator);
        }
        Ok(())
    }
}

enum OpToken {
    Binary(BinaryOp),
    TernaryIf,
    TernaryElse,
    Close,
}

//! Evaluation of Type 2 charstrings.
//!
//! The [`Evaluator`] is the charstring [`Handler`] for the shared
//! interpreter. It reduces the path construction operators to move, line,
//! curve and close commands for a [`CommandSink`] and tracks the advance
//! width that may prefix the first stack clearing operator.

use font_types::{BoundingBox, Fixed};

use super::{
    dict::PrivateDict,
    interpreter::{Context, Flow, Handler, Interpreter, Opcode},
    Error, Stack,
};

/// Receives the outline of a charstring.
///
/// The Type 2 path operators are reduced to absolute move, line, cubic
/// curve and close commands. Hints are reported through the optional
/// methods, which do nothing by default.
#[allow(unused_variables)]
pub trait CommandSink {
    fn move_to(&mut self, x: Fixed, y: Fixed);
    fn line_to(&mut self, x: Fixed, y: Fixed);
    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed);
    fn close(&mut self);
    /// A horizontal stem between `y0` and `y1`.
    fn hstem(&mut self, y0: Fixed, y1: Fixed) {}
    /// A vertical stem between `x0` and `x1`.
    fn vstem(&mut self, x0: Fixed, x1: Fixed) {}
    /// The stems that apply to the following path, one bit per stem.
    fn hint_mask(&mut self, mask: &[u8]) {}
    fn counter_mask(&mut self, mask: &[u8]) {}
}

/// Command sink that accumulates the control box of a path.
///
/// The start point of each contour and the control points of curves are
/// included, so the result covers the outline without being tight.
#[derive(Clone, Copy, Default, Debug)]
pub struct BoundsSink {
    current: (Fixed, Fixed),
    is_open: bool,
    bounds: Option<BoundingBox<Fixed>>,
}

impl BoundsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accumulated bounds, or `None` if nothing was drawn.
    pub fn bounds(&self) -> Option<BoundingBox<Fixed>> {
        self.bounds
    }

    fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
            let (x, y) = self.current;
            self.include(x, y);
        }
    }

    fn include(&mut self, x: Fixed, y: Fixed) {
        let bounds = self.bounds.get_or_insert(BoundingBox {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        });
        bounds.x_min = bounds.x_min.min(x);
        bounds.y_min = bounds.y_min.min(y);
        bounds.x_max = bounds.x_max.max(x);
        bounds.y_max = bounds.y_max.max(y);
    }
}

impl CommandSink for BoundsSink {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.current = (x, y);
        self.is_open = false;
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.open();
        self.include(x, y);
        self.current = (x, y);
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.open();
        self.include(cx0, cy0);
        self.include(cx1, cy1);
        self.include(x, y);
        self.current = (x, y);
    }

    fn close(&mut self) {}
}

/// Evaluates the given charstring and emits the resulting commands to the
/// specified sink.
///
/// Subroutines are resolved through the indices held by `interp`, so the
/// local subroutines of the Private DICT matching `private_dict` must be set
/// beforehand. Returns the advance width of the glyph.
pub fn evaluate<'a>(
    interp: &mut Interpreter<'a>,
    charstring_data: &'a [u8],
    private_dict: &PrivateDict,
    sink: &mut impl CommandSink,
) -> Result<Fixed, Error> {
    let mut evaluator = Evaluator::new(private_dict, sink);
    interp.run(charstring_data, &mut evaluator)?;
    // a charstring that runs out without endchar still ends the path
    evaluator.close_path();
    Ok(evaluator.width)
}

/// Transient state for evaluating a charstring.
pub struct Evaluator<'s, S> {
    sink: &'s mut S,
    is_open: bool,
    have_read_width: bool,
    stem_count: usize,
    x: Fixed,
    y: Fixed,
    nominal_width: Fixed,
    width: Fixed,
}

impl<'s, S> Evaluator<'s, S>
where
    S: CommandSink,
{
    pub fn new(private_dict: &PrivateDict, sink: &'s mut S) -> Self {
        Self {
            sink,
            is_open: false,
            have_read_width: false,
            stem_count: 0,
            x: Fixed::ZERO,
            y: Fixed::ZERO,
            nominal_width: private_dict.nominal_width_x,
            width: private_dict.default_width_x,
        }
    }

    /// The advance width, which is the default width unless the charstring
    /// carried one.
    pub fn width(&self) -> Fixed {
        self.width
    }

    /// Reads the optional width operand of the first stack clearing
    /// operator and returns the index of the first remaining operand.
    fn take_width(&mut self, stack: &Stack, has_width: bool) -> Result<usize, Error> {
        if self.have_read_width {
            return Ok(0);
        }
        self.have_read_width = true;
        if has_width {
            self.width = self.nominal_width.wrapping_add(stack.get_fixed(0)?);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    fn close_path(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.sink.close();
        }
    }

    fn move_to(&mut self, dx: Fixed, dy: Fixed) {
        self.close_path();
        self.is_open = true;
        self.x = self.x.wrapping_add(dx);
        self.y = self.y.wrapping_add(dy);
        self.sink.move_to(self.x, self.y);
    }

    fn line_to(&mut self, dx: Fixed, dy: Fixed) {
        self.x = self.x.wrapping_add(dx);
        self.y = self.y.wrapping_add(dy);
        self.sink.line_to(self.x, self.y);
    }

    /// Emits a curve given the three relative displacements of its points.
    fn curve_to(&mut self, d1: (Fixed, Fixed), d2: (Fixed, Fixed), d3: (Fixed, Fixed)) {
        let x1 = self.x.wrapping_add(d1.0);
        let y1 = self.y.wrapping_add(d1.1);
        let x2 = x1.wrapping_add(d2.0);
        let y2 = y1.wrapping_add(d2.1);
        self.x = x2.wrapping_add(d3.0);
        self.y = y2.wrapping_add(d3.1);
        self.sink.curve_to(x1, y1, x2, y2, self.x, self.y);
    }

    /// Emits the stem hints held in the operands from `first`, returning
    /// the number of stems.
    fn stems(&mut self, stack: &Stack, first: usize, is_horizontal: bool) -> Result<usize, Error> {
        let mut i = first;
        let mut u = Fixed::ZERO;
        while i + 2 <= stack.len() {
            let [du, w] = args::<2>(stack, i)?;
            u = u.wrapping_add(du);
            let v = u.wrapping_add(w);
            if is_horizontal {
                self.sink.hstem(u, v);
            } else {
                self.sink.vstem(u, v);
            }
            u = v;
            i += 2;
        }
        Ok((stack.len() - first) / 2)
    }
}

impl<'a, S> Handler<'a> for Evaluator<'_, S>
where
    S: CommandSink,
{
    fn context(&self) -> Context {
        Context::Type2Charstring
    }

    fn run(&mut self, op: Opcode, interp: &mut Interpreter<'a>) -> Result<Flow, Error> {
        let operator = Operator::new(op).ok_or_else(|| op.invalid())?;
        let stack = &interp.stack;
        let len = stack.len();
        use Operator::*;
        match operator {
            // Flex depth is ignored and both curves are always emitted.
            Flex => {
                let a = args::<12>(stack, 0)?;
                self.curve_to((a[0], a[1]), (a[2], a[3]), (a[4], a[5]));
                self.curve_to((a[6], a[7]), (a[8], a[9]), (a[10], a[11]));
            }
            HFlex => {
                let a = args::<7>(stack, 0)?;
                let zero = Fixed::ZERO;
                self.curve_to((a[0], zero), (a[1], a[2]), (a[3], zero));
                self.curve_to((a[4], zero), (a[5], zero.wrapping_sub(a[2])), (a[6], zero));
            }
            HFlex1 => {
                let a = args::<9>(stack, 0)?;
                let start_y = self.y;
                let zero = Fixed::ZERO;
                self.curve_to((a[0], a[1]), (a[2], a[3]), (a[4], zero));
                let y2 = self.y.wrapping_add(a[7]);
                self.curve_to((a[5], zero), (a[6], a[7]), (a[8], start_y.wrapping_sub(y2)));
            }
            Flex1 => {
                let a = args::<11>(stack, 0)?;
                let (start_x, start_y) = (self.x, self.y);
                let mut dx = Fixed::ZERO;
                let mut dy = Fixed::ZERO;
                for pair in a[..10].chunks_exact(2) {
                    dx = dx.wrapping_add(pair[0]);
                    dy = dy.wrapping_add(pair[1]);
                }
                self.curve_to((a[0], a[1]), (a[2], a[3]), (a[4], a[5]));
                let x2 = self.x.wrapping_add(a[6]).wrapping_add(a[8]);
                let y2 = self.y.wrapping_add(a[7]).wrapping_add(a[9]);
                // the last displacement applies to the dominant axis, the
                // other one returns to the starting point
                let last = if dx.to_bits().unsigned_abs() > dy.to_bits().unsigned_abs() {
                    (a[10], start_y.wrapping_sub(y2))
                } else {
                    (start_x.wrapping_sub(x2), a[10])
                };
                self.curve_to((a[6], a[7]), (a[8], a[9]), last);
            }
            // End the current charstring
            EndChar => {
                self.take_width(stack, len > 0)?;
                self.close_path();
                return Ok(Flow::Stop);
            }
            // Emits a sequence of stem hints
            HStem | VStem | HStemHm | VStemHm => {
                let first = self.take_width(stack, stack.len_is_odd())?;
                let is_horizontal = matches!(operator, HStem | HStemHm);
                self.stem_count += self.stems(stack, first, is_horizontal)?;
            }
            // operands before a mask are an implied vstemhm
            HintMask | CntrMask => {
                let first = self.take_width(stack, stack.len_is_odd())?;
                self.stem_count += self.stems(stack, first, false)?;
                let mask = interp.read_program_bytes(self.stem_count.div_ceil(8))?;
                if operator == HintMask {
                    self.sink.hint_mask(mask);
                } else {
                    self.sink.counter_mask(mask);
                }
            }
            // Starts a new subpath
            RMoveTo => {
                let i = self.take_width(stack, len > 2)?;
                let [dx, dy] = args::<2>(stack, i)?;
                self.move_to(dx, dy);
            }
            // Starts a new subpath by moving the current point in the
            // horizontal or vertical direction
            HMoveTo | VMoveTo => {
                let i = self.take_width(stack, len > 1)?;
                let [delta] = args::<1>(stack, i)?;
                if operator == HMoveTo {
                    self.move_to(delta, Fixed::ZERO);
                } else {
                    self.move_to(Fixed::ZERO, delta);
                }
            }
            // Emits a sequence of lines
            RLineTo => {
                let mut i = 0;
                while i + 2 <= len {
                    let [dx, dy] = args::<2>(stack, i)?;
                    self.line_to(dx, dy);
                    i += 2;
                }
            }
            // Emits a sequence of alternating horizontal and vertical
            // lines
            HLineTo | VLineTo => {
                let mut is_x = operator == HLineTo;
                for i in 0..len {
                    let [delta] = args::<1>(stack, i)?;
                    if is_x {
                        self.line_to(delta, Fixed::ZERO);
                    } else {
                        self.line_to(Fixed::ZERO, delta);
                    }
                    is_x = !is_x;
                }
            }
            // Emits curves that start and end horizontal, unless
            // the stack count is odd, in which case the first
            // curve may start with a vertical tangent
            HhCurveTo => {
                let mut i = 0;
                let mut dy1 = Fixed::ZERO;
                if stack.len_is_odd() {
                    dy1 = stack.get_fixed(0)?;
                    i += 1;
                }
                while i + 4 <= len {
                    let [dx1, dx2, dy2, dx3] = args::<4>(stack, i)?;
                    self.curve_to((dx1, dy1), (dx2, dy2), (dx3, Fixed::ZERO));
                    dy1 = Fixed::ZERO;
                    i += 4;
                }
            }
            // Emits curves that start and end vertical, unless
            // the stack count is odd, in which case the first
            // curve may start with a horizontal tangent
            VvCurveTo => {
                let mut i = 0;
                let mut dx1 = Fixed::ZERO;
                if stack.len_is_odd() {
                    dx1 = stack.get_fixed(0)?;
                    i += 1;
                }
                while i + 4 <= len {
                    let [dy1, dx2, dy2, dy3] = args::<4>(stack, i)?;
                    self.curve_to((dx1, dy1), (dx2, dy2), (Fixed::ZERO, dy3));
                    dx1 = Fixed::ZERO;
                    i += 4;
                }
            }
            // Alternates between curves with horizontal and vertical
            // tangents
            HvCurveTo | VhCurveTo => {
                // FreeType skips two leading operands of a malformed count
                let mut i = len & 2;
                let mut horizontal = operator == HvCurveTo;
                while i + 4 <= len {
                    let [a, b, c, d] = args::<4>(stack, i)?;
                    // a fifth operand on the last curve bends its end
                    let last = if len - i == 5 {
                        stack.get_fixed(i + 4)?
                    } else {
                        Fixed::ZERO
                    };
                    if horizontal {
                        self.curve_to((a, Fixed::ZERO), (b, c), (last, d));
                    } else {
                        self.curve_to((Fixed::ZERO, a), (b, c), (d, last));
                    }
                    horizontal = !horizontal;
                    i += 4;
                }
            }
            // Emits a sequence of curves possibly followed by a line
            RrCurveTo | RCurveLine => {
                let curve_limit = if operator == RCurveLine {
                    if len < 8 {
                        return Err(Error::StackUnderflow);
                    }
                    len - 2
                } else {
                    len
                };
                let mut i = 0;
                while i + 6 <= curve_limit {
                    let a = args::<6>(stack, i)?;
                    self.curve_to((a[0], a[1]), (a[2], a[3]), (a[4], a[5]));
                    i += 6;
                }
                if operator == RCurveLine {
                    let [dx, dy] = args::<2>(stack, i)?;
                    self.line_to(dx, dy);
                }
            }
            // Emits a sequence of lines followed by a curve
            RLineCurve => {
                if len < 8 {
                    return Err(Error::StackUnderflow);
                }
                let mut i = 0;
                while i + 2 <= len - 6 {
                    let [dx, dy] = args::<2>(stack, i)?;
                    self.line_to(dx, dy);
                    i += 2;
                }
                let a = args::<6>(stack, i)?;
                self.curve_to((a[0], a[1]), (a[2], a[3]), (a[4], a[5]));
            }
        }
        Ok(Flow::Continue)
    }
}

/// Reads `N` operands starting at `first`.
fn args<const N: usize>(stack: &Stack, first: usize) -> Result<[Fixed; N], Error> {
    stack
        .fixed_array::<N>(first)
        .map_err(|_| Error::StackUnderflow)
}

/// Type 2 charstring operator.
///
/// Subroutine calls and returns are executed by the interpreter and never
/// reach the evaluator.
///
/// See "Appendix A Type 2 Charstring Command Codes" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=31>
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Operator {
    HStem,
    VStem,
    VMoveTo,
    RLineTo,
    HLineTo,
    VLineTo,
    RrCurveTo,
    EndChar,
    HStemHm,
    HintMask,
    CntrMask,
    RMoveTo,
    HMoveTo,
    VStemHm,
    RCurveLine,
    RLineCurve,
    VvCurveTo,
    HhCurveTo,
    VhCurveTo,
    HvCurveTo,
    HFlex,
    Flex,
    HFlex1,
    Flex1,
}

impl Operator {
    /// Maps an opcode to a path or hint operator. Escaped opcodes follow
    /// the byte 12.
    fn new(op: Opcode) -> Option<Self> {
        use Operator::*;
        Some(match (op.is_escaped, op.value) {
            (false, 1) => HStem,
            (false, 3) => VStem,
            (false, 4) => VMoveTo,
            (false, 5) => RLineTo,
            (false, 6) => HLineTo,
            (false, 7) => VLineTo,
            (false, 8) => RrCurveTo,
            (false, 14) => EndChar,
            (false, 18) => HStemHm,
            (false, 19) => HintMask,
            (false, 20) => CntrMask,
            (false, 21) => RMoveTo,
            (false, 22) => HMoveTo,
            (false, 23) => VStemHm,
            (false, 24) => RCurveLine,
            (false, 25) => RLineCurve,
            (false, 26) => VvCurveTo,
            (false, 27) => HhCurveTo,
            (false, 30) => VhCurveTo,
            (false, 31) => HvCurveTo,
            (true, 34) => HFlex,
            (true, 35) => Flex,
            (true, 36) => HFlex1,
            (true, 37) => Flex1,
            _ => return None,
        })
    }
}

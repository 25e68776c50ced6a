//! Operand decoding and operator dispatch for DICT and charstring programs.
//!
//! DICTs and Type 2 charstrings share a byte encoding: operands are pushed
//! onto the [`Stack`] and every operator byte is handed to a [`Handler`]
//! that gives it meaning. The two contexts differ only in a handful of
//! number encodings, and in charstrings the interpreter itself executes
//! subroutine calls and clears the stack after each operator.

use font_types::Fixed;

use super::{dict, Error, Index, Stack};
use crate::{font_data::Cursor, FontData};

/// Maximum nesting depth for subroutine calls.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const NESTING_DEPTH_LIMIT: usize = 10;

// Escape opcode for accessing two byte operators
const ESCAPE: u8 = 12;
const CALLSUBR: u8 = 10;
const RETURN: u8 = 11;
const CALLGSUBR: u8 = 29;

/// The flavor of program being interpreted.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Context {
    TopDict,
    PrivateDict,
    Type2Charstring,
}

impl Context {
    fn is_dict(self) -> bool {
        matches!(self, Self::TopDict | Self::PrivateDict)
    }
}

/// A one or two byte operator.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Opcode {
    /// The operator byte; the second byte for escaped operators.
    pub value: u8,
    /// True if the operator was preceded by the escape byte 12.
    pub is_escaped: bool,
}

impl Opcode {
    pub const fn new(value: u8) -> Self {
        Self {
            value,
            is_escaped: false,
        }
    }

    pub const fn escaped(value: u8) -> Self {
        Self {
            value,
            is_escaped: true,
        }
    }

    /// The error reported when a handler does not know this operator.
    pub fn invalid(self) -> Error {
        Error::InvalidOperator(self.value, self.is_escaped)
    }
}

/// Whether the interpreter should keep going after an operator.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Stop,
}

/// Gives meaning to the operators of a program.
pub trait Handler<'a> {
    /// The context that selects the operand encoding.
    fn context(&self) -> Context;

    /// Executes a single operator.
    ///
    /// In DICT contexts the handler pops the operands it consumes; in the
    /// charstring context the interpreter clears the stack afterwards.
    fn run(&mut self, op: Opcode, interp: &mut Interpreter<'a>) -> Result<Flow, Error>;
}

/// Executes DICT and charstring programs.
///
/// A single interpreter can be reused for every program of a font; the
/// stack is cleared at the start of each [`run`](Self::run).
pub struct Interpreter<'a> {
    pub stack: Stack,
    program: Cursor<'a>,
    call_stack: [Cursor<'a>; NESTING_DEPTH_LIMIT],
    depth: usize,
    global_subrs: Index<'a>,
    local_subrs: Option<Index<'a>>,
}

impl<'a> Interpreter<'a> {
    pub fn new() -> Self {
        Self::with_subroutines(Index::default(), None)
    }

    pub fn with_subroutines(global_subrs: Index<'a>, local_subrs: Option<Index<'a>>) -> Self {
        Self {
            stack: Stack::new(),
            program: Cursor::default(),
            call_stack: Default::default(),
            depth: 0,
            global_subrs,
            local_subrs,
        }
    }

    pub fn set_local_subrs(&mut self, local_subrs: Option<Index<'a>>) {
        self.local_subrs = local_subrs;
    }

    /// Runs `program` to completion or until the handler stops it.
    pub fn run<H: Handler<'a>>(&mut self, program: &'a [u8], handler: &mut H) -> Result<(), Error> {
        let context = handler.context();
        self.stack.clear();
        self.depth = 0;
        self.program = FontData::new(program).cursor();
        loop {
            if self.program.is_empty() {
                if self.depth == 0 {
                    break;
                }
                // running off the end of a subroutine is an implicit return
                self.return_from_subroutine()?;
                continue;
            }
            let b0 = self.program.read::<u8>()?;
            match b0 {
                // See "Table 3 Operand Encoding" <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=11>
                // and "3.2 Charstring Number Encoding" <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=12>
                28 | 32..=254 => {
                    let value = dict::parse_int(&mut self.program, b0)?;
                    self.stack.push(value)?;
                }
                29 if context.is_dict() => {
                    let value = dict::parse_int(&mut self.program, b0)?;
                    self.stack.push(value)?;
                }
                30 if context.is_dict() => {
                    let value = dict::parse_real(&mut self.program)?;
                    self.stack.push(value)?;
                }
                255 if !context.is_dict() => {
                    let value = Fixed::from_bits(self.program.read::<i32>()?);
                    self.stack.push(value)?;
                }
                CALLSUBR if !context.is_dict() => self.call_subroutine(false)?,
                CALLGSUBR if !context.is_dict() => self.call_subroutine(true)?,
                RETURN if !context.is_dict() => self.return_from_subroutine()?,
                _ => {
                    let op = if b0 == ESCAPE {
                        Opcode::escaped(self.program.read::<u8>()?)
                    } else {
                        Opcode::new(b0)
                    };
                    let flow = handler.run(op, self)?;
                    if !context.is_dict() {
                        self.stack.clear();
                    }
                    if flow == Flow::Stop {
                        break;
                    }
                }
            }
        }
        self.depth = 0;
        Ok(())
    }

    /// Consumes `len` bytes from the program being executed.
    ///
    /// Used for the mask bytes that follow the hint and counter mask
    /// operators.
    pub fn read_program_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        Ok(self.program.read_bytes(len)?)
    }

    /// Current subroutine nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn call_subroutine(&mut self, is_global: bool) -> Result<(), Error> {
        let subrs = if is_global {
            self.global_subrs
        } else {
            self.local_subrs.ok_or(Error::MissingSubroutines)?
        };
        let index = self.stack.pop_i32()?;
        let biased_index = index
            .checked_add(subrs.subr_bias())
            .and_then(|ix| usize::try_from(ix).ok())
            .ok_or(Error::InvalidSubroutineIndex(index))?;
        let subr = subrs
            .get(biased_index)
            .map_err(|_| Error::InvalidSubroutineIndex(index))?;
        if self.depth >= NESTING_DEPTH_LIMIT {
            return Err(Error::CallStackOverflow);
        }
        let caller = core::mem::replace(&mut self.program, FontData::new(subr).cursor());
        self.call_stack[self.depth] = caller;
        self.depth += 1;
        Ok(())
    }

    fn return_from_subroutine(&mut self) -> Result<(), Error> {
        if self.depth == 0 {
            return Err(Error::CallStackUnderflow);
        }
        self.depth -= 1;
        self.program = core::mem::take(&mut self.call_stack[self.depth]);
        Ok(())
    }
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::postscript::{Number, MAX_STACK};
    use font_test_data::cff::{make_index, Program};

    /// Records every operator along with the operands present when it ran.
    struct Recorder {
        context: Context,
        ops: Vec<(Opcode, Vec<Number>)>,
        stop_at: Option<Opcode>,
    }

    impl Recorder {
        fn new(context: Context) -> Self {
            Self {
                context,
                ops: vec![],
                stop_at: None,
            }
        }
    }

    impl<'a> Handler<'a> for Recorder {
        fn context(&self) -> Context {
            self.context
        }

        fn run(&mut self, op: Opcode, interp: &mut Interpreter<'a>) -> Result<Flow, Error> {
            let operands = interp.stack.number_values().collect();
            self.ops.push((op, operands));
            if self.context.is_dict() {
                interp.stack.clear();
            }
            Ok(if Some(op) == self.stop_at {
                Flow::Stop
            } else {
                Flow::Continue
            })
        }
    }

    fn ints(values: &[i32]) -> Vec<Number> {
        values.iter().map(|v| Number::I32(*v)).collect()
    }

    #[test]
    fn dict_numbers_and_operators() {
        let program = Program::new()
            .int(-100)
            .int(50)
            .op(17)
            .int(100_000)
            .real(&[0xe2, 0xa2, 0x5f])
            .escaped(7)
            .build();
        let mut recorder = Recorder::new(Context::TopDict);
        Interpreter::new().run(&program, &mut recorder).unwrap();
        assert_eq!(recorder.ops.len(), 2);
        assert_eq!(recorder.ops[0], (Opcode::new(17), ints(&[-100, 50])));
        assert_eq!(
            recorder.ops[1],
            (
                Opcode::escaped(7),
                vec![Number::I32(100_000), Number::Fixed(Fixed::from_f64(-2.25))]
            )
        );
    }

    #[test]
    fn charstring_fixed_and_clear() {
        let program = Program::new()
            .int(1)
            .fixed(2.5)
            .op(5)
            .int(3)
            .op(14)
            .build();
        let mut recorder = Recorder::new(Context::Type2Charstring);
        let mut interp = Interpreter::new();
        interp.run(&program, &mut recorder).unwrap();
        assert_eq!(
            recorder.ops[0],
            (
                Opcode::new(5),
                vec![Number::I32(1), Number::Fixed(Fixed::from_f64(2.5))]
            )
        );
        // the stack is cleared between charstring operators
        assert_eq!(recorder.ops[1], (Opcode::new(14), ints(&[3])));
        assert!(interp.stack.is_empty());
    }

    #[test]
    fn stop_ends_program() {
        let program = Program::new().op(14).int(1).op(5).build();
        let mut recorder = Recorder::new(Context::Type2Charstring);
        recorder.stop_at = Some(Opcode::new(14));
        Interpreter::new().run(&program, &mut recorder).unwrap();
        assert_eq!(recorder.ops.len(), 1);
    }

    #[test]
    fn subroutines_are_inlined() {
        // local subr 0 pushes 10 and returns explicitly, global subr 0
        // pushes 20 and falls off the end
        let local = make_index(&[Program::new().int(10).op(RETURN).build()], 1);
        let global = make_index(&[Program::new().int(20).build()], 1);
        let local = Index::new(&local).unwrap();
        let global = Index::new(&global).unwrap();
        let program = Program::new()
            .int(-107)
            .op(CALLSUBR)
            .int(-107)
            .op(CALLGSUBR)
            .op(5)
            .build();
        let mut recorder = Recorder::new(Context::Type2Charstring);
        let mut interp = Interpreter::with_subroutines(global, Some(local));
        interp.run(&program, &mut recorder).unwrap();
        assert_eq!(recorder.ops, vec![(Opcode::new(5), ints(&[10, 20]))]);
        assert_eq!(interp.depth(), 0);
    }

    #[test]
    fn subroutine_errors() {
        let subrs = make_index(&[Program::new().int(1).build()], 1);
        let subrs = Index::new(&subrs).unwrap();
        let mut recorder = Recorder::new(Context::Type2Charstring);
        // no local subrs
        let program = Program::new().int(-107).op(CALLSUBR).build();
        let mut interp = Interpreter::with_subroutines(subrs, None);
        assert_eq!(
            interp.run(&program, &mut recorder),
            Err(Error::MissingSubroutines)
        );
        // index past the end
        let program = Program::new().int(-106).op(CALLGSUBR).build();
        assert_eq!(
            interp.run(&program, &mut recorder),
            Err(Error::InvalidSubroutineIndex(-106))
        );
        // return at the top level
        let program = Program::new().op(RETURN).build();
        assert_eq!(
            interp.run(&program, &mut recorder),
            Err(Error::CallStackUnderflow)
        );
    }

    #[test]
    fn recursion_is_bounded() {
        // global subr 0 calls itself forever
        let subrs = make_index(&[Program::new().int(-107).op(CALLGSUBR).build()], 1);
        let subrs = Index::new(&subrs).unwrap();
        let program = Program::new().int(-107).op(CALLGSUBR).build();
        let mut recorder = Recorder::new(Context::Type2Charstring);
        let mut interp = Interpreter::with_subroutines(subrs, None);
        assert_eq!(
            interp.run(&program, &mut recorder),
            Err(Error::CallStackOverflow)
        );
    }

    #[test]
    fn subroutine_bytes_are_plain_operators_in_dicts() {
        let program = Program::new().op(CALLSUBR).op(RETURN).build();
        let mut recorder = Recorder::new(Context::PrivateDict);
        Interpreter::new().run(&program, &mut recorder).unwrap();
        assert_eq!(recorder.ops[0].0, Opcode::new(CALLSUBR));
        assert_eq!(recorder.ops[1].0, Opcode::new(RETURN));
    }

    #[test]
    fn truncated_programs() {
        let mut recorder = Recorder::new(Context::TopDict);
        let mut interp = Interpreter::new();
        for program in [&[28u8, 1][..], &[29, 0, 0], &[247], &[ESCAPE], &[30, 0x12]] {
            assert!(matches!(
                interp.run(program, &mut recorder),
                Err(Error::Read(_))
            ));
        }
    }

    #[test]
    fn stack_overflow() {
        let mut program = Program::new();
        for _ in 0..=MAX_STACK {
            program = program.int(1);
        }
        let program = program.build();
        let mut recorder = Recorder::new(Context::TopDict);
        assert_eq!(
            Interpreter::new().run(&program, &mut recorder),
            Err(Error::StackOverflow)
        );
    }
}

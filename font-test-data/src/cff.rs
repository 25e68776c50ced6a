//! Builders and fixtures for CFF font programs.

/// Encodes the given objects as a CFF INDEX with the given offset size.
///
/// See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=12>
pub fn make_index<T: AsRef<[u8]>>(objects: &[T], off_size: u8) -> Vec<u8> {
    let mut buf = (objects.len() as u16).to_be_bytes().to_vec();
    if objects.is_empty() {
        return buf;
    }
    buf.push(off_size);
    let mut offset = 1u32;
    let mut write_offset = |buf: &mut Vec<u8>, offset: u32| {
        buf.extend_from_slice(&offset.to_be_bytes()[4 - off_size as usize..]);
    };
    write_offset(&mut buf, offset);
    for object in objects {
        offset += object.as_ref().len() as u32;
        write_offset(&mut buf, offset);
    }
    for object in objects {
        buf.extend_from_slice(object.as_ref());
    }
    buf
}

/// Encodes an INDEX using the smallest offset size that fits.
pub fn make_compact_index<T: AsRef<[u8]>>(objects: &[T]) -> Vec<u8> {
    let last_offset = 1 + objects.iter().map(|o| o.as_ref().len()).sum::<usize>();
    let off_size = match last_offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    };
    make_index(objects, off_size)
}

/// Writes DICT data or a Type 2 charstring.
#[derive(Clone, Debug, Default)]
pub struct Program(Vec<u8>);

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an integer using the shortest encoding.
    ///
    /// Values outside the 16-bit range use the 5 byte DICT encoding, which
    /// is `callgsubr` in a charstring.
    pub fn int(mut self, value: i32) -> Self {
        match value {
            -107..=107 => self.0.push((value + 139) as u8),
            108..=1131 => {
                let v = value - 108;
                self.0.extend([(v / 256 + 247) as u8, (v % 256) as u8]);
            }
            -1131..=-108 => {
                let v = -value - 108;
                self.0.extend([(v / 256 + 251) as u8, (v % 256) as u8]);
            }
            -32768..=32767 => {
                self.0.push(28);
                self.0.extend((value as i16).to_be_bytes());
            }
            _ => return self.long_int(value),
        }
        self
    }

    /// Pushes an integer with the fixed size 5 byte DICT encoding.
    pub fn long_int(mut self, value: i32) -> Self {
        self.0.push(29);
        self.0.extend(value.to_be_bytes());
        self
    }

    /// Pushes a 16.16 value with the charstring only 255 prefix.
    pub fn fixed(mut self, value: f64) -> Self {
        self.0.push(255);
        self.0.extend(((value * 65536.0).round() as i32).to_be_bytes());
        self
    }

    /// Pushes a DICT real number from its packed nibbles, which must
    /// include the terminator.
    pub fn real(mut self, nibbles: &[u8]) -> Self {
        self.0.push(30);
        self.0.extend_from_slice(nibbles);
        self
    }

    pub fn op(mut self, op: u8) -> Self {
        self.0.push(op);
        self
    }

    pub fn escaped(mut self, op: u8) -> Self {
        self.0.extend([12, op]);
        self
    }

    /// Appends bytes without interpretation, such as hint mask data.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

#[derive(Clone, Debug)]
struct FontDict {
    private_dict: Vec<u8>,
    subrs: Vec<Vec<u8>>,
}

/// Positions of the structures referenced from the Top DICT.
#[derive(Clone, Copy, Default)]
struct Layout {
    charset: usize,
    encoding: usize,
    charstrings: usize,
    private: (usize, usize),
    fd_array: usize,
    fd_select: usize,
}

/// Assembles a single font CFF font set.
///
/// Offsets in the Top DICT are computed when building. Custom strings get
/// string ids from 391 in the order they are added. Every font gets a
/// Private DICT, empty unless one is given, except for CID fonts, which
/// carry one per font DICT.
#[derive(Clone, Debug)]
pub struct CffBuilder {
    name: Vec<u8>,
    ros: Option<[i32; 3]>,
    top_dict: Vec<u8>,
    strings: Vec<Vec<u8>>,
    global_subrs: Vec<Vec<u8>>,
    glyphs: Vec<Vec<u8>>,
    charset: Option<Vec<u8>>,
    encoding: Option<Vec<u8>>,
    private_dict: Option<Vec<u8>>,
    local_subrs: Vec<Vec<u8>>,
    font_dicts: Vec<FontDict>,
    fd_select: Vec<u8>,
}

impl CffBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            ros: None,
            top_dict: Vec::new(),
            strings: Vec::new(),
            global_subrs: Vec::new(),
            glyphs: Vec::new(),
            charset: None,
            encoding: None,
            private_dict: Some(Vec::new()),
            local_subrs: Vec::new(),
            font_dicts: Vec::new(),
            fd_select: Vec::new(),
        }
    }

    /// Appends entries to the Top DICT.
    pub fn top_dict(mut self, program: Program) -> Self {
        self.top_dict.extend(program.build());
        self
    }

    /// Adds a custom string.
    pub fn string(mut self, string: &str) -> Self {
        self.strings.push(string.as_bytes().to_vec());
        self
    }

    pub fn global_subr(mut self, charstring: Vec<u8>) -> Self {
        self.global_subrs.push(charstring);
        self
    }

    pub fn glyph(mut self, charstring: Vec<u8>) -> Self {
        self.glyphs.push(charstring);
        self
    }

    /// Sets the raw data of a custom charset.
    pub fn charset(mut self, data: Vec<u8>) -> Self {
        self.charset = Some(data);
        self
    }

    /// Sets the raw data of a custom encoding.
    pub fn encoding(mut self, data: Vec<u8>) -> Self {
        self.encoding = Some(data);
        self
    }

    pub fn private_dict(mut self, program: Program) -> Self {
        self.private_dict = Some(program.build());
        self
    }

    pub fn omit_private_dict(mut self) -> Self {
        self.private_dict = None;
        self
    }

    pub fn local_subr(mut self, charstring: Vec<u8>) -> Self {
        self.local_subrs.push(charstring);
        self
    }

    /// Makes this a CID font with the given registry, ordering and
    /// supplement.
    pub fn ros(mut self, registry: i32, ordering: i32, supplement: i32) -> Self {
        self.ros = Some([registry, ordering, supplement]);
        self
    }

    /// Adds a font DICT with its Private DICT and local subroutines.
    pub fn font_dict(mut self, private_dict: Program, subrs: Vec<Vec<u8>>) -> Self {
        self.font_dicts.push(FontDict {
            private_dict: private_dict.build(),
            subrs,
        });
        self
    }

    /// Sets the raw FDSelect data.
    pub fn fd_select(mut self, data: Vec<u8>) -> Self {
        self.fd_select = data;
        self
    }

    fn is_cid(&self) -> bool {
        self.ros.is_some()
    }

    fn top_dict_data(&self, layout: &Layout) -> Vec<u8> {
        let offset = |value: usize| value as i32;
        let mut program = Program::new();
        if let Some([registry, ordering, supplement]) = self.ros {
            program = program
                .int(registry)
                .int(ordering)
                .int(supplement)
                .escaped(30);
        }
        program = program.raw(&self.top_dict);
        if self.charset.is_some() {
            program = program.long_int(offset(layout.charset)).op(15);
        }
        if self.encoding.is_some() {
            program = program.long_int(offset(layout.encoding)).op(16);
        }
        if !self.glyphs.is_empty() {
            program = program.long_int(offset(layout.charstrings)).op(17);
        }
        if self.is_cid() {
            if !self.font_dicts.is_empty() {
                program = program
                    .long_int(offset(layout.fd_array))
                    .escaped(36)
                    .long_int(offset(layout.fd_select))
                    .escaped(37);
            }
        } else if self.private_dict.is_some() {
            let (start, len) = layout.private;
            program = program
                .long_int(offset(len))
                .long_int(offset(start))
                .op(18);
        }
        program.build()
    }

    pub fn build(&self) -> Vec<u8> {
        let placeholder = self.top_dict_data(&Layout::default());
        let names = make_compact_index(&[&self.name]);
        let top_index_len = make_compact_index(&[&placeholder]).len();
        let strings = make_compact_index(&self.strings);
        let global_subrs = make_compact_index(&self.global_subrs);
        let base = 4 + names.len() + top_index_len + strings.len() + global_subrs.len();
        let mut layout = Layout::default();
        let mut tail = Vec::new();
        if let Some(charset) = &self.charset {
            layout.charset = base + tail.len();
            tail.extend_from_slice(charset);
        }
        if let Some(encoding) = &self.encoding {
            layout.encoding = base + tail.len();
            tail.extend_from_slice(encoding);
        }
        if !self.glyphs.is_empty() {
            layout.charstrings = base + tail.len();
            tail.extend(make_compact_index(&self.glyphs));
        }
        if self.is_cid() {
            if !self.font_dicts.is_empty() {
                // every font DICT holds a single 11 byte Private entry
                let fd_array_len =
                    make_compact_index(&vec![[0u8; 11]; self.font_dicts.len()]).len();
                layout.fd_array = base + tail.len();
                layout.fd_select = layout.fd_array + fd_array_len;
                let mut position = layout.fd_select + self.fd_select.len();
                let mut font_dicts = Vec::new();
                let mut privates = Vec::new();
                for font_dict in &self.font_dicts {
                    let private = private_dict_data(&font_dict.private_dict, &font_dict.subrs);
                    font_dicts.push(
                        Program::new()
                            .long_int(private.len() as i32)
                            .long_int(position as i32)
                            .op(18)
                            .build(),
                    );
                    position += private.len();
                    privates.extend(private);
                    if !font_dict.subrs.is_empty() {
                        let subrs = make_compact_index(&font_dict.subrs);
                        position += subrs.len();
                        privates.extend(subrs);
                    }
                }
                tail.extend(make_compact_index(&font_dicts));
                tail.extend_from_slice(&self.fd_select);
                tail.extend(privates);
            }
        } else if let Some(private_dict) = &self.private_dict {
            let private = private_dict_data(private_dict, &self.local_subrs);
            layout.private = (base + tail.len(), private.len());
            tail.extend(private);
            if !self.local_subrs.is_empty() {
                tail.extend(make_compact_index(&self.local_subrs));
            }
        }
        let top_dict = self.top_dict_data(&layout);
        assert_eq!(top_dict.len(), placeholder.len());
        let mut data = vec![1, 0, 4, 4];
        data.extend(names);
        data.extend(make_compact_index(&[&top_dict]));
        data.extend(strings);
        data.extend(global_subrs);
        data.extend(tail);
        data
    }
}

/// Appends a Subrs entry pointing just past the Private DICT when there are
/// local subroutines.
fn private_dict_data(entries: &[u8], subrs: &[Vec<u8>]) -> Vec<u8> {
    let mut data = entries.to_vec();
    if !subrs.is_empty() {
        // 5 byte operand + operator
        let len = data.len() + 6;
        data.extend(Program::new().long_int(len as i32).op(19).build());
    }
    data
}

/// A small subset of the Computer Modern CMR17 font, as embedded in PDF
/// files produced by TeX.
///
/// Glyphs: `.notdef`, `A`, `B` (drawn through a local subroutine) and
/// `Aring.alt` (with hints), encoded at `A`, `B` and `0xC5`.
pub fn cmr17() -> Vec<u8> {
    CffBuilder::new("YPTQCA+CMR17")
        .string("CMR17")
        .string("003.002")
        .string("Aring.alt")
        .string("Copyright (c) 1997 American Mathematical Society.")
        .top_dict(
            Program::new()
                // version, Notice, FullName, FamilyName, Weight
                .int(392)
                .op(0)
                .int(394)
                .op(1)
                .int(391)
                .op(2)
                .int(391)
                .op(3)
                .int(387)
                .op(4)
                // FontBBox
                .int(-33)
                .int(-250)
                .int(945)
                .int(749)
                .op(5),
        )
        // format 0 charset: A, B, Aring.alt
        .charset(vec![0, 0, 34, 0, 35, 0x01, 0x89])
        // format 0 encoding
        .encoding(vec![0, 3, b'A', b'B', 0xC5])
        .private_dict(
            Program::new()
                // BlueValues
                .int(-20)
                .int(20)
                .int(683)
                .int(22)
                .op(6)
                // StdHW, StdVW
                .int(33)
                .op(10)
                .int(40)
                .op(11)
                // defaultWidthX, nominalWidthX
                .int(500)
                .op(20)
                .int(666)
                .op(21),
        )
        .local_subr(Program::new().int(100).int(700).op(5).op(11).build())
        .glyph(Program::new().int(-166).op(14).build())
        .glyph(
            Program::new()
                // width and hstem
                .int(84)
                .int(0)
                .int(22)
                .op(1)
                .int(20)
                .int(0)
                .op(21)
                .int(305)
                .int(683)
                .op(5)
                .int(305)
                .int(-683)
                .op(5)
                .int(-200)
                .int(0)
                .op(5)
                .op(14)
                .build(),
        )
        .glyph(
            Program::new()
                .int(100)
                .int(50)
                .int(0)
                .op(21)
                .int(-107)
                .op(10)
                .int(200)
                .op(6)
                .int(0)
                .int(-100)
                .int(100)
                .int(0)
                .int(100)
                .int(-100)
                .op(8)
                .op(14)
                .build(),
        )
        .glyph(
            Program::new()
                .int(0)
                .int(22)
                .op(1)
                .int(300)
                .int(40)
                .op(19)
                .raw(&[0xC0])
                .int(20)
                .int(0)
                .op(21)
                .int(300)
                .op(6)
                .int(700)
                .op(7)
                .int(-150)
                .int(150)
                .int(-150)
                .int(-150)
                .op(31)
                .op(14)
                .build(),
        )
        .build()
}

/// A small CID keyed font with two font DICTs.
///
/// Glyphs 0-3 use the first font DICT (default width 1000) and glyphs 4-5
/// the second (default width 500, with local subroutines).
pub fn cid_font() -> Vec<u8> {
    let square = || {
        Program::new()
            .int(100)
            .int(100)
            .op(21)
            .int(800)
            .op(6)
            .int(800)
            .op(7)
            .int(-800)
            .op(6)
            .op(14)
            .build()
    };
    CffBuilder::new("AdobeMingStd-Light")
        .string("Adobe")
        .string("CNS1")
        .string("AdobeMingStd-Light")
        .ros(391, 392, 0)
        .top_dict(Program::new().int(393).escaped(38))
        // format 2 charset: CIDs 1-5
        .charset(vec![2, 0, 1, 0, 4])
        .glyph(Program::new().op(14).build())
        .glyph(square())
        .glyph(square())
        .glyph(square())
        .glyph(
            Program::new()
                .int(50)
                .int(0)
                .op(21)
                .int(-107)
                .op(10)
                .op(14)
                .build(),
        )
        .glyph(Program::new().op(14).build())
        .font_dict(Program::new().int(1000).op(20), vec![])
        .font_dict(
            Program::new().int(500).op(20),
            vec![Program::new().int(0).int(500).op(5).op(11).build()],
        )
        // format 3: [0, 4) -> 0, [4, 6) -> 1
        .fd_select(vec![3, 0, 2, 0, 0, 0, 0, 4, 1, 0, 6])
        .build()
}

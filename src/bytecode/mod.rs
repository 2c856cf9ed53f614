/*!

  The machine's instruction encoding. A word is four ASCII hex characters:

    Opcode:   1 character (a nibble; the operation)
    Register: 1 character (a nibble; a register index 0-F)
    Operand:  2 characters (a byte; a memory address, immediate, or jump target)

  A word occupies two adjacent byte cells in the memory image, so the loader's
  memory cursor advances by two per word. The decoded form is a closed sum type
  over the nine operations rather than one trait object per opcode: the opcode set
  is fixed, and a closed enum makes it statically enumerable and the dispatch
  exhaustive.

  One encoding asymmetry is intentional and preserved: the `JumpIfEqual` target is
  parsed as a decimal instruction-slot index while every other operand is hex.

*/

mod assembly;
mod instruction;

pub use assembly::{parse_program_text, decode_word, word_bytes, ParsedWordSyntax};
pub use instruction::{ControlEffect, Instruction, Opcode};

//! Conflict marker parsing and heuristic resolution.
//!
//! The conflict subsystem is responsible for:
//! 1. **Parsing** -- splitting text into plain lines and diff3-style conflict blocks.
//! 2. **Preprocessing** -- tab expansion, line ending fixes, splitting on `~~~~~~~`.
//! 3. **Resolution** -- trivial, indentation, and added-lines heuristics, with
//!    shared leading/trailing lines reduced out first.
//! 4. **Accounting** -- combining per-conflict text and counts in file order.
//!
//! Nothing in this module performs I/O.

pub mod model;
pub mod outcome;
pub mod parser;
pub mod preprocess;
pub mod resolver;
pub mod sides;

pub use model::{Conflict, Item, Resolution, LINE_TERMINATOR};
pub use outcome::{Outcome, ProcessedText};
pub use parser::parse;
pub use resolver::{resolve_all, resolve_parsed, resolve_text, ConflictResolver};
pub use sides::{Line, Triple};

//! Immutable strings stored as a chain of fixed-size chunks
//!
//! Every chunk but the last contributes all `CHUNK_CAPACITY` bytes. The last
//! chunk always holds the zero terminator, so a string whose length is an
//! exact multiple of the capacity ends with a chunk holding only the
//! terminator. Content bytes equal to zero therefore cut the string short.
use super::value::{Object, ObjectRef, CHUNK_CAPACITY};
use super::{Context, ExecutionError};

impl Context {
    /// Builds a string from `bytes`. Only the first chunk is protected; the
    /// rest are reachable through it.
    pub fn string(&mut self, bytes: &[u8]) -> Result<ObjectRef, ExecutionError> {
        let mut pieces = bytes.chunks(CHUNK_CAPACITY);
        let root = self.allocate(chunk(pieces.next()))?;

        let mut previous = root;
        // `chunks` never yields an empty piece, so a full final piece still
        // needs one more chunk for the terminator
        let needs_terminator = !bytes.is_empty() && bytes.len() % CHUNK_CAPACITY == 0;
        let rest = pieces.map(Some).chain(if needs_terminator {
            Some(None)
        } else {
            None
        });

        for piece in rest {
            let current = self.allocate_unprotected(chunk(piece))?;
            if let Object::String { ref mut next, .. } = *self.arena.get_mut(previous) {
                *next = Some(current);
            }
            previous = current;
        }

        Ok(root)
    }

    pub fn string_len(&self, string: ObjectRef) -> Result<usize, ExecutionError> {
        self.expect_string(string)?;
        Ok(self.chunks(string).map(|chunk| chunk.len()).sum())
    }

    /// Copies the string into `dst` followed by a zero terminator, clipping
    /// the content to `dst.len() - 1` bytes. Returns the number of content
    /// bytes written; an empty `dst` receives nothing.
    pub fn materialize(&self, string: ObjectRef, dst: &mut [u8]) -> Result<usize, ExecutionError> {
        self.expect_string(string)?;
        if dst.is_empty() {
            return Ok(0);
        }

        let room = dst.len() - 1;
        let mut written = 0;
        for chunk in self.chunks(string) {
            let n = chunk.len().min(room - written);
            dst[written..written + n].copy_from_slice(&chunk[..n]);
            written += n;
            if written == room {
                break;
            }
        }
        dst[written] = 0;
        Ok(written)
    }

    /// The content of each chunk in order
    pub fn string_chunks(&self, string: ObjectRef) -> Result<Chunks<'_>, ExecutionError> {
        self.expect_string(string)?;
        Ok(self.chunks(string))
    }

    pub(super) fn chunks(&self, string: ObjectRef) -> Chunks<'_> {
        Chunks {
            context: self,
            cursor: Some(string),
        }
    }

    fn expect_string(&self, string: ObjectRef) -> Result<(), ExecutionError> {
        match *self.arena.get(string) {
            Object::String { .. } => Ok(()),
            _ => Err(ExecutionError::ExpectedString),
        }
    }
}

fn chunk(piece: Option<&[u8]>) -> Object {
    let mut data = [0; CHUNK_CAPACITY];
    if let Some(piece) = piece {
        data[..piece.len()].copy_from_slice(piece);
    }
    Object::String { data, next: None }
}

pub struct Chunks<'a> {
    context: &'a Context,
    cursor: Option<ObjectRef>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let current = self.cursor?;
        let context = self.context;
        match *context.arena.get(current) {
            Object::String { ref data, next } => {
                self.cursor = next;
                let len = match next {
                    Some(_) => CHUNK_CAPACITY,
                    None => data.iter().position(|&b| b == 0).unwrap_or(CHUNK_CAPACITY),
                };
                Some(&data[..len])
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }
}

//! Detection of the `%n` write-back directive in printf format strings.
//!
//! `%n` stores the number of units written so far through a pointer
//! argument, the classic format-string memory-corruption vector. The scanner
//! walks each directive the way printf does (flags, width, precision, length
//! modifiers, conversion) so that `%n` hidden behind `%+010ln` is caught and
//! text such as `%%n` is not misreported.

use crate::encoding::{Encoding, until_nul};

const FLAGS: &[u8] = b"-+ 0#";
const LENGTH_MODIFIERS: &[u8] = b"hljztL";

struct Scanner<'a, E: Encoding> {
    units: &'a [E::Unit],
    pos: usize,
}

impl<'a, E: Encoding> Scanner<'a, E> {
    fn peek(&self) -> Option<u8> {
        // Non-ASCII units never match grammar bytes; they read as 0xFF.
        self.units
            .get(self.pos)
            .map(|&unit| E::to_ascii(unit).unwrap_or(0xFF))
    }

    fn skip_while(&mut self, mut accept: impl FnMut(u8) -> bool) {
        while self.peek().is_some_and(&mut accept) {
            self.pos += 1;
        }
    }

    /// `*` or a run of decimal digits.
    fn skip_count(&mut self) {
        if self.peek() == Some(b'*') {
            self.pos += 1;
        } else {
            self.skip_while(|b| b.is_ascii_digit());
        }
    }

    fn contains_write_back(mut self) -> bool {
        while let Some(byte) = self.peek() {
            self.pos += 1;
            if byte != b'%' {
                continue;
            }
            if self.peek() == Some(b'%') {
                self.pos += 1;
                continue;
            }
            self.skip_while(|b| FLAGS.contains(&b));
            self.skip_count();
            if self.peek() == Some(b'.') {
                self.pos += 1;
                self.skip_count();
            }
            self.skip_while(|b| LENGTH_MODIFIERS.contains(&b));
            match self.peek() {
                Some(b'n') => return true,
                None => return false,
                // The conversion character is consumed with the directive.
                Some(_) => self.pos += 1,
            }
        }
        false
    }
}

/// Whether `fmt` contains a write-back (`%n`) directive.
///
/// The slice is read up to its first NUL unit. A missing (`None`) format is
/// reported as safe; entry points reject it separately.
#[must_use]
pub fn has_write_back<E: Encoding>(fmt: Option<&[E::Unit]>) -> bool {
    fmt.is_some_and(|fmt| {
        Scanner::<E> {
            units: until_nul(fmt),
            pos: 0,
        }
        .contains_write_back()
    })
}

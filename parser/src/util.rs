use std::io::{ErrorKind, Read, Result};

/// Read into `buf` until it is full or the source reaches its end,
/// returning the number of bytes read.
///
/// Unlike `read_exact`, reaching the end of the source is not an error,
/// so that a clean end of input can be told apart from a truncated field.
pub fn read_up_to<S>(source: &mut S, buf: &mut [u8]) -> Result<usize>
where
    S: ?Sized + Read,
{
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

//! Element container: an owned payload around one embedded link.

use core::fmt;

use crate::error::AllocError;
use crate::{Key, Link, Linked};

/// Owned byte-string payload.
///
/// Ordering is lexicographic over the bytes, the same total order as C
/// `strcmp`: the first differing byte decides, and a proper prefix sorts
/// before the longer string.
///
/// Construction is fallible so that an insert can report an exhausted heap
/// instead of aborting.
///
/// # Example
///
/// ```
/// use nexus_ilist::Value;
///
/// let apple = Value::try_copy_from(b"apple").unwrap();
/// let app = Value::try_copy_from(b"app").unwrap();
/// assert!(app < apple);
///
/// let mut buf = [0u8; 4];
/// assert_eq!(apple.copy_into(&mut buf), 3);
/// assert_eq!(&buf, b"app\0");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(Box<[u8]>);

impl Value {
    /// Copies `bytes` into a freshly allocated buffer sized to fit.
    ///
    /// # Errors
    ///
    /// [`AllocError::Payload`] if the buffer cannot be reserved.
    pub fn try_copy_from(bytes: &[u8]) -> Result<Self, AllocError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes.len())?;
        buf.extend_from_slice(bytes);
        Ok(Self(buf.into_boxed_slice()))
    }

    /// Returns the payload bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the payload as UTF-8, if it is valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    /// Payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty payload.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies the payload into `buf` as a NUL-terminated string.
    ///
    /// Writes at most `buf.len() - 1` payload bytes followed by a `0`,
    /// truncating longer payloads. An empty `buf` is left untouched. Returns
    /// the number of payload bytes written.
    pub fn copy_into(&self, buf: &mut [u8]) -> usize {
        let Some(room) = buf.len().checked_sub(1) else {
            return 0;
        };
        let n = self.0.len().min(room);
        buf[..n].copy_from_slice(&self.0[..n]);
        buf[n] = 0;
        n
    }
}

impl TryFrom<&[u8]> for Value {
    type Error = AllocError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_copy_from(bytes)
    }
}

impl TryFrom<&str> for Value {
    type Error = AllocError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_copy_from(s.as_bytes())
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8]> for Value {
    fn eq(&self, other: &[u8]) -> bool {
        *self.0 == *other
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        *self.0 == *other.as_bytes()
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        *self.0 == *other.as_bytes()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&String::from_utf8_lossy(&self.0), f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A queue element: one owned [`Value`] and one embedded [`Link`].
///
/// Elements live in storage while queued. Removing one from a queue hands
/// it to the caller by value; dropping it releases the payload.
#[derive(Debug)]
pub struct Element<K: Key = u32> {
    value: Value,
    link: Link<K>,
}

impl<K: Key> Element<K> {
    /// Wraps `value` in an unlinked element.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            link: Link::new(),
        }
    }

    /// Returns the payload.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the element, returning its payload.
    #[inline]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Copies the payload into `buf`; see [`Value::copy_into`].
    #[inline]
    pub fn copy_into(&self, buf: &mut [u8]) -> usize {
        self.value.copy_into(buf)
    }
}

impl<K: Key> Linked<K> for Element<K> {
    #[inline]
    fn link(&self) -> &Link<K> {
        &self.link
    }

    #[inline]
    fn link_mut(&mut self) -> &mut Link<K> {
        &mut self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(s: &str) -> Value {
        Value::try_from(s).unwrap()
    }

    #[test]
    fn ordering_matches_strcmp() {
        assert!(value("a") < value("b"));
        assert!(value("ab") < value("b"));
        assert!(value("") < value("a"));
        assert!(value("abc") > value("ab"));
        assert_eq!(value("same"), value("same"));
        assert!(value("Z") < value("a"));
    }

    #[test]
    fn copy_into_truncates_and_terminates() {
        let v = value("hello");

        let mut exact = [0xffu8; 6];
        assert_eq!(v.copy_into(&mut exact), 5);
        assert_eq!(&exact, b"hello\0");

        let mut short = [0xffu8; 3];
        assert_eq!(v.copy_into(&mut short), 2);
        assert_eq!(&short, b"he\0");

        let mut roomy = [0xffu8; 8];
        assert_eq!(v.copy_into(&mut roomy), 5);
        assert_eq!(&roomy[..6], b"hello\0");
        assert_eq!(roomy[6], 0xff);
    }

    #[test]
    fn copy_into_empty_buffer_writes_nothing() {
        let mut buf: [u8; 0] = [];
        assert_eq!(value("x").copy_into(&mut buf), 0);

        let mut one = [0xffu8; 1];
        assert_eq!(value("x").copy_into(&mut one), 0);
        assert_eq!(one, [0]);
    }

    #[test]
    fn payload_is_an_owned_copy() {
        let mut source = b"abc".to_vec();
        let v = Value::try_copy_from(&source).unwrap();
        source[0] = b'z';

        assert_eq!(v, "abc");
        assert_eq!(v.len(), 3);
        assert_eq!(v.as_str(), Some("abc"));
    }

    #[test]
    fn non_utf8_payload() {
        let v = Value::try_copy_from(&[0xff, 0xfe]).unwrap();
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_bytes(), &[0xff, 0xfe]);
        assert_eq!(format!("{v}"), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn element_starts_unlinked() {
        let e: Element<u32> = Element::new(value("x"));
        assert!(e.link().prev().is_none());
        assert!(e.link().next().is_none());
        assert_eq!(e.into_value(), "x");
    }
}

//! Key trait for arena indices.
//!
//! Every node in a queue is addressed by a [`Key`] into its storage. One
//! value per key type, [`Key::NONE`], is reserved: inside a [`Link`] it
//! addresses the sentinel of the list the node belongs to, and as a queue
//! handle it is the null handle.
//!
//! [`Link`]: crate::Link

/// Copyable index type with a reserved sentinel value.
///
/// Implemented for the unsigned integer types. Storage never hands out
/// `NONE` as a live key, so a link holding `NONE` can only mean "the
/// sentinel".
///
/// # Example
///
/// ```
/// use nexus_ilist::Key;
///
/// let key: u32 = 7;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u32::from_usize(7), key);
/// ```
pub trait Key: Copy + Eq + core::fmt::Debug + 'static {
    /// Reserved value addressing the sentinel / the null handle.
    const NONE: Self;

    /// Creates a key from a slot position.
    fn from_usize(val: usize) -> Self;

    /// Returns the slot position this key addresses.
    fn as_usize(&self) -> usize;

    /// Returns `true` if this is the reserved value.
    #[inline]
    fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Returns `true` if this addresses a real slot.
    #[inline]
    fn is_some(&self) -> bool {
        !self.is_none()
    }
}

macro_rules! impl_key_for_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }

                #[inline]
                fn as_usize(&self) -> usize {
                    *self as usize
                }
            }
        )*
    };
}

impl_key_for_unsigned!(u16, u32, u64, usize);

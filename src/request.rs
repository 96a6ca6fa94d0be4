//! Cache requests.

use crate::object::ObjId;

/// A single request replayed against a cache: which object, and how large it is.
///
/// # Examples
///
/// ```
/// use sieve_size::Request;
///
/// let req = Request::new(7, 4096);
/// assert_eq!(req.id, 7);
/// assert_eq!(req.size, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Request {
    /// Identifier of the requested object.
    pub id: ObjId,
    /// Size of the requested object in bytes.
    pub size: u64,
}

impl Request {
    /// Creates a request for object `id` of `size` bytes.
    #[inline]
    pub fn new(id: ObjId, size: u64) -> Self {
        Self { id, size }
    }
}

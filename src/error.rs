use crate::TypeKey;

/// Error returned by accessors when the requested type is not the one stored.
///
/// Also returned when nothing is stored at all,
/// in which case `found` is [`TypeKey::NONE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("type mismatch: expected `{expected}`, found `{found}`")]
pub struct TypeMismatch {
    /// Type that was requested.
    pub expected: TypeKey,
    /// Type that is actually stored.
    pub found: TypeKey,
}

impl TypeMismatch {
    #[inline]
    pub(crate) fn new<T: 'static>(found: TypeKey) -> Self {
        TypeMismatch {
            expected: TypeKey::of::<T>(),
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_message() {
        let err = TypeMismatch::new::<u32>(TypeKey::NONE);
        assert_eq!(err.to_string(), "type mismatch: expected `u32`, found `<none>`");

        let err = TypeMismatch::new::<u8>(TypeKey::of::<i64>());
        assert_eq!(err.expected, TypeKey::of::<u8>());
        assert_eq!(err.found, TypeKey::of::<i64>());
    }
}

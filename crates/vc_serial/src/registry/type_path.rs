use alloc::string::String;

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// Provides a stable alternative to [`core::any::type_name`], and the
/// inputs of registry name generation.
///
/// # Methods
///
/// - [`type_path`]: The unique identifier of the type, cannot be duplicated.
/// - [`type_ident`]: The type name without module path.
/// - [`module_path`]: Module path, `None` for primitives and other types
///   that can't be named by module.
/// - [`is_exported`]: Whether the type is visible outside its crate.
///
/// We guarantee that these names do not have the prefix `::`.
/// Users should also ensure this when manually implementing it.
///
/// # Implementation
///
/// ```
/// use vc_serial::TypePath;
/// use vc_serial::derive::TypePath;
///
/// #[derive(TypePath)]
/// pub struct Foo;
///
/// assert_eq!(Foo::type_ident(), "Foo");
/// assert!(Foo::type_path().ends_with("::Foo"));
/// assert!(Foo::is_exported());
/// ```
///
/// [`type_path`]: TypePath::type_path
/// [`type_ident`]: TypePath::type_ident
/// [`module_path`]: TypePath::module_path
/// [`is_exported`]: TypePath::is_exported
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the underlying type.
    ///
    /// For `Alpha` declared in `vc_serial::testing`, this is `"vc_serial::testing::Alpha"`.
    fn type_path() -> &'static str;

    /// Returns the name of the type without its module path.
    fn type_ident() -> &'static str;

    /// Returns the path to the module the type is in, or [`None`] if it is anonymous.
    fn module_path() -> Option<&'static str>;

    /// Returns `false` if the type is not declared `pub`.
    #[inline]
    fn is_exported() -> bool {
        true
    }
}

macro_rules! impl_primitive_type_path {
    ($($ty:ident),* $(,)?) => {
        $(
            impl TypePath for $ty {
                #[inline]
                fn type_path() -> &'static str {
                    stringify!($ty)
                }

                #[inline]
                fn type_ident() -> &'static str {
                    stringify!($ty)
                }

                #[inline]
                fn module_path() -> Option<&'static str> {
                    None
                }
            }
        )*
    };
}

impl_primitive_type_path!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl TypePath for String {
    #[inline]
    fn type_path() -> &'static str {
        "alloc::string::String"
    }

    #[inline]
    fn type_ident() -> &'static str {
        "String"
    }

    #[inline]
    fn module_path() -> Option<&'static str> {
        Some("alloc::string")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypePath;
    use crate::derive::TypePath;

    #[derive(TypePath)]
    pub struct Exported;

    #[derive(TypePath)]
    #[allow(dead_code, reason = "only the path is used")]
    struct Hidden;

    #[test]
    fn derived_paths() {
        assert_eq!(Exported::type_path(), "vc_serial::registry::type_path::tests::Exported");
        assert_eq!(Exported::module_path(), Some("vc_serial::registry::type_path::tests"));
        assert_eq!(Exported::type_ident(), "Exported");
        assert!(Exported::is_exported());
        assert!(!Hidden::is_exported());
    }

    #[test]
    fn primitive_paths() {
        assert_eq!(i32::type_path(), "i32");
        assert_eq!(i32::module_path(), None);
        assert_eq!(String::module_path(), Some("alloc::string"));
    }
}

/// Declares a struct together with its [`Reflect`] implementation.
///
/// Fields are rendered in declaration order. A field counts as exported only
/// if it is declared plain `pub`; anything narrower is treated as private,
/// which decides whether the renderer may invoke custom representations on
/// it without widening.
///
/// Two shapes are supported: structs with named fields, and newtypes, which
/// render like the value they wrap. Generic structs are not supported; write
/// the [`Reflect`] impl by hand for those.
///
/// A custom textual representation is declared with a trailing
/// `repr = <kind>;`, where `<kind>` is one of:
///
/// - `display`: the type's [`Display`] impl, invoked on the value
/// - `error`: the type's [`Error`] impl, invoked on the value
/// - `pointer_display`: the [`Display`] impl, only reachable through a
///   pointer to the value
/// - `pointer_error`: the [`Error`] impl, only reachable through a pointer to
///   the value
///
/// [`Reflect`]: crate::Reflect
/// [`Display`]: core::fmt::Display
/// [`Error`]: core::error::Error
///
/// # Examples
///
/// ```
/// deepdump::reflect! {
///     #[derive(Clone)]
///     pub struct Account {
///         pub name: String,
///         balance: i64,
///     }
/// }
///
/// let account = Account {
///     name: String::from("ada"),
///     balance: -5,
/// };
/// assert_eq!(
///     deepdump::render(&account),
///     "(Account) {\n name: (String) (len=3) \"ada\",\n balance: (i64) -5\n}"
/// );
/// ```
///
/// A newtype with a representation of its own:
///
/// ```
/// use core::fmt;
///
/// deepdump::reflect! {
///     struct Celsius(pub f64);
///     repr = display;
/// }
///
/// impl fmt::Display for Celsius {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}°C", self.0)
///     }
/// }
///
/// assert_eq!(deepdump::render(&Celsius(21.5)), "(Celsius) 21.5°C");
/// ```
#[macro_export]
macro_rules! reflect {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field:ident : $field_ty:ty
            ),* $(,)?
        }
        $(repr = $repr:ident ;)?
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $(#[$field_attr])*
                $field_vis $field : $field_ty
            ),*
        }

        impl $crate::Reflect for $name {
            fn reflect(&self) -> $crate::Kind<'_> {
                $crate::Kind::Struct($crate::StructView::new($crate::__private::vec![
                    $(
                        $crate::Field::new(
                            ::core::stringify!($field),
                            &self.$field,
                            $crate::__private::is_exported(::core::stringify!($field_vis)),
                        )
                    ),*
                ]))
            }

            $($crate::__reflect_repr!($repr);)?
        }
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident (
            $(#[$field_attr:meta])*
            $field_vis:vis $inner:ty $(,)?
        );
        $(repr = $repr:ident ;)?
    ) => {
        $(#[$attr])*
        $vis struct $name($(#[$field_attr])* $field_vis $inner);

        impl $crate::Reflect for $name {
            fn reflect(&self) -> $crate::Kind<'_> {
                $crate::Reflect::reflect(&self.0)
            }

            $($crate::__reflect_repr!($repr);)?
        }
    };
}

// Not public API. Referenced by `reflect!`.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_repr {
    (display) => {
        $crate::__reflect_repr!(@impl Value, Display);
    };
    (error) => {
        $crate::__reflect_repr!(@impl Value, Error);
    };
    (pointer_display) => {
        $crate::__reflect_repr!(@impl Pointer, Display);
    };
    (pointer_error) => {
        $crate::__reflect_repr!(@impl Pointer, Error);
    };
    (@impl $receiver:ident, $method:ident) => {
        fn method(
            &self,
        ) -> ::core::option::Option<($crate::Receiver, $crate::Method<'_>)> {
            ::core::option::Option::Some(($crate::Receiver::$receiver, $crate::Method::$method(self)))
        }
    };
}

/// Emits a `tracing` event when the `tracing` feature is enabled, and expands
/// to nothing otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

/// Emits a `tracing` event when the `tracing` feature is enabled, and expands
/// to nothing otherwise.
#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {};
}

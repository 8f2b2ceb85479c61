//! The reflection model the renderer traverses.
//!
//! Rust has no runtime reflection, so a type describes itself by implementing
//! [`Reflect`]: it returns a [`Kind`] view of its current value, a closed
//! variant over the kinds the renderer knows how to format. Composite views
//! ([`Seq`], [`StructView`], [`MapView`], [`Pointer`]) hand out their
//! children as `&dyn Reflect`, which is what lets the renderer descend into
//! values whose concrete types it never sees.
//!
//! Implementations are provided for primitives, strings, sequences, maps,
//! smart pointers, trait objects, function pointers, raw pointers and
//! channels. User structs are best covered with the [`reflect!`] macro,
//! which also records which fields are `pub`.
//!
//! [`reflect!`]: crate::reflect!

mod impls;

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use deepdump_internals::RawHandle;

/// A value on its way through the renderer, with the capabilities it was
/// reached with.
pub type Handle<'a> = RawHandle<'a, dyn Reflect + 'a>;

/// A type whose values the renderer can traverse.
///
/// # Examples
///
/// A newtype that renders like a string and offers its own representation,
/// but only through a pointer receiver:
///
/// ```
/// use core::fmt;
///
/// use deepdump::{Kind, Method, Receiver, Reflect};
///
/// struct Label(String);
///
/// impl fmt::Display for Label {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "label {}", self.0)
///     }
/// }
///
/// impl Reflect for Label {
///     fn reflect(&self) -> Kind<'_> {
///         Kind::String(&self.0)
///     }
///
///     fn method(&self) -> Option<(Receiver, Method<'_>)> {
///         Some((Receiver::Pointer, Method::Display(self)))
///     }
/// }
///
/// let label = Label(String::from("x"));
/// assert_eq!(deepdump::render(&label), "(Label) (len=1) label x");
///
/// let config = deepdump::Config::DEFAULT.with_disable_pointer_methods(true);
/// assert_eq!(config.render(&label), "(Label) (len=1) \"x\"");
/// ```
pub trait Reflect {
    /// The full name of the type, as returned by [`core::any::type_name`].
    ///
    /// The renderer strips module paths when printing it. Transparent
    /// wrappers such as [`Option`] report the name of what they wrap.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Returns a view of the current value.
    fn reflect(&self) -> Kind<'_>;

    /// Returns the custom textual representation of the value, if the type
    /// has one, and the receiver through which it is reachable.
    fn method(&self) -> Option<(Receiver, Method<'_>)> {
        None
    }

    /// The view of a missing value of this type, used for `Option::None` and
    /// similar empty wrappers.
    fn nil() -> Nil
    where
        Self: Sized,
    {
        Nil::Interface
    }

    /// Views a slice of this type as raw bytes, if the type is a byte.
    ///
    /// Only `u8` overrides this; it is what makes byte containers render as a
    /// hex dump instead of one element per line.
    fn byte_slice(items: &[Self]) -> Option<&[u8]>
    where
        Self: Sized,
    {
        let _ = items;
        None
    }
}

/// A view of a value, tagged with its kind.
///
/// Views borrow from the value they describe; they are created on demand by
/// [`Reflect::reflect`] and dropped after use.
pub enum Kind<'a> {
    /// Nothing at all. Renders as `<invalid>`.
    Invalid,
    /// A boolean.
    Bool(bool),
    /// A signed integer of any width.
    Int(i128),
    /// An unsigned integer of any width.
    Uint(u128),
    /// A single precision float.
    Float32(f32),
    /// A double precision float.
    Float64(f64),
    /// A complex number with single precision parts.
    Complex64(Complex<f32>),
    /// A complex number with double precision parts.
    Complex128(Complex<f64>),
    /// A character.
    Char(char),
    /// Text, rendered quoted and escaped.
    String(&'a str),
    /// A fixed-size sequence.
    Array(Seq<'a>),
    /// A growable or borrowed sequence, or `None` for a missing one.
    Slice(Option<Seq<'a>>),
    /// A struct or tuple.
    Struct(StructView<'a>),
    /// A map, or `None` for a missing one.
    Map(Option<MapView<'a>>),
    /// A pointer.
    Pointer(Pointer<'a>),
    /// A polymorphic box, or `None` for an empty one.
    Interface(Option<&'a dyn Reflect>),
    /// A channel endpoint, identified by its address.
    Channel(Option<usize>),
    /// A function, identified by its address.
    Function(Option<usize>),
    /// An integer that holds an address.
    Uintptr(usize),
    /// A raw pointer, which is never dereferenced.
    UnsafePointer(usize),
}

/// The kind of a missing value, see [`Reflect::nil`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nil {
    /// A null pointer to a value of type `pointee`.
    Pointer {
        /// The full type name of the pointee.
        pointee: &'static str,
    },
    /// A missing sequence.
    Slice,
    /// A missing map.
    Map,
    /// A missing channel.
    Channel,
    /// A missing function.
    Function,
    /// An empty polymorphic box.
    Interface,
}

impl From<Nil> for Kind<'_> {
    fn from(nil: Nil) -> Self {
        match nil {
            Nil::Pointer { pointee } => Kind::Pointer(Pointer::Nil { pointee }),
            Nil::Slice => Kind::Slice(None),
            Nil::Map => Kind::Map(None),
            Nil::Channel => Kind::Channel(None),
            Nil::Function => Kind::Function(None),
            Nil::Interface => Kind::Interface(None),
        }
    }
}

/// The target of a pointer.
#[derive(Clone, Copy)]
pub enum Pointer<'a> {
    /// A null pointer.
    Nil {
        /// The full type name of the pointee.
        pointee: &'static str,
    },
    /// A pointer to a live value.
    To(&'a dyn Reflect),
}

impl<'a> Pointer<'a> {
    /// A pointer to `target`.
    pub fn to<T: Reflect>(target: &'a T) -> Self {
        Self::To(target)
    }

    /// A null pointer to a `T`.
    pub fn nil<T: ?Sized>() -> Self {
        Self::Nil {
            pointee: core::any::type_name::<T>(),
        }
    }
}

/// A sequence of values, with its length and optionally its capacity.
pub struct Seq<'a> {
    /// Number of elements.
    len: usize,
    /// Allocated capacity, for sequences that have one.
    capacity: Option<usize>,
    /// The elements.
    items: Box<dyn Iterator<Item = &'a dyn Reflect> + 'a>,
    /// The elements as raw bytes, for byte sequences, in two halves for
    /// buffers that are not contiguous.
    bytes: Option<(&'a [u8], &'a [u8])>,
}

impl<'a> Seq<'a> {
    /// A sequence over the elements of `items`.
    ///
    /// Byte slices are recognized through [`Reflect::byte_slice`].
    pub fn from_slice<T: Reflect>(items: &'a [T]) -> Self {
        Self {
            len: items.len(),
            capacity: None,
            items: Box::new(items.iter().map(erase::<T>)),
            bytes: T::byte_slice(items).map(|bytes| (bytes, &[][..])),
        }
    }

    /// A sequence of `len` elements produced by `items`.
    pub fn new<T, I>(len: usize, items: I) -> Self
    where
        T: Reflect + 'a,
        I: Iterator<Item = &'a T> + 'a,
    {
        Self {
            len,
            capacity: None,
            items: Box::new(items.map(erase::<T>)),
            bytes: None,
        }
    }

    /// Sets the allocated capacity reported alongside the length.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the raw bytes backing the sequence.
    #[must_use]
    pub fn with_bytes(self, bytes: &'a [u8]) -> Self {
        self.with_split_bytes(bytes, &[])
    }

    /// Sets the raw bytes backing a sequence stored in two halves, such as a
    /// wrapped ring buffer. The bytes are `front` followed by `back`.
    #[must_use]
    pub fn with_split_bytes(mut self, front: &'a [u8], back: &'a [u8]) -> Self {
        self.bytes = Some((front, back));
        self
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity, if the sequence reports one.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// The raw bytes as front and back halves, if this is a byte sequence.
    ///
    /// The back half is empty for contiguous storage.
    pub fn bytes(&self) -> Option<(&'a [u8], &'a [u8])> {
        self.bytes
    }

    /// Consumes the view, returning its elements.
    pub fn into_items(self) -> Box<dyn Iterator<Item = &'a dyn Reflect> + 'a> {
        self.items
    }
}

/// A struct field.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    /// Field name, or its position for tuple structs.
    name: &'static str,
    /// Field value.
    value: &'a dyn Reflect,
    /// Whether the field is visible outside its defining crate.
    exported: bool,
}

impl<'a> Field<'a> {
    /// A field with explicit visibility.
    pub fn new(name: &'static str, value: &'a dyn Reflect, exported: bool) -> Self {
        Self {
            name,
            value,
            exported,
        }
    }

    /// A `pub` field.
    pub fn public(name: &'static str, value: &'a dyn Reflect) -> Self {
        Self::new(name, value, true)
    }

    /// A field private to its defining crate or module.
    pub fn private(name: &'static str, value: &'a dyn Reflect) -> Self {
        Self::new(name, value, false)
    }

    /// The field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field value.
    pub fn value(&self) -> &'a dyn Reflect {
        self.value
    }

    /// Whether the field is visible outside its defining crate.
    pub fn is_exported(&self) -> bool {
        self.exported
    }
}

/// The fields of a struct, in declaration order.
pub struct StructView<'a> {
    /// The fields.
    fields: Vec<Field<'a>>,
}

impl<'a> StructView<'a> {
    /// A struct with the given fields.
    pub fn new(fields: Vec<Field<'a>>) -> Self {
        Self { fields }
    }

    /// The fields, in declaration order.
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }
}

/// The entries of a map, in the map's own iteration order.
pub struct MapView<'a> {
    /// Number of entries.
    len: usize,
    /// The entries.
    entries: Box<dyn Iterator<Item = (&'a dyn Reflect, &'a dyn Reflect)> + 'a>,
}

impl<'a> MapView<'a> {
    /// A map of `len` entries produced by `entries`.
    pub fn new<K, V, I>(len: usize, entries: I) -> Self
    where
        K: Reflect + 'a,
        V: Reflect + 'a,
        I: Iterator<Item = (&'a K, &'a V)> + 'a,
    {
        Self {
            len,
            entries: Box::new(entries.map(|(key, value)| (erase(key), erase(value)))),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consumes the view, returning its entries.
    pub fn into_entries(self) -> Box<dyn Iterator<Item = (&'a dyn Reflect, &'a dyn Reflect)> + 'a> {
        self.entries
    }
}

/// How a custom textual representation can be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// Directly on the value.
    Value,
    /// Only through a pointer derived from the value, which requires the
    /// value to be addressable.
    Pointer,
}

/// A custom textual representation.
#[derive(Clone, Copy)]
pub enum Method<'a> {
    /// An error, rendered through its message.
    Error(&'a dyn core::error::Error),
    /// A displayable value.
    Display(&'a dyn fmt::Display),
}

impl fmt::Display for Method<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Error(error) => fmt::Display::fmt(error, f),
            Method::Display(display) => fmt::Display::fmt(display, f),
        }
    }
}

/// A complex number.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<F> {
    /// Real part.
    pub re: F,
    /// Imaginary part.
    pub im: F,
}

impl<F> Complex<F> {
    /// Creates a complex number from its parts.
    pub const fn new(re: F, im: F) -> Self {
        Self { re, im }
    }
}

/// Erases the concrete type of a reference.
fn erase<'a, T: Reflect + 'a>(value: &'a T) -> &'a dyn Reflect {
    value
}

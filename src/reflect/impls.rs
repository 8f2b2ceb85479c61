use alloc::{
    borrow::Cow,
    boxed::Box,
    collections::{BTreeMap, BTreeSet, VecDeque},
    rc::Rc,
    string::String,
    sync::Arc,
    vec,
    vec::Vec,
};
use core::{cell::OnceCell, ptr::NonNull};

use super::{Complex, Field, Kind, MapView, Method, Nil, Pointer, Receiver, Reflect, Seq, StructView};

macro_rules! impl_signed {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn reflect(&self) -> Kind<'_> {
                Kind::Int(i128::from(*self))
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn reflect(&self) -> Kind<'_> {
                Kind::Uint(u128::from(*self))
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, i128);
impl_unsigned!(u16, u32, u64, u128);

impl Reflect for isize {
    fn reflect(&self) -> Kind<'_> {
        // Lossless: no target has pointers wider than 128 bits
        Kind::Int(*self as i128)
    }
}

impl Reflect for usize {
    fn reflect(&self) -> Kind<'_> {
        // Lossless: no target has pointers wider than 128 bits
        Kind::Uint(*self as u128)
    }
}

impl Reflect for u8 {
    fn reflect(&self) -> Kind<'_> {
        Kind::Uint(u128::from(*self))
    }

    fn byte_slice(items: &[Self]) -> Option<&[u8]> {
        Some(items)
    }
}

impl Reflect for bool {
    fn reflect(&self) -> Kind<'_> {
        Kind::Bool(*self)
    }
}

impl Reflect for char {
    fn reflect(&self) -> Kind<'_> {
        Kind::Char(*self)
    }
}

impl Reflect for f32 {
    fn reflect(&self) -> Kind<'_> {
        Kind::Float32(*self)
    }
}

impl Reflect for f64 {
    fn reflect(&self) -> Kind<'_> {
        Kind::Float64(*self)
    }
}

impl Reflect for Complex<f32> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Complex64(*self)
    }
}

impl Reflect for Complex<f64> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Complex128(*self)
    }
}

// Strings

impl Reflect for String {
    fn reflect(&self) -> Kind<'_> {
        Kind::String(self)
    }
}

impl Reflect for &str {
    fn reflect(&self) -> Kind<'_> {
        Kind::String(self)
    }
}

impl Reflect for Box<str> {
    fn reflect(&self) -> Kind<'_> {
        Kind::String(self)
    }
}

impl Reflect for Cow<'_, str> {
    fn reflect(&self) -> Kind<'_> {
        Kind::String(self)
    }
}

// Sequences

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Slice(Some(Seq::from_slice(self).with_capacity(self.capacity())))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

impl<T: Reflect> Reflect for &[T] {
    fn reflect(&self) -> Kind<'_> {
        Kind::Slice(Some(Seq::from_slice(self)))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Slice(Some(Seq::from_slice(self)))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect(&self) -> Kind<'_> {
        Kind::Array(Seq::from_slice(self))
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn reflect(&self) -> Kind<'_> {
        let seq = Seq::new(self.len(), self.iter()).with_capacity(self.capacity());
        let (front, back) = self.as_slices();
        let seq = match (T::byte_slice(front), T::byte_slice(back)) {
            (Some(front), Some(back)) => seq.with_split_bytes(front, back),
            _ => seq,
        };
        Kind::Slice(Some(seq))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Slice(Some(Seq::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

impl<T: Reflect, S> Reflect for hashbrown::HashSet<T, S> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Slice(Some(Seq::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

// Maps

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Map(Some(MapView::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Map
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for hashbrown::HashMap<K, V, S> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Map(Some(MapView::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Map
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for indexmap::IndexMap<K, V, S> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Map(Some(MapView::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Map
    }
}

#[cfg(feature = "std")]
impl<K: Reflect, V: Reflect, S> Reflect for std::collections::HashMap<K, V, S> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Map(Some(MapView::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Map
    }
}

#[cfg(feature = "std")]
impl<T: Reflect, S> Reflect for std::collections::HashSet<T, S> {
    fn reflect(&self) -> Kind<'_> {
        Kind::Slice(Some(Seq::new(self.len(), self.iter())))
    }

    fn nil() -> Nil {
        Nil::Slice
    }
}

// Pointers

macro_rules! impl_pointer {
    ($($ptr:ident)::+) => {
        impl<T: Reflect> Reflect for $($ptr)::+<T> {
            fn reflect(&self) -> Kind<'_> {
                Kind::Pointer(Pointer::To(&**self))
            }

            fn nil() -> Nil {
                Nil::Pointer {
                    pointee: core::any::type_name::<T>(),
                }
            }
        }
    };
}

impl_pointer!(Box);
impl_pointer!(Rc);
impl_pointer!(Arc);
impl_pointer!(triomphe::Arc);

impl<T: Reflect> Reflect for &T {
    fn reflect(&self) -> Kind<'_> {
        Kind::Pointer(Pointer::To(*self))
    }

    fn nil() -> Nil {
        Nil::Pointer {
            pointee: core::any::type_name::<T>(),
        }
    }
}

impl<T: Reflect> Reflect for &mut T {
    fn reflect(&self) -> Kind<'_> {
        Kind::Pointer(Pointer::To(&**self))
    }

    fn nil() -> Nil {
        Nil::Pointer {
            pointee: core::any::type_name::<T>(),
        }
    }
}

// Polymorphic boxes

macro_rules! impl_interface {
    ($($holder:ty),*) => {$(
        impl Reflect for $holder {
            fn reflect(&self) -> Kind<'_> {
                Kind::Interface(Some(&**self))
            }
        }
    )*};
}

impl_interface!(
    &dyn Reflect,
    &(dyn Reflect + Send + Sync),
    Box<dyn Reflect>,
    Box<dyn Reflect + Send + Sync>,
    Rc<dyn Reflect>,
    Arc<dyn Reflect + Send + Sync>
);

// Transparent wrappers

impl<T: Reflect> Reflect for Option<T> {
    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => core::any::type_name::<T>(),
        }
    }

    fn reflect(&self) -> Kind<'_> {
        match self {
            Some(value) => value.reflect(),
            None => T::nil().into(),
        }
    }

    fn method(&self) -> Option<(Receiver, Method<'_>)> {
        self.as_ref().and_then(Reflect::method)
    }

    fn nil() -> Nil {
        T::nil()
    }
}

impl<T: Reflect> Reflect for OnceCell<T> {
    fn type_name(&self) -> &'static str {
        match self.get() {
            Some(value) => value.type_name(),
            None => core::any::type_name::<T>(),
        }
    }

    fn reflect(&self) -> Kind<'_> {
        match self.get() {
            Some(value) => value.reflect(),
            None => T::nil().into(),
        }
    }

    fn method(&self) -> Option<(Receiver, Method<'_>)> {
        self.get().and_then(Reflect::method)
    }

    fn nil() -> Nil {
        T::nil()
    }
}

#[cfg(feature = "std")]
impl<T: Reflect> Reflect for std::sync::OnceLock<T> {
    fn type_name(&self) -> &'static str {
        match self.get() {
            Some(value) => value.type_name(),
            None => core::any::type_name::<T>(),
        }
    }

    fn reflect(&self) -> Kind<'_> {
        match self.get() {
            Some(value) => value.reflect(),
            None => T::nil().into(),
        }
    }

    fn method(&self) -> Option<(Receiver, Method<'_>)> {
        self.get().and_then(Reflect::method)
    }

    fn nil() -> Nil {
        T::nil()
    }
}

// Tuples

impl Reflect for () {
    fn reflect(&self) -> Kind<'_> {
        Kind::Struct(StructView::new(Vec::new()))
    }
}

macro_rules! impl_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: Reflect),+> Reflect for ($($name,)+) {
            fn reflect(&self) -> Kind<'_> {
                Kind::Struct(StructView::new(vec![
                    $(Field::public(stringify!($index), &self.$index)),+
                ]))
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// Functions

macro_rules! impl_function {
    ($($arg:ident),*) => {
        impl<R $(, $arg)*> Reflect for fn($($arg),*) -> R {
            fn reflect(&self) -> Kind<'_> {
                Kind::Function(Some((*self as *const ()).addr()))
            }

            fn nil() -> Nil {
                Nil::Function
            }
        }
    };
}

impl_function!();
impl_function!(A);
impl_function!(A, B);
impl_function!(A, B, C);

// Channels

// An endpoint renders the address of the endpoint value itself. `mpsc`
// exposes no identity for the channel behind it, so clones of one `Sender`
// render different addresses and moving an endpoint changes its address.
#[cfg(feature = "std")]
macro_rules! impl_channel {
    ($($endpoint:ident),*) => {$(
        impl<T> Reflect for std::sync::mpsc::$endpoint<T> {
            fn reflect(&self) -> Kind<'_> {
                Kind::Channel(Some(core::ptr::from_ref(self).addr()))
            }

            fn nil() -> Nil {
                Nil::Channel
            }
        }
    )*};
}

#[cfg(feature = "std")]
impl_channel!(Sender, SyncSender, Receiver);

// Raw pointers

impl<T: ?Sized> Reflect for *const T {
    fn reflect(&self) -> Kind<'_> {
        Kind::UnsafePointer(self.cast::<()>().addr())
    }
}

impl<T: ?Sized> Reflect for *mut T {
    fn reflect(&self) -> Kind<'_> {
        Kind::UnsafePointer(self.cast::<()>().addr())
    }
}

impl<T: ?Sized> Reflect for NonNull<T> {
    fn reflect(&self) -> Kind<'_> {
        Kind::UnsafePointer(self.as_ptr().cast::<()>().addr())
    }
}

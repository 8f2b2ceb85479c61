//! The traversal engine.
//!
//! [`DumpState`] walks a value depth first, dispatching on its [`Kind`] to
//! the rules in [`crate::format`]. It owns the bookkeeping that spans the
//! walk: the current depth and line prefix, and the set of pointer targets
//! on the active path, which is what terminates the walk on cyclic graphs.
//!
//! Every value is visited through a [`Handle`], which carries the
//! capabilities the value was reached with. Structural inspection works on
//! any valid handle; invoking a custom textual representation requires a
//! readable handle, and an addressable one for pointer receivers. When a
//! handle falls short, the engine asks the access widener to raise it.

use alloc::{string::String, vec::Vec};
use core::{cmp::Ordering, fmt, mem};

use deepdump_internals::{Derivation, RawHandle};
use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;

use crate::{
    config::Config,
    format::{self, hexdump},
    reflect::{Handle, Kind, MapView, Pointer, Reflect, Seq, StructView},
};

/// Identifies a pointer target or boxed value on the current path.
type AncestorKey = (usize, &'static str);

/// A value with its polymorphic boxes looked through.
enum Unboxed<'v> {
    /// The innermost value.
    Value(Handle<'v>, &'v dyn Reflect, Kind<'v>),
    /// A boxed value already being rendered further up the path.
    Cycle(&'v dyn Reflect),
}

/// How a pointer chain ended.
enum ChainEnd<'v> {
    /// A null pointer or an empty polymorphic box.
    Nil,
    /// A target already being rendered further up the path.
    Cycle,
    /// A value to render.
    Value(Handle<'v>, &'v dyn Reflect, Kind<'v>),
}

/// Orders map keys when `sort_keys` is set.
///
/// Scalars compare by value and everything else by its rendered text. Keys
/// of different kinds order by variant.
enum SortKey {
    Bool(bool),
    Int(i128),
    Uint(u128),
    Float(f64),
    Char(char),
    Text(String),
    Rendered(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Uint(_) => 2,
            Self::Float(_) => 3,
            Self::Char(_) => 4,
            Self::Text(_) => 5,
            Self::Rendered(_) => 6,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
            (Self::Int(left), Self::Int(right)) => left.cmp(right),
            (Self::Uint(left), Self::Uint(right)) => left.cmp(right),
            (Self::Float(left), Self::Float(right)) => left.total_cmp(right),
            (Self::Char(left), Self::Char(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) | (Self::Rendered(left), Self::Rendered(right)) => {
                left.cmp(right)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// State of one top-level rendering call.
pub(crate) struct DumpState<'a, W: ?Sized> {
    /// Output sink.
    out: &'a mut W,
    /// Options for this call.
    config: &'a Config,
    /// Current composite nesting.
    depth: usize,
    /// `config.indent` repeated `depth` times.
    line_prefix: String,
    /// Pointer targets on the active path.
    ancestors: HashSet<AncestorKey, FxBuildHasher>,
    /// The next value continues the current line, after a field name or
    /// map key.
    ignore_next_indent: bool,
    /// The next value's type was already written by a pointer annotation.
    ignore_next_type: bool,
}

impl<'a, W: fmt::Write + ?Sized> DumpState<'a, W> {
    pub(crate) fn new(out: &'a mut W, config: &'a Config) -> Self {
        Self {
            out,
            config,
            depth: 0,
            line_prefix: String::new(),
            ancestors: HashSet::with_hasher(FxBuildHasher),
            ignore_next_indent: false,
            ignore_next_type: false,
        }
    }

    /// Renders a value passed in by the caller.
    pub(crate) fn dump_root(&mut self, value: &dyn Reflect) -> fmt::Result {
        self.dump(RawHandle::new(value))
    }

    fn write_indent(&mut self) -> fmt::Result {
        if mem::take(&mut self.ignore_next_indent) {
            Ok(())
        } else {
            self.out.write_str(&self.line_prefix)
        }
    }

    fn enter(&mut self) {
        self.depth += 1;
        self.line_prefix.push_str(&self.config.indent);
    }

    fn leave(&mut self) {
        self.depth -= 1;
        let len = self.line_prefix.len() - self.config.indent.len();
        self.line_prefix.truncate(len);
    }

    fn is_too_deep(&self) -> bool {
        self.config.max_depth != 0 && self.depth > self.config.max_depth
    }

    /// Renders the value behind `handle`, looking through polymorphic boxes.
    fn dump(&mut self, handle: Handle<'_>) -> fmt::Result {
        let Some(value) = handle.peek() else {
            return self.write_invalid();
        };
        let mut pushed = Vec::new();
        let result = match self.unbox(handle, value, value.reflect(), &mut pushed) {
            Unboxed::Value(handle, value, kind) => self.dump_kind(handle, value, kind),
            Unboxed::Cycle(value) => self.write_already_shown(value),
        };
        self.release(&pushed);
        result
    }

    /// Looks through polymorphic boxes, recording every boxed value as an
    /// ancestor in `pushed`.
    ///
    /// `Rc<dyn Reflect>` and friends share their target, so a box can close a
    /// cycle just like a pointer can.
    fn unbox<'v>(
        &mut self,
        mut handle: Handle<'v>,
        mut value: &'v dyn Reflect,
        mut kind: Kind<'v>,
        pushed: &mut Vec<AncestorKey>,
    ) -> Unboxed<'v> {
        while let Kind::Interface(Some(inner)) = kind {
            handle = handle.child(inner, Derivation::InterfaceElement);
            let key = (handle.address(), inner.type_name());
            if !self.ancestors.insert(key) {
                return Unboxed::Cycle(inner);
            }
            pushed.push(key);
            value = inner;
            kind = inner.reflect();
        }
        Unboxed::Value(handle, value, kind)
    }

    fn release(&mut self, pushed: &[AncestorKey]) {
        for key in pushed {
            self.ancestors.remove(key);
        }
    }

    fn write_already_shown(&mut self, value: &dyn Reflect) -> fmt::Result {
        if !mem::take(&mut self.ignore_next_type) {
            self.write_indent()?;
            format::write_type_annotation(self.out, value.type_name())?;
        }
        self.out.write_str(format::ALREADY_SHOWN)
    }

    fn write_invalid(&mut self) -> fmt::Result {
        if !mem::take(&mut self.ignore_next_type) {
            self.write_indent()?;
        }
        self.out.write_str(format::INVALID)
    }

    fn dump_kind<'v>(&mut self, handle: Handle<'v>, value: &'v dyn Reflect, kind: Kind<'v>) -> fmt::Result {
        match kind {
            Kind::Invalid => return self.write_invalid(),
            Kind::Pointer(pointer) => {
                self.write_indent()?;
                return self.dump_pointer(handle, pointer);
            }
            _ => {}
        }

        if !mem::take(&mut self.ignore_next_type) {
            self.write_indent()?;
            format::write_type_annotation(self.out, value.type_name())?;
        }

        match &kind {
            Kind::String(text) => format::write_len_cap(self.out, text.len(), None)?,
            Kind::Array(seq) => format::write_len_cap(self.out, seq.len(), None)?,
            Kind::Slice(Some(seq)) => {
                let capacity = self
                    .config
                    .enable_capacities
                    .then(|| seq.capacity().unwrap_or(seq.len()));
                format::write_len_cap(self.out, seq.len(), capacity)?;
            }
            Kind::Map(Some(map)) => format::write_len_cap(self.out, map.len(), None)?,
            _ => {}
        }

        if !self.config.disable_methods
            && !matches!(kind, Kind::Interface(_))
            && self.handle_methods(handle)?
        {
            return Ok(());
        }

        match kind {
            Kind::Invalid | Kind::Pointer(_) => Ok(()),
            Kind::Bool(value) => write!(self.out, "{value}"),
            Kind::Int(value) => write!(self.out, "{value}"),
            Kind::Uint(value) => write!(self.out, "{value}"),
            Kind::Float32(value) => write!(self.out, "{value}"),
            Kind::Float64(value) => write!(self.out, "{value}"),
            Kind::Complex64(value) => format::write_complex(self.out, value),
            Kind::Complex128(value) => format::write_complex(self.out, value),
            Kind::Char(value) => write!(self.out, "{value:?}"),
            Kind::String(text) => format::write_quoted(self.out, text),
            Kind::Array(seq) => self.dump_seq(handle, seq, Derivation::ArrayElement),
            Kind::Slice(Some(seq)) => self.dump_seq(handle, seq, Derivation::SliceElement),
            Kind::Struct(view) => self.dump_struct(handle, &view),
            Kind::Map(Some(map)) => self.dump_map(handle, map),
            Kind::Slice(None) | Kind::Map(None) | Kind::Interface(_) => {
                self.out.write_str(format::NIL)
            }
            Kind::Channel(address) | Kind::Function(address) => {
                format::write_address(self.out, address.unwrap_or(0))
            }
            Kind::Uintptr(address) | Kind::UnsafePointer(address) => {
                format::write_address(self.out, address)
            }
        }
    }

    /// Writes the braces of a composite around `members`, or the depth
    /// marker in their place.
    fn dump_composite(&mut self, members: impl FnOnce(&mut Self) -> fmt::Result) -> fmt::Result {
        self.out.write_str("{\n")?;
        self.enter();
        let result = if self.is_too_deep() {
            self.write_indent()
                .and_then(|()| self.out.write_str(format::MAX_DEPTH_REACHED))
                .and_then(|()| self.out.write_char('\n'))
        } else {
            members(self)
        };
        self.leave();
        result?;
        self.write_indent()?;
        self.out.write_char('}')
    }

    /// Ends a member line: a comma unless it is the last member.
    fn end_member(&mut self, is_last: bool) -> fmt::Result {
        self.out.write_str(if is_last { "\n" } else { ",\n" })
    }

    fn dump_seq<'v>(&mut self, handle: Handle<'v>, seq: Seq<'v>, derivation: Derivation) -> fmt::Result {
        self.dump_composite(|this| {
            if let Some((front, back)) = seq.bytes().filter(|_| !seq.is_empty()) {
                let bytes = front.iter().chain(back).copied();
                return hexdump::write_hex_dump(this.out, bytes, &this.line_prefix);
            }

            let mut items = seq.into_items().peekable();
            while let Some(item) = items.next() {
                this.dump(handle.child(item, derivation))?;
                this.end_member(items.peek().is_none())?;
            }
            Ok(())
        })
    }

    fn dump_struct<'v>(&mut self, handle: Handle<'v>, view: &StructView<'v>) -> fmt::Result {
        self.dump_composite(|this| {
            let fields = view.fields();
            for (index, field) in fields.iter().enumerate() {
                this.write_indent()?;
                this.out.write_str(field.name())?;
                this.out.write_str(": ")?;
                this.ignore_next_indent = true;
                let derivation = Derivation::Field {
                    exported: field.is_exported(),
                };
                this.dump(handle.child(field.value(), derivation))?;
                this.end_member(index + 1 == fields.len())?;
            }
            Ok(())
        })
    }

    fn dump_map<'v>(&mut self, handle: Handle<'v>, map: MapView<'v>) -> fmt::Result {
        self.dump_composite(|this| {
            let mut entries: Vec<_> = map.into_entries().collect();
            if this.config.sort_keys {
                let mut keyed: Vec<_> = entries
                    .into_iter()
                    .map(|(key, value)| (this.sort_key(key), key, value))
                    .collect();
                keyed.sort_by(|left, right| left.0.cmp(&right.0));
                entries = keyed.into_iter().map(|(_, key, value)| (key, value)).collect();
            }

            let count = entries.len();
            for (index, (key, value)) in entries.into_iter().enumerate() {
                this.dump(handle.child(key, Derivation::MapEntry))?;
                this.out.write_str(": ")?;
                this.ignore_next_indent = true;
                this.dump(handle.child(value, Derivation::MapEntry))?;
                this.end_member(index + 1 == count)?;
            }
            Ok(())
        })
    }

    /// Returns the key a map entry is ordered by.
    fn sort_key(&self, key: &dyn Reflect) -> SortKey {
        let mut kind = key.reflect();
        while let Kind::Interface(Some(inner)) = kind {
            kind = inner.reflect();
        }
        match kind {
            Kind::Bool(value) => SortKey::Bool(value),
            Kind::Int(value) => SortKey::Int(value),
            Kind::Uint(value) => SortKey::Uint(value),
            Kind::Float32(value) => SortKey::Float(f64::from(value)),
            Kind::Float64(value) => SortKey::Float(value),
            Kind::Char(value) => SortKey::Char(value),
            Kind::String(text) => SortKey::Text(String::from(text)),
            _ => {
                let mut out = String::new();
                // Writing into a `String` never fails
                let _ = DumpState::new(&mut out, self.config).dump_root(key);
                SortKey::Rendered(out)
            }
        }
    }

    /// Renders a pointer chain: `(*T)(address)(target)`.
    ///
    /// Every target on the chain is recorded as an ancestor while the final
    /// value is rendered, and released afterwards, so shared but acyclic
    /// targets are rendered in full wherever they appear.
    fn dump_pointer<'v>(&mut self, handle: Handle<'v>, pointer: Pointer<'v>) -> fmt::Result {
        let mut addresses = Vec::new();
        let mut pushed: Vec<AncestorKey> = Vec::new();
        let mut holder = handle;
        let mut pointer = pointer;

        let (stars, pointee, end) = loop {
            let target = match pointer {
                Pointer::Nil { pointee } => break (addresses.len() + 1, pointee, ChainEnd::Nil),
                Pointer::To(target) => target,
            };

            let target_handle = holder.child(target, Derivation::PointerTarget);
            let key = (target_handle.address(), target.type_name());
            addresses.push(key.0);
            if self.ancestors.contains(&key) {
                break (addresses.len(), key.1, ChainEnd::Cycle);
            }
            self.ancestors.insert(key);
            pushed.push(key);

            let (current, value, kind) = match self.unbox(target_handle, target, target.reflect(), &mut pushed) {
                Unboxed::Value(current, value, kind) => (current, value, kind),
                Unboxed::Cycle(value) => break (addresses.len(), value.type_name(), ChainEnd::Cycle),
            };

            match kind {
                Kind::Pointer(next) => {
                    holder = current;
                    pointer = next;
                }
                Kind::Interface(None) => {
                    break (addresses.len(), value.type_name(), ChainEnd::Nil);
                }
                kind => break (addresses.len(), value.type_name(), ChainEnd::Value(current, value, kind)),
            }
        };

        let shown = (!self.config.disable_pointer_addresses && !addresses.is_empty())
            .then_some(addresses.as_slice());
        let result = format::write_pointer_header(self.out, stars, pointee, shown)
            .and_then(|()| self.out.write_char('('))
            .and_then(|()| match end {
                ChainEnd::Nil => self.out.write_str(format::NIL),
                ChainEnd::Cycle => self.out.write_str(format::ALREADY_SHOWN),
                ChainEnd::Value(handle, value, kind) => {
                    self.ignore_next_type = true;
                    self.dump_kind(handle, value, kind)
                }
            })
            .and_then(|()| self.out.write_char(')'));

        self.release(&pushed);
        result
    }

    /// Writes the custom textual representation of the value, if it has one
    /// that may be invoked.
    ///
    /// Returns whether the representation replaces the structural rendering.
    #[cfg(feature = "std")]
    fn handle_methods(&mut self, handle: Handle<'_>) -> Result<bool, fmt::Error> {
        use core::fmt::Write as _;

        use deepdump_internals::{guard, widen};

        use crate::reflect::Receiver;

        let Some((receiver, _)) = handle.peek().and_then(Reflect::method) else {
            return Ok(false);
        };

        let mut handle = handle;
        if !handle.is_readable() {
            match widen::widen(handle) {
                Ok(widened) => handle = widened,
                Err(_unavailable) => {
                    trace_event!(
                        trace,
                        type_name = handle.peek().map(|value| value.type_name()),
                        "skipping custom representation of an unexported value"
                    );
                    return Ok(false);
                }
            }
        }

        if receiver == Receiver::Pointer {
            if self.config.disable_pointer_methods {
                return Ok(false);
            }
            if !handle.is_addressable() {
                match widen::widen(handle) {
                    Ok(widened) => handle = widened,
                    Err(_unavailable) => return Ok(false),
                }
            }
        }

        let Some(value) = handle.get() else {
            return Ok(false);
        };

        let outcome = guard::call_guarded(|| {
            let mut text = String::new();
            match value.method() {
                Some((_, method)) => write!(text, "{method}").map(|()| Some(text)),
                None => Ok(None),
            }
        });

        match outcome {
            Ok(Ok(Some(text))) if self.config.continue_on_method => {
                write!(self.out, "({text}) ")?;
                Ok(false)
            }
            Ok(Ok(Some(text))) => {
                self.out.write_str(&text)?;
                Ok(true)
            }
            Ok(Ok(None)) => Ok(false),
            Ok(Err(fmt::Error)) => {
                self.out.write_str("(PANIC=fmt::Error)")?;
                Ok(false)
            }
            Err(panicked) => {
                trace_event!(
                    debug,
                    type_name = value.type_name(),
                    panic_message = panicked.message(),
                    "custom representation panicked"
                );
                write!(self.out, "(PANIC={panicked})")?;
                Ok(false)
            }
        }
    }

    /// Custom representations need the panic guard, which needs `std`.
    #[cfg(not(feature = "std"))]
    fn handle_methods(&mut self, handle: Handle<'_>) -> Result<bool, fmt::Error> {
        let _ = handle;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{boxed::Box, format, rc::Rc, vec, vec::Vec};
    use core::cell::OnceCell;

    use super::*;
    use crate::reflect::Field;

    fn render(value: &dyn Reflect) -> String {
        let mut out = String::new();
        DumpState::new(&mut out, &Config::DEFAULT).dump_root(value).unwrap();
        out
    }

    struct Pair {
        left: u8,
        right: Vec<u8>,
    }

    impl Reflect for Pair {
        fn reflect(&self) -> Kind<'_> {
            Kind::Struct(StructView::new(vec![
                Field::public("left", &self.left),
                Field::private("right", &self.right),
            ]))
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render(&-3i64), "(i64) -3");
        assert_eq!(render(&true), "(bool) true");
        assert_eq!(render(&1.5f32), "(f32) 1.5");
        assert_eq!(render(&'\n'), "(char) '\\n'");
        assert_eq!(render(&String::from("hi")), "(String) (len=2) \"hi\"");
    }

    #[test]
    fn test_struct_members_are_comma_separated() {
        let pair = Pair {
            left: 1,
            right: Vec::new(),
        };
        assert_eq!(
            render(&pair),
            "(Pair) {\n left: (u8) 1,\n right: (Vec<u8>) (len=0) {\n }\n}"
        );
    }

    #[test]
    fn test_nested_sequences_are_indented() {
        let nested = vec![vec![1u16], vec![]];
        assert_eq!(
            render(&nested),
            "(Vec<Vec<u16>>) (len=2) {\n (Vec<u16>) (len=1) {\n  (u16) 1\n },\n (Vec<u16>) (len=0) {\n }\n}"
        );
    }

    #[test]
    fn test_interface_is_unwrapped() {
        let boxed: Box<dyn Reflect> = Box::new(7u32);
        assert_eq!(render(&boxed), "(u32) 7");

        let empty: Option<Box<dyn Reflect>> = None;
        assert_eq!(render(&empty), "(Box<dyn Reflect>) <nil>");
    }

    #[test]
    fn test_nil_pointer() {
        let none: Option<Box<i32>> = None;
        assert_eq!(render(&none), "(*i32)(<nil>)");

        let inner: Option<Box<i32>> = None;
        let outer = &inner;
        let expected = format!(
            "(**i32)({:#x})(<nil>)",
            core::ptr::from_ref(&inner).addr()
        );
        assert_eq!(render(&outer), expected);
    }

    #[test]
    fn test_ancestors_are_released() {
        let shared = Box::new(5u8);
        let siblings = (&shared, &shared);
        let config = Config::DEFAULT.with_disable_pointer_addresses(true);
        let mut out = String::new();
        let mut state = DumpState::new(&mut out, &config);
        state.dump_root(&siblings).unwrap();
        assert!(state.ancestors.is_empty());
        assert_eq!(state.depth, 0);
        assert!(state.line_prefix.is_empty());
        assert_eq!(
            out,
            "((&Box<u8>, &Box<u8>)) {\n 0: (**u8)(5),\n 1: (**u8)(5)\n}"
        );
    }

    struct DynNode {
        next: OnceCell<Rc<dyn Reflect>>,
    }

    impl Reflect for DynNode {
        fn reflect(&self) -> Kind<'_> {
            Kind::Struct(StructView::new(vec![Field::public("next", &self.next)]))
        }
    }

    #[test]
    fn test_cycle_through_boxed_value() {
        let node = Rc::new(DynNode {
            next: OnceCell::new(),
        });
        let erased: Rc<dyn Reflect> = node.clone();
        assert!(node.next.set(Rc::clone(&erased)).is_ok());

        let config = Config::DEFAULT.with_disable_pointer_addresses(true);
        let mut out = String::new();
        let mut state = DumpState::new(&mut out, &config);
        state.dump_root(&node).unwrap();
        assert!(state.ancestors.is_empty());
        assert_eq!(out, "(*DynNode)({\n next: (DynNode) <already shown>\n})");

        assert_eq!(render(&erased), "(DynNode) {\n next: (DynNode) <already shown>\n}");
    }

    #[test]
    fn test_boxed_siblings_are_not_a_cycle() {
        let shared: Rc<dyn Reflect> = Rc::new(4u8);
        let siblings = (Rc::clone(&shared), Rc::clone(&shared));
        assert_eq!(render(&siblings), "((Rc<dyn Reflect>, Rc<dyn Reflect>)) {\n 0: (u8) 4,\n 1: (u8) 4\n}");
    }

    #[test]
    fn test_numeric_keys_sort_by_value() {
        let mut map = indexmap::IndexMap::<i32, u8, FxBuildHasher>::default();
        map.insert(10, 0);
        map.insert(-2, 1);
        map.insert(9, 2);
        let config = Config::DEFAULT.with_sort_keys(true);
        let mut out = String::new();
        DumpState::new(&mut out, &config).dump_root(&map).unwrap();
        let keys: Vec<_> = out.lines().skip(1).filter_map(|line| line.split(':').next()).collect();
        assert_eq!(keys, [" (i32) -2", " (i32) 9", " (i32) 10", "}"]);
    }

    #[test]
    fn test_map_keys_sorted() {
        let mut map = indexmap::IndexMap::<&str, u8, FxBuildHasher>::default();
        map.insert("b", 2);
        map.insert("a", 1);
        let config = Config::DEFAULT.with_sort_keys(true);
        let mut out = String::new();
        DumpState::new(&mut out, &config).dump_root(&map).unwrap();
        assert_eq!(
            out,
            "(IndexMap<&str, u8, FxBuildHasher>) (len=2) {\n (&str) (len=1) \"a\": (u8) 1,\n (&str) (len=1) \"b\": (u8) 2\n}"
        );
    }
}

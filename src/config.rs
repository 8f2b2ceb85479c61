//! Rendering options.

use alloc::{borrow::Cow, string::String};
use core::fmt;

use crate::{dump::DumpState, reflect::Reflect};

/// Options controlling how values are rendered.
///
/// A `Config` is a plain value: build one from [`Config::DEFAULT`] or one of
/// the other presets with the `with_*` methods and pass it to each call.
/// There is no process-wide mutable default.
///
/// # Examples
///
/// ```
/// use deepdump::Config;
///
/// let config = Config::DEFAULT.with_indent("  ").with_max_depth(2);
/// assert_eq!(config.render(&vec![1u8, 2]).lines().count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Text written once per nesting level in front of each member line.
    pub indent: Cow<'static, str>,

    /// Maximum composite nesting to descend into. `0` means unlimited.
    ///
    /// Members of composites nested deeper are replaced by
    /// `<max depth reached>`. Pointer and polymorphic box layers do not
    /// count.
    pub max_depth: usize,

    /// Never invoke custom textual representations.
    pub disable_methods: bool,

    /// Never invoke custom textual representations that are only reachable
    /// through a pointer to the value.
    pub disable_pointer_methods: bool,

    /// Omit all addresses from pointer annotations, for output that is
    /// stable across runs.
    pub disable_pointer_addresses: bool,

    /// Show the capacity of growable sequences next to their length.
    pub enable_capacities: bool,

    /// Order map entries by key instead of the map's own iteration order.
    ///
    /// Numbers, strings, chars and bools compare by value. Other keys compare
    /// by their rendered text.
    pub sort_keys: bool,

    /// Render the structure of a value even after its custom textual
    /// representation, which is then written in parentheses.
    pub continue_on_method: bool,
}

impl Config {
    /// One space of indentation, no depth limit, every option off.
    pub const DEFAULT: Self = Self {
        indent: Cow::Borrowed(" "),
        max_depth: 0,
        disable_methods: false,
        disable_pointer_methods: false,
        disable_pointer_addresses: false,
        enable_capacities: false,
        sort_keys: false,
        continue_on_method: false,
    };

    /// Deterministic output for textual comparison of two values.
    ///
    /// Addresses and custom representations are left out and map entries
    /// are sorted, so equal structures render identically regardless of
    /// where they live in memory.
    ///
    /// ```
    /// use deepdump::Config;
    ///
    /// let left = Box::new(3u8);
    /// let right = Box::new(3u8);
    /// assert_eq!(Config::DIFF.render(&left), Config::DIFF.render(&right));
    /// assert_eq!(Config::DIFF.render(&left), "(*u8)(3)");
    /// ```
    pub const DIFF: Self = Self {
        indent: Cow::Borrowed(" "),
        max_depth: 0,
        disable_methods: true,
        disable_pointer_methods: true,
        disable_pointer_addresses: true,
        enable_capacities: false,
        sort_keys: true,
        continue_on_method: false,
    };

    /// Sets [`indent`](Self::indent).
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<Cow<'static, str>>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Sets [`max_depth`](Self::max_depth).
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets [`disable_methods`](Self::disable_methods).
    #[must_use]
    pub const fn with_disable_methods(mut self, disable_methods: bool) -> Self {
        self.disable_methods = disable_methods;
        self
    }

    /// Sets [`disable_pointer_methods`](Self::disable_pointer_methods).
    #[must_use]
    pub const fn with_disable_pointer_methods(mut self, disable_pointer_methods: bool) -> Self {
        self.disable_pointer_methods = disable_pointer_methods;
        self
    }

    /// Sets [`disable_pointer_addresses`](Self::disable_pointer_addresses).
    #[must_use]
    pub const fn with_disable_pointer_addresses(mut self, disable_pointer_addresses: bool) -> Self {
        self.disable_pointer_addresses = disable_pointer_addresses;
        self
    }

    /// Sets [`enable_capacities`](Self::enable_capacities).
    #[must_use]
    pub const fn with_enable_capacities(mut self, enable_capacities: bool) -> Self {
        self.enable_capacities = enable_capacities;
        self
    }

    /// Sets [`sort_keys`](Self::sort_keys).
    #[must_use]
    pub const fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Sets [`continue_on_method`](Self::continue_on_method).
    #[must_use]
    pub const fn with_continue_on_method(mut self, continue_on_method: bool) -> Self {
        self.continue_on_method = continue_on_method;
        self
    }

    /// Renders `value` into a new string.
    ///
    /// The output has no trailing newline.
    pub fn render<T: Reflect>(&self, value: &T) -> String {
        let mut out = String::new();
        // Writing into a `String` never fails
        let _ = self.write_to(&mut out, value);
        out
    }

    /// Renders `value` into `out`.
    ///
    /// # Errors
    ///
    /// Fails only if writing to `out` fails.
    pub fn write_to<W: fmt::Write + ?Sized>(&self, out: &mut W, value: &dyn Reflect) -> fmt::Result {
        DumpState::new(out, self).dump_root(value)
    }

    /// Returns an adapter that renders `value` when displayed.
    ///
    /// ```
    /// use deepdump::Config;
    ///
    /// let message = format!("got {}", Config::DEFAULT.display(&[true]));
    /// assert_eq!(message, "got ([bool; 1]) (len=1) {\n (bool) true\n}");
    /// ```
    pub fn display<'a, T: Reflect>(&'a self, value: &'a T) -> Dumped<'a> {
        Dumped {
            config: self,
            value,
        }
    }

    /// Renders `value` to standard output, followed by a newline.
    #[cfg(feature = "std")]
    pub fn dump<T: Reflect>(&self, value: &T) {
        std::println!("{}", self.display(value));
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A value paired with a [`Config`], rendered by its [`Display`] impl.
///
/// Returned by [`Config::display`] and [`crate::display`].
///
/// [`Display`]: fmt::Display
#[derive(Clone, Copy)]
pub struct Dumped<'a> {
    /// Options to render with.
    config: &'a Config,
    /// The value to render.
    value: &'a dyn Reflect,
}

/// Backs the free functions that render with [`Config::DEFAULT`].
static DEFAULT: Config = Config::DEFAULT;

impl<'a> Dumped<'a> {
    pub(crate) fn with_default<T: Reflect>(value: &'a T) -> Self {
        DEFAULT.display(value)
    }
}

impl fmt::Display for Dumped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config.write_to(f, self.value)
    }
}

impl fmt::Debug for Dumped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

//! The external editing surface.
//!
//! The actual text-editing engine (rendering, cursor handling, syntax
//! highlighting) lives outside this crate. [`EditorSurface`] is the narrow
//! interface the session layer consumes: buffer lifecycle, content access,
//! binding one buffer to the single visible surface, and a handful of
//! focus/theme primitives.
//!
//! [`HeadlessSurface`] is an in-memory implementation used by tests and by
//! hosts that want to drive a session before a real widget exists. It also
//! records enough observable state (bound buffer, focus, cursor placement)
//! for tests to assert on activation behavior.

use std::collections::HashMap;

/// Opaque handle to one live buffer owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u64);

impl BufferHandle {
    /// Construct a handle from a surface-issued token.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The surface-issued token.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Narrow interface onto the external text-editing engine.
///
/// All operations are synchronous and must tolerate handles the surface no
/// longer knows about (returning `None`/no-op rather than panicking); the
/// session layer guarantees it never holds two live handles for one tab but
/// cannot guarantee the host didn't tear the surface down first.
pub trait EditorSurface {
    /// Create a buffer seeded with `content`, in `language` mode, addressed
    /// by the synthetic `uri`.
    fn create_buffer(&mut self, content: &str, language: &str, uri: &str) -> BufferHandle;

    /// Destroy a buffer and release its resources.
    fn dispose_buffer(&mut self, handle: BufferHandle);

    /// Current content of a buffer, or `None` if the handle is stale.
    fn buffer_content(&self, handle: BufferHandle) -> Option<String>;

    /// Bind this buffer to the single visible editing surface, replacing
    /// whatever was bound before. The rebind is atomic from the caller's
    /// perspective: there is never a transient dual-binding.
    fn bind_active(&mut self, handle: BufferHandle);

    /// Change the language mode of a live buffer.
    fn set_buffer_language(&mut self, handle: BufferHandle, language: &str);

    /// Place the input cursor at the end of the buffer's content, scroll it
    /// into view, and take keyboard focus.
    fn cursor_to_end(&mut self, handle: BufferHandle);

    /// Apply a global editor theme.
    fn apply_theme(&mut self, theme: &str);
}

#[derive(Debug, Clone)]
struct HeadlessBuffer {
    content: String,
    language: String,
    uri: String,
}

/// In-memory [`EditorSurface`] for tests and widget-less hosts.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    next_handle: u64,
    bound: Option<BufferHandle>,
    theme: Option<String>,
    focused: bool,
    /// Byte offset of the cursor within the bound buffer, when placed.
    cursor: Option<usize>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a buffer's content, simulating user edits. Stale handles are
    /// ignored.
    pub fn set_content(&mut self, handle: BufferHandle, content: &str) {
        if let Some(buffer) = self.buffers.get_mut(&handle) {
            content.clone_into(&mut buffer.content);
        }
    }

    /// The buffer currently bound to the visible surface.
    pub fn bound(&self) -> Option<BufferHandle> {
        self.bound
    }

    /// Language mode of a live buffer.
    pub fn language_of(&self, handle: BufferHandle) -> Option<&str> {
        self.buffers.get(&handle).map(|b| b.language.as_str())
    }

    /// URI a live buffer was created with.
    pub fn uri_of(&self, handle: BufferHandle) -> Option<&str> {
        self.buffers.get(&handle).map(|b| b.uri.as_str())
    }

    /// Last applied theme.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Whether the surface holds keyboard focus.
    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Cursor byte offset in the bound buffer, if placed.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }
}

impl EditorSurface for HeadlessSurface {
    fn create_buffer(&mut self, content: &str, language: &str, uri: &str) -> BufferHandle {
        self.next_handle += 1;
        let handle = BufferHandle(self.next_handle);
        self.buffers.insert(
            handle,
            HeadlessBuffer {
                content: content.to_string(),
                language: language.to_string(),
                uri: uri.to_string(),
            },
        );
        handle
    }

    fn dispose_buffer(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
        if self.bound == Some(handle) {
            self.bound = None;
            self.cursor = None;
        }
    }

    fn buffer_content(&self, handle: BufferHandle) -> Option<String> {
        self.buffers.get(&handle).map(|b| b.content.clone())
    }

    fn bind_active(&mut self, handle: BufferHandle) {
        if self.buffers.contains_key(&handle) {
            self.bound = Some(handle);
            self.cursor = None;
        }
    }

    fn set_buffer_language(&mut self, handle: BufferHandle, language: &str) {
        if let Some(buffer) = self.buffers.get_mut(&handle) {
            language.clone_into(&mut buffer.language);
        }
    }

    fn cursor_to_end(&mut self, handle: BufferHandle) {
        if let Some(buffer) = self.buffers.get(&handle) {
            self.cursor = Some(buffer.content.len());
            self.focused = true;
        }
    }

    fn apply_theme(&mut self, theme: &str) {
        self.theme = Some(theme.to_string());
    }
}

//! Clipboard and drop payloads.

/// An image file carried by a paste or drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Whether the MIME type is `image/*`.
    #[must_use]
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime)
    }
}

fn is_image_mime(mime: &str) -> bool {
    mime.get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// One clipboard entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardItem {
    Image(ImageFile),
    Text { mime: String, data: String },
}

impl ClipboardItem {
    pub fn text(mime: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Text {
            mime: mime.into(),
            data: data.into(),
        }
    }
}

/// Contents of a paste event, in clipboard order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub items: Vec<ClipboardItem>,
}

impl ClipboardPayload {
    #[must_use]
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items }
    }

    /// A payload holding a single `text/plain` entry.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![ClipboardItem::text("text/plain", text)])
    }

    /// The first item, if it is an image.
    #[must_use]
    pub fn leading_image(&self) -> Option<&ImageFile> {
        match self.items.first() {
            Some(ClipboardItem::Image(file)) if file.is_image() => Some(file),
            _ => None,
        }
    }

    /// Text for sniffing: `text/markdown` when present, else `text/plain`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text_of("text/markdown")
            .or_else(|| self.text_of("text/plain"))
    }

    fn text_of(&self, wanted: &str) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            ClipboardItem::Text { mime, data } if mime.eq_ignore_ascii_case(wanted) => {
                Some(data.as_str())
            }
            _ => None,
        })
    }
}

/// Viewport coordinate of a drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Files dropped onto the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropPayload {
    pub files: Vec<ImageFile>,
    pub point: Point,
}

impl DropPayload {
    #[must_use]
    pub fn new(files: Vec<ImageFile>, point: Point) -> Self {
        Self { files, point }
    }

    /// Dropped files with an image MIME type, in drop order.
    pub fn images(&self) -> impl Iterator<Item = &ImageFile> {
        self.files.iter().filter(|f| f.is_image())
    }
}
